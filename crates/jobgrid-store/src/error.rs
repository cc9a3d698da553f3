//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur against the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Map an HTTP status to the matching error variant.
    pub fn from_http_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            401 | 403 => Self::PermissionDenied(detail),
            404 => Self::NotFound(detail),
            409 => Self::AlreadyExists(detail),
            429 => Self::RateLimited(1000),
            500..=599 => Self::Server(status, detail),
            _ => Self::RequestFailed(detail),
        }
    }

    /// Check if the error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Network(_) | StoreError::RateLimited(_) | StoreError::Server(_, _)
        )
    }

    /// Suggested retry delay carried by a rate-limit response.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StoreError::NotFound(_) => Some(404),
            StoreError::AlreadyExists(_) => Some(409),
            StoreError::PermissionDenied(_) => Some(403),
            StoreError::RateLimited(_) => Some(429),
            StoreError::Server(status, _) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_409_is_already_exists() {
        let err = StoreError::from_http_status(409, "dup");
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_http_status_429_is_retryable() {
        let err = StoreError::from_http_status(429, "rate limited");
        assert!(matches!(err, StoreError::RateLimited(_)));
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), Some(1000));
    }

    #[test]
    fn test_from_http_status_5xx_is_retryable() {
        for status in [500, 502, 503] {
            let err = StoreError::from_http_status(status, "boom");
            assert!(matches!(err, StoreError::Server(s, _) if s == status));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_from_http_status_4xx_is_terminal() {
        let err = StoreError::from_http_status(400, "bad");
        assert!(matches!(err, StoreError::RequestFailed(_)));
        assert!(!err.is_retryable());
    }
}
