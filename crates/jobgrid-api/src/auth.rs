//! Session tokens and password hashing.
//!
//! Login issues an HS256 JWT carrying the user id and role; the
//! [`AuthUser`] extractor verifies it per request. No ambient session
//! state, everything a handler needs rides in the token.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::TypedHeader;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use jobgrid_models::{Role, UserId};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JWT claims for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User role
    pub role: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issue a session token for a user.
pub fn issue_token(config: &ApiConfig, user_id: &UserId, role: Role) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.as_str().to_string(),
        role: role.as_str().to_string(),
        iat: now,
        exp: now + config.jwt_ttl.as_secs() as i64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
}

/// Verify a session token and return its claims.
pub fn verify_token(secret: &str, token: &str) -> ApiResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))
}

/// Hash a password with argon2id.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthUser {
    /// Coarse role gate; the engine's ownership checks run after this.
    pub fn require_role(&self, allowed: &[Role]) -> ApiResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Requires one of: {}",
                allowed
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(auth) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Missing bearer token"))?;

        let claims = verify_token(&state.config.jwt_secret, auth.token())?;

        let role: Role = claims
            .role
            .parse()
            .map_err(|_| ApiError::unauthorized("Token carries an unknown role"))?;

        Ok(AuthUser {
            user_id: UserId::from(claims.sub),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig::default()
    }

    #[test]
    fn test_token_round_trip() {
        let config = config();
        let user = UserId::from("user-1");
        let token = issue_token(&config, &user, Role::Employer).unwrap();

        let claims = verify_token(&config.jwt_secret, &token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "employer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let config = config();
        let token = issue_token(&config, &UserId::from("user-1"), Role::JobSeeker).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn test_verify_password_tolerates_garbage_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_role_gate() {
        let user = AuthUser {
            user_id: UserId::from("u"),
            role: Role::JobSeeker,
        };
        assert!(user.require_role(&[Role::JobSeeker]).is_ok());
        assert!(user.require_role(&[Role::Employer, Role::Admin]).is_err());
        assert!(!user.is_admin());
    }
}
