//! Firestore REST client.
//!
//! Production-oriented client with token caching, HTTP pooling, retry
//! with backoff, and request tracing/metrics. All repository types in
//! this crate go through [`StoreClient`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::retry::RetryConfig;
use crate::token_cache::TokenCache;
use crate::types::{
    Document, ListDocumentsResponse, RunQueryRequest, RunQueryResponse, StructuredQuery, Value,
};

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Emulator host ("host:port"), for local development and tests
    pub emulator_host: Option<String>,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                StoreError::auth("GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set")
            })?;

        if project_id.is_empty() {
            return Err(StoreError::auth(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        let connect_timeout_secs: u64 = std::env::var("STORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            emulator_host: std::env::var("FIRESTORE_EMULATOR_HOST").ok(),
        })
    }
}

/// Firestore REST client.
pub struct StoreClient {
    http: Client,
    config: StoreConfig,
    base_url: String,
    /// None when talking to the emulator, which accepts a static token.
    token_cache: Option<Arc<TokenCache>>,
}

impl Clone for StoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            token_cache: self.token_cache.clone(),
        }
    }
}

impl StoreClient {
    /// Create a new store client.
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobgrid-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let (base_url, token_cache) = match &config.emulator_host {
            Some(host) => {
                let url = format!(
                    "http://{}/v1/projects/{}/databases/{}/documents",
                    host, config.project_id, config.database_id
                );
                (url, None)
            }
            None => {
                let url = format!(
                    "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
                    config.project_id, config.database_id
                );
                let auth = Self::create_auth_provider()?;
                (url, Some(Arc::new(TokenCache::new(auth))))
            }
        };

        Ok(Self {
            http,
            config,
            base_url,
            token_cache,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StoreResult<Self> {
        let config = StoreConfig::from_env()?;
        Self::new(config).await
    }

    fn create_auth_provider() -> StoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env()
            .map_err(|e| StoreError::auth(format!("Failed to load service account: {}", e)))?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(StoreError::auth(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    async fn get_token(&self) -> StoreResult<String> {
        match &self.token_cache {
            Some(cache) => cache.get_token().await,
            None => Ok("owner".to_string()),
        }
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    /// Build the full resource name for a document.
    pub fn full_document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.config.project_id, self.config.database_id, collection, doc_id
        )
    }

    /// Send a request with a bearer token, refreshing the token once on
    /// an expired-token 401 and replaying the request.
    async fn send_authorized(
        &self,
        method: Method,
        url: &str,
        body: Option<&Document>,
    ) -> StoreResult<reqwest::Response> {
        let token = self.get_token().await?;
        let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
        if let Some(doc) = body {
            request = request.json(doc);
        }
        let response = request.send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&text) {
            return Err(StoreError::from_http_status(
                401,
                format!("{} failed: {}", url, text),
            ));
        }

        if let Some(cache) = &self.token_cache {
            cache.invalidate().await;
        }
        let token = self.get_token().await?;
        let mut retry = self.http.request(method, url).bearer_auth(&token);
        if let Some(doc) = body {
            retry = retry.json(doc);
        }
        Ok(retry.send().await?)
    }

    /// Variant of [`send_authorized`] for arbitrary JSON bodies.
    async fn send_authorized_json<B: serde::Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> StoreResult<reqwest::Response> {
        let token = self.get_token().await?;
        let response = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&text) {
            return Err(StoreError::from_http_status(
                401,
                format!("{} failed: {}", url, text),
            ));
        }

        if let Some(cache) = &self.token_cache {
            cache.invalidate().await;
        }
        let token = self.get_token().await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?)
    }

    // =========================================================================
    // CRUD operations
    // =========================================================================

    /// Get a document. Returns None when absent.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> StoreResult<Option<Document>> {
        let url = self.document_path(collection, doc_id);

        self.execute_request("get_document", collection, Some(doc_id), async {
            self.with_retry("get_document", || async {
                let response = self.send_authorized(Method::GET, &url, None).await?;
                match response.status() {
                    StatusCode::OK => Ok(Some(response.json().await?)),
                    StatusCode::NOT_FOUND => Ok(None),
                    status => Err(Self::handle_error_response(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Create a document. Fails with AlreadyExists when the id is taken.
    ///
    /// Single-shot, no retry: replaying a create whose first attempt
    /// landed but whose response was lost would misreport success as a
    /// conflict.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<Document> {
        let url = format!("{}/{}?documentId={}", self.base_url, collection, doc_id);
        let body = Document::new(fields);

        self.execute_request("create_document", collection, Some(doc_id), async {
            let response = self.send_authorized(Method::POST, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                StatusCode::CONFLICT => {
                    Err(StoreError::AlreadyExists(format!("{}/{}", collection, doc_id)))
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Patch a document, merging only the masked fields in one atomic
    /// single-document write.
    pub async fn patch_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: Vec<String>,
    ) -> StoreResult<Document> {
        let mut url = self.document_path(collection, doc_id);
        if !update_mask.is_empty() {
            let params: Vec<String> = update_mask
                .iter()
                .map(|f| format!("updateMask.fieldPaths={}", f))
                .collect();
            url = format!("{}?{}", url, params.join("&"));
        }
        let body = Document::new(fields);

        // Masked patches write absolute values, so a replay is safe.
        self.execute_request("patch_document", collection, Some(doc_id), async {
            self.with_retry("patch_document", || async {
                let response = self
                    .send_authorized(Method::PATCH, &url, Some(&body))
                    .await?;
                match response.status() {
                    StatusCode::OK => Ok(response.json().await?),
                    StatusCode::NOT_FOUND => {
                        Err(StoreError::not_found(format!("{}/{}", collection, doc_id)))
                    }
                    status => Err(Self::handle_error_response(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Delete a document. Deleting an absent document is idempotent.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
        let url = self.document_path(collection, doc_id);
        let coll = collection.to_string();
        let id = doc_id.to_string();

        self.execute_request("delete_document", collection, Some(doc_id), async {
            self.with_retry("delete_document", || async {
                let response = self.send_authorized(Method::DELETE, &url, None).await?;
                match response.status() {
                    StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                    StatusCode::NOT_FOUND => {
                        debug!("Document {}/{} already deleted (idempotent)", coll, id);
                        Ok(())
                    }
                    status => Err(Self::handle_error_response(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// List documents in a collection.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> StoreResult<ListDocumentsResponse> {
        let mut url = format!("{}/{}", self.base_url, collection);
        let mut params = Vec::new();
        if let Some(size) = page_size {
            params.push(format!("pageSize={}", size));
        }
        if let Some(token) = page_token {
            params.push(format!("pageToken={}", token));
        }
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }

        self.execute_request("list_documents", collection, None, async {
            self.with_retry("list_documents", || async {
                let response = self.send_authorized(Method::GET, &url, None).await?;
                match response.status() {
                    StatusCode::OK => Ok(response.json().await?),
                    status => Err(Self::handle_error_response(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Run a structured query over a root-level collection.
    pub async fn run_query(&self, query: StructuredQuery) -> StoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();
        let request = RunQueryRequest {
            structured_query: query,
        };

        self.execute_request("run_query", &collection, None, async {
            self.with_retry("run_query", || async {
                let response = self
                    .send_authorized_json(Method::POST, &url, &request)
                    .await?;
                match response.status() {
                    StatusCode::OK => {
                        let body = response.text().await.unwrap_or_default();
                        // runQuery returns a JSON array of per-document responses
                        let responses: Vec<RunQueryResponse> =
                            serde_json::from_str(&body).map_err(|e| {
                                StoreError::request_failed(format!(
                                    "Failed to parse runQuery response: {} (body prefix: {})",
                                    e,
                                    &body[..body.len().min(200)]
                                ))
                            })?;
                        Ok(responses.into_iter().filter_map(|r| r.document).collect())
                    }
                    status => Err(Self::handle_error_response(status, &url, response).await),
                }
            })
            .await
        })
        .await
    }

    /// Execute with the client's retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = StoreResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = if let Some(id) = doc_id {
            info_span!("store_request", operation = %operation, collection = %collection, doc_id = %id)
        } else {
            info_span!("store_request", operation = %operation, collection = %collection)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
