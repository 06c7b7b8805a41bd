//! HTTP client for the chat backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::BackendConfig;
use crate::error::{GatewayError, Operation};

use super::Gateway;
use super::types::{
    AdvancedSearchResponse, ClearAck, DocumentInfo, ErrorDetail, HealthStatus, HistoryEntry,
    QueryRequest, QueryResponse, SearchRequest,
};

/// Path segments every endpoint lives under.
const API_BASE: [&str; 3] = ["api", "v1", "chat"];

/// Per-operation request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Applied to `POST /query`.
    pub query: Duration,
    /// Applied to history, search and document calls.
    pub request: Duration,
    /// Applied to `GET /health`.
    pub health: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(30),
            request: Duration::from_secs(10),
            health: Duration::from_secs(5),
        }
    }
}

impl From<&BackendConfig> for Timeouts {
    fn from(cfg: &BackendConfig) -> Self {
        Self {
            query: Duration::from_secs(cfg.query_timeout_secs),
            request: Duration::from_secs(cfg.request_timeout_secs),
            health: Duration::from_secs(cfg.health_timeout_secs),
        }
    }
}

/// reqwest-backed [`Gateway`].
///
/// Stateless apart from the connection pool: every call is a single attempt,
/// there is no retry and no backoff.
///
/// # Example
///
/// ```rust,no_run
/// use mediquery_chat::gateway::{Gateway, GatewayClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GatewayClient::new("http://localhost:8000")?;
/// let health = client.health_check().await?;
/// println!("{} is {}", health.service, health.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: Url,
    http: reqwest::Client,
    timeouts: Timeouts,
}

impl GatewayClient {
    /// Create a client with default timeouts.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, GatewayError> {
        Self::with_timeouts(base_url, Timeouts::default())
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(base_url: impl AsRef<str>, timeouts: Timeouts) -> Result<Self, GatewayError> {
        Self::with_client(base_url, reqwest::Client::new(), timeouts)
    }

    /// Create a client from the `backend` configuration section.
    pub fn from_config(cfg: &BackendConfig) -> Result<Self, GatewayError> {
        Self::with_timeouts(&cfg.base_url, Timeouts::from(cfg))
    }

    /// Create a client around a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
        timeouts: Timeouts,
    ) -> Result<Self, GatewayError> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|e| GatewayError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(format!("{raw}: cannot carry a path")));
        }
        Ok(Self {
            base_url,
            http,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Build `<base>/api/v1/chat/<segments..>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let Ok(mut path) = url.path_segments_mut() else {
                return Err(GatewayError::InvalidUrl(self.base_url.to_string()));
            };
            path.pop_if_empty().extend(API_BASE).extend(segments);
        }
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        timeout: Duration,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| GatewayError::transport(operation, timeout, e))?;
        Self::handle_response(operation, timeout, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        operation: Operation,
        timeout: Duration,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(operation, timeout, e))?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|source| GatewayError::Decode { operation, source });
        }

        tracing::debug!(
            name: "gateway.response.error",
            operation = %operation,
            status = status.as_u16(),
            body = %body,
            "Backend returned an error status"
        );

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound { operation });
        }

        Err(GatewayError::Server {
            operation,
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Pull a readable message out of an error body.
///
/// FastAPI wraps errors as `{"detail": ...}`; anything else is passed through.
fn error_message(body: &str) -> String {
    if let Ok(ErrorDetail { detail }) = serde_json::from_str::<ErrorDetail>(body) {
        return match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn query(&self, text: &str, session_id: &str) -> Result<QueryResponse, GatewayError> {
        let url = self.endpoint(&["query"])?;
        let body = QueryRequest {
            message: text,
            session_id,
        };
        self.execute(
            Operation::SendQuery,
            self.timeouts.query,
            self.http.post(url).json(&body),
        )
        .await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>, GatewayError> {
        let url = self.endpoint(&["history", session_id])?;
        match self
            .execute(Operation::FetchHistory, self.timeouts.request, self.http.get(url))
            .await
        {
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    name: "gateway.history.none",
                    session_id = %session_id,
                    "No stored history for session"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn clear_history(&self, session_id: &str) -> Result<ClearAck, GatewayError> {
        let url = self.endpoint(&["history", session_id])?;
        self.execute(
            Operation::ClearHistory,
            self.timeouts.request,
            self.http.delete(url),
        )
        .await
    }

    async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
        let url = self.endpoint(&["health"])?;
        self.execute(Operation::HealthCheck, self.timeouts.health, self.http.get(url))
            .await
    }

    async fn advanced_search(
        &self,
        request: &SearchRequest,
    ) -> Result<AdvancedSearchResponse, GatewayError> {
        let url = self.endpoint(&["advanced-search"])?;
        self.execute(
            Operation::AdvancedSearch,
            self.timeouts.request,
            self.http.post(url).json(request),
        )
        .await
    }

    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, GatewayError> {
        let url = self.endpoint(&["documents"])?;
        self.execute(
            Operation::ListDocuments,
            self.timeouts.request,
            self.http.get(url),
        )
        .await
    }
}
