//! Backend gateway: the REST surface of the MediQuery RAG service.
//!
//! The [`Gateway`] trait is the seam between the conversation store and the
//! network. [`GatewayClient`] implements it over HTTP; tests substitute
//! scripted fakes.
//!
//! | Operation        | Endpoint                                  |
//! |------------------|-------------------------------------------|
//! | query            | `POST   /api/v1/chat/query`               |
//! | fetch history    | `GET    /api/v1/chat/history/{session_id}`|
//! | clear history    | `DELETE /api/v1/chat/history/{session_id}`|
//! | health check     | `GET    /api/v1/chat/health`              |
//! | advanced search  | `POST   /api/v1/chat/advanced-search`     |
//! | list documents   | `GET    /api/v1/chat/documents`           |

pub mod client;
pub mod types;

pub use client::{GatewayClient, Timeouts};
pub use types::{
    AdvancedSearchResponse, ClearAck, DocumentInfo, HealthStatus, HistoryEntry, QueryResponse,
    SearchRequest,
};

use async_trait::async_trait;

use crate::error::GatewayError;

/// Remote operations offered by the chat backend.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait Gateway: Send + Sync + std::fmt::Debug {
    /// Ask a question within a session.
    async fn query(&self, text: &str, session_id: &str) -> Result<QueryResponse, GatewayError>;

    /// Stored exchanges for a session, in whatever order the backend keeps
    /// them. A session the backend does not know yields an empty list.
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>, GatewayError>;

    /// Delete every stored exchange for a session.
    async fn clear_history(&self, session_id: &str) -> Result<ClearAck, GatewayError>;

    /// Liveness probe.
    async fn health_check(&self) -> Result<HealthStatus, GatewayError>;

    async fn advanced_search(
        &self,
        request: &SearchRequest,
    ) -> Result<AdvancedSearchResponse, GatewayError>;

    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, GatewayError>;
}
