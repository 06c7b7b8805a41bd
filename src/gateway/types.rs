//! Wire types for the chat backend.
//!
//! These mirror the backend's JSON request and response bodies under
//! `/api/v1/chat`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Query
// =============================================================================

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    /// The user's question.
    pub message: &'a str,
    /// Session the exchange is recorded under.
    pub session_id: &'a str,
}

/// Answer returned by `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text.
    pub answer: String,
    /// Citation sources backing the answer, in display order.
    #[serde(default, deserialize_with = "nullable_list")]
    pub sources: Vec<String>,
    /// Session the backend recorded the exchange under.
    #[serde(default)]
    pub session_id: Option<String>,
}

// =============================================================================
// History
// =============================================================================

/// One completed question/answer pair replayed from backend storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Server-side row id.
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// The question that was asked.
    pub message: String,
    /// The answer that was given.
    pub response: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub sources: Vec<String>,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement returned by `DELETE /history/{session_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClearAck {
    pub message: String,
}

// =============================================================================
// Health
// =============================================================================

/// Liveness report returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

// =============================================================================
// Advanced search
// =============================================================================

/// Structured filter sent to `POST /advanced-search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Main search query.
    pub query: String,
    /// Medical topic, e.g. "cardiology".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    /// Include causes in the answer.
    pub causes: bool,
    /// Include treatment options in the answer.
    pub treatment: bool,
    /// Include recommended drugs in the answer.
    pub drugs: bool,
    pub session_id: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.into(),
            ..Self::default()
        }
    }
}

/// Result of an advanced search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdvancedSearchResponse {
    pub answer: String,
    #[serde(default)]
    pub topic_info: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub symptoms_found: Vec<String>,
    #[serde(default)]
    pub causes_info: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub treatment_options: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub recommended_drugs: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

// =============================================================================
// Documents
// =============================================================================

/// Metadata about an ingested source document.
///
/// Every field is optional; fields the client does not know are kept in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_chunks: Option<u32>,
    #[serde(default)]
    pub ingest_date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DocumentInfo {
    /// Best available human-readable name.
    pub fn display_name(&self) -> String {
        self.filename
            .clone()
            .or_else(|| self.file_path.clone())
            .or_else(|| self.id.map(|id| format!("document #{id}")))
            .unwrap_or_else(|| "unnamed document".to_string())
    }
}

// =============================================================================
// Decoding helpers
// =============================================================================

/// Error body FastAPI produces for `HTTPException`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: serde_json::Value,
}

/// Treat `null` the same as a missing list.
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept RFC 3339 as well as naive ISO-8601 timestamps (taken as UTC).
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
