//! Error types for the gateway client and the session storage port.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Backend operation that produced a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SendQuery,
    FetchHistory,
    ClearHistory,
    HealthCheck,
    AdvancedSearch,
    ListDocuments,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SendQuery => "send message",
            Self::FetchHistory => "fetch chat history",
            Self::ClearHistory => "clear chat history",
            Self::HealthCheck => "check backend health",
            Self::AdvancedSearch => "run advanced search",
            Self::ListDocuments => "fetch documents",
        };
        f.write_str(label)
    }
}

/// Failure talking to the chat backend.
///
/// Every variant carries the [`Operation`] it came from so the rendered
/// message reads like "failed to send message: ...".
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backend could not be reached.
    #[error("failed to {operation}: backend unreachable: {source}")]
    Network {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// No response arrived within the configured timeout.
    #[error("failed to {operation}: no response within {}s", timeout.as_secs_f32())]
    Timeout {
        operation: Operation,
        timeout: Duration,
    },

    /// The backend answered with a non-2xx status.
    #[error("failed to {operation}: backend returned {status}: {message}")]
    Server {
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// The backend answered 404.
    #[error("failed to {operation}: not found")]
    NotFound { operation: Operation },

    /// The response body did not match the expected shape.
    #[error("failed to {operation}: malformed response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot carry API paths.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Classify a transport error from reqwest.
    pub(crate) fn transport(operation: Operation, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { operation, timeout }
        } else {
            Self::Network { operation, source }
        }
    }

    /// The operation that failed, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Network { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::Server { operation, .. }
            | Self::NotFound { operation }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::InvalidUrl(_) => None,
        }
    }

    /// HTTP status code carried by the error, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Failure reading or writing the durable key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}
