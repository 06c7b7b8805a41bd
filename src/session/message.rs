//! Chat message model.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::gateway::HistoryEntry;

/// Text shown in place of an answer when a query fails.
pub const FAILED_QUERY_TEXT: &str = "Failed to process your query. Please try again.";

/// Identity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Monotonic id assigned by the store to client-created messages.
    Local(u64),
    /// Row id of a server-replayed history entry.
    Server(i64),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => write!(f, "local-{id}"),
            Self::Server(id) => write!(f, "server-{id}"),
        }
    }
}

/// One item in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    User {
        id: MessageId,
        text: String,
        timestamp: DateTime<Utc>,
    },
    Assistant {
        id: MessageId,
        text: String,
        sources: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    /// A past exchange replayed from the backend, shown as a question/answer pair.
    HistoryEntry(HistoryEntry),
    Error {
        id: MessageId,
        text: String,
        timestamp: DateTime<Utc>,
    },
}

impl Message {
    pub fn id(&self) -> MessageId {
        match self {
            Self::User { id, .. } | Self::Assistant { id, .. } | Self::Error { id, .. } => *id,
            Self::HistoryEntry(entry) => MessageId::Server(entry.id),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::User { timestamp, .. }
            | Self::Assistant { timestamp, .. }
            | Self::Error { timestamp, .. } => *timestamp,
            Self::HistoryEntry(entry) => entry.timestamp,
        }
    }

    /// Primary text. For history entries this is the original question.
    pub fn text(&self) -> &str {
        match self {
            Self::User { text, .. } | Self::Assistant { text, .. } | Self::Error { text, .. } => {
                text
            }
            Self::HistoryEntry(entry) => &entry.message,
        }
    }

    /// Citation sources, empty for messages that carry none.
    pub fn sources(&self) -> &[String] {
        match self {
            Self::Assistant { sources, .. } => sources,
            Self::HistoryEntry(entry) => &entry.sources,
            Self::User { .. } | Self::Error { .. } => &[],
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Whether this message answers a user question.
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Assistant { .. } | Self::Error { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
