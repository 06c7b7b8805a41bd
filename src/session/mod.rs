//! Session and conversation management.
//!
//! This module keeps the client-side view of one chat session in step with
//! the backend. Sessions are identified by UUID; only the id is persisted,
//! the messages are replayed from the backend's stored history.
//!
//! # Architecture
//!
//! - [`SessionContext`]: the session an operation runs against, with its
//!   cancellation token
//! - [`Message`]: user, assistant, replayed-history and error messages
//! - [`Conversation`]: ordered messages with pending/resolved sends
//! - [`ConversationStore`]: the operations (initialize, load, send, clear,
//!   rotate) over a [`Gateway`](crate::gateway::Gateway) and a
//!   [`KeyValueStore`](crate::storage::KeyValueStore)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mediquery_chat::gateway::GatewayClient;
//! use mediquery_chat::session::ConversationStore;
//! use mediquery_chat::storage::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(GatewayClient::new("http://localhost:8000")?);
//! let store = ConversationStore::new(gateway, Arc::new(MemoryStore::new()));
//!
//! let ctx = store.initialize_session()?;
//! store.load_history(&ctx).await;
//! let outcome = store.send_and_resolve(&ctx, "What is pneumonia?").await;
//! println!("{:?}", outcome.message());
//! # Ok(())
//! # }
//! ```

mod context;
mod message;
mod store;
mod thread;

pub use context::{SessionContext, SessionId};
pub use message::{FAILED_QUERY_TEXT, Message, MessageId};
pub use store::{ConversationStore, SendOutcome, SendState};
pub use thread::{Conversation, Ticket};
