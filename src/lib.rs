//! MediQuery chat client
//!
//! A terminal chat client for a medical question-answering service. Questions
//! are forwarded to a remote retrieval-augmented generation backend and the
//! answers are shown with their citation sources.
//!
//! # Architecture
//!
//! - **Gateway**: stateless REST client for the backend under `/api/v1/chat`
//! - **Session**: conversation store that keeps the client view of a session
//!   in step with the backend's stored history
//! - **Storage**: key-value port persisting the active session id
//! - **UI**: plain-text rendering and the interactive loop
//!
//! # Modules
//!
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`error`]: gateway and storage error types
//! - [`gateway`]: backend operations and wire types
//! - [`session`]: session identity, messages and the conversation store
//! - [`storage`]: durable key-value stores
//! - [`ui`]: terminal front end

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod ui;

pub use error::{GatewayError, StorageError};
pub use gateway::{Gateway, GatewayClient};
pub use session::{ConversationStore, SessionContext};
