//! Conversation store: the client side of session synchronization.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, StorageError};
use crate::gateway::{ClearAck, Gateway, HistoryEntry};
use crate::storage::{KeyValueStore, SESSION_ID_KEY};

use super::context::{SessionContext, SessionId};
use super::message::{FAILED_QUERY_TEXT, Message, MessageId};
use super::thread::Conversation;

/// Lifecycle of the most recent send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendState {
    #[default]
    Idle,
    Sending,
    Resolved,
    Failed,
}

/// Result of [`ConversationStore::send_and_resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The backend answered; carries the appended `Assistant` message.
    Resolved(Message),
    /// The query failed; carries the appended `Error` message.
    Failed(Message),
    /// The input was blank and nothing was sent.
    Blank,
    /// The session was superseded or cleared before the reply could be
    /// attached; the reply was dropped.
    Stale,
}

impl SendOutcome {
    /// The message appended as the reply, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Resolved(msg) | Self::Failed(msg) => Some(msg),
            Self::Blank | Self::Stale => None,
        }
    }
}

/// Conversation state for the active session.
///
/// Holds the ordered messages, the active [`SessionContext`] and UI flags.
/// Only the session id is persisted (through the [`KeyValueStore`] port);
/// messages are rehydrated from the backend with [`load_history`].
///
/// Cloning is cheap and clones share state.
///
/// [`load_history`]: ConversationStore::load_history
#[derive(Debug, Clone)]
pub struct ConversationStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    gateway: Arc<dyn Gateway>,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    active: Option<SessionContext>,
    conversation: Conversation,
    next_local_id: u64,
    send_state: SendState,
    sidebar_open: bool,
}

impl StoreState {
    fn allocate_id(&mut self) -> MessageId {
        self.next_local_id += 1;
        MessageId::Local(self.next_local_id)
    }

    fn is_current(&self, ctx: &SessionContext) -> bool {
        !ctx.is_cancelled()
            && self
                .active
                .as_ref()
                .is_none_or(|active| active.id() == ctx.id())
    }
}

impl ConversationStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                storage,
                state: RwLock::new(StoreState {
                    active: None,
                    conversation: Conversation::new(),
                    next_local_id: 0,
                    send_state: SendState::Idle,
                    sidebar_open: true,
                }),
            }),
        }
    }

    /// Set the initial sidebar flag.
    #[must_use]
    pub fn with_sidebar_open(self, open: bool) -> Self {
        self.write().sidebar_open = open;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The gateway this store talks to.
    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.inner.gateway)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Return the active session, restoring the persisted id or minting and
    /// persisting a fresh one.
    ///
    /// Repeated calls return the same id for as long as the storage keeps it.
    /// Storage is read and written under the state lock, so concurrent callers
    /// settle on the id that was persisted.
    pub fn initialize_session(&self) -> Result<SessionContext, StorageError> {
        if let Some(ctx) = self.read().active.clone() {
            return Ok(ctx);
        }

        let mut state = self.write();
        if let Some(ctx) = state.active.clone() {
            return Ok(ctx);
        }

        let persisted = self
            .inner
            .storage
            .get(SESSION_ID_KEY)?
            .as_deref()
            .and_then(SessionId::parse);

        let id = match persisted {
            Some(id) => {
                debug!(name: "session.restored", session_id = %id, "Restored persisted session");
                id
            }
            None => {
                let id = SessionId::generate();
                self.inner.storage.set(SESSION_ID_KEY, id.as_str())?;
                info!(name: "session.created", session_id = %id, "Created new session");
                id
            }
        };

        let ctx = SessionContext::new(id);
        state.active = Some(ctx.clone());
        Ok(ctx)
    }

    /// Replace the active session with a freshly minted one.
    ///
    /// Persists the new id, cancels the previous context and empties the
    /// conversation. The backend is not contacted; the old session's history
    /// stays on the server.
    pub fn start_new_session(&self) -> Result<SessionContext, StorageError> {
        let mut state = self.write();
        let previous = match state.active.as_ref() {
            Some(ctx) => Some(ctx.id().clone()),
            None => self
                .inner
                .storage
                .get(SESSION_ID_KEY)?
                .as_deref()
                .and_then(SessionId::parse),
        };

        let mut id = SessionId::generate();
        while previous.as_ref() == Some(&id) {
            id = SessionId::generate();
        }
        self.inner.storage.set(SESSION_ID_KEY, id.as_str())?;

        let ctx = SessionContext::new(id);
        if let Some(old) = state.active.replace(ctx.clone()) {
            old.cancel();
        }
        state.conversation.clear();
        state.send_state = SendState::Idle;
        drop(state);

        info!(
            name: "session.rotated",
            previous = ?previous.as_ref().map(SessionId::as_str),
            session_id = %ctx.id(),
            "Started new session"
        );
        Ok(ctx)
    }

    /// The active session, if one has been initialized.
    pub fn active_session(&self) -> Option<SessionContext> {
        self.read().active.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation
    // ─────────────────────────────────────────────────────────────────────────

    /// Rehydrate the conversation from the backend.
    ///
    /// History is ordered oldest-first and replaces local state wholesale.
    /// A session without history yields an empty list. Any other fetch
    /// failure also yields an empty list but leaves local state alone; it is
    /// only logged.
    pub async fn load_history(&self, ctx: &SessionContext) -> Vec<HistoryEntry> {
        let mut entries = match self.inner.gateway.fetch_history(ctx.id().as_str()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    name: "chat.history.load_failed",
                    session_id = %ctx.id(),
                    error = %e,
                    "No existing chat history loaded"
                );
                return Vec::new();
            }
        };
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        let mut state = self.write();
        if !state.is_current(ctx) {
            debug!(
                name: "chat.history.stale",
                session_id = %ctx.id(),
                "Session changed while loading history; not applied"
            );
            return entries;
        }
        state
            .conversation
            .replace(entries.iter().cloned().map(Message::HistoryEntry));
        drop(state);

        info!(
            name: "chat.history.loaded",
            session_id = %ctx.id(),
            entries = entries.len(),
            "Loaded chat history"
        );
        entries
    }

    /// Allocate an id for a client-created message.
    pub fn next_local_id(&self) -> MessageId {
        self.write().allocate_id()
    }

    /// Append a message without contacting the backend.
    pub fn append_local(&self, message: Message) {
        self.write().conversation.push(message);
    }

    /// Send a question and attach its reply.
    ///
    /// The `User` message is shown immediately. A successful query appends an
    /// `Assistant` message with the answer and its sources; any failure
    /// appends an `Error` message with [`FAILED_QUERY_TEXT`]. Failures are
    /// logged and never retried.
    pub async fn send_and_resolve(&self, ctx: &SessionContext, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Blank;
        }

        let ticket = {
            let mut state = self.write();
            if !state.is_current(ctx) {
                warn!(
                    name: "chat.query.rejected",
                    session_id = %ctx.id(),
                    "Send against a superseded session ignored"
                );
                return SendOutcome::Stale;
            }
            let user = Message::User {
                id: state.allocate_id(),
                text: text.to_string(),
                timestamp: Utc::now(),
            };
            state.send_state = SendState::Sending;
            state.conversation.push_pending(user)
        };

        debug!(
            name: "chat.query.sent",
            session_id = %ctx.id(),
            chars = text.chars().count(),
            "Sending query"
        );

        let result = tokio::select! {
            biased;
            () = ctx.cancelled() => None,
            result = self.inner.gateway.query(text, ctx.id().as_str()) => Some(result),
        };

        let Some(result) = result else {
            self.write().conversation.abandon(ticket);
            info!(
                name: "chat.query.abandoned",
                session_id = %ctx.id(),
                "Session superseded while query was in flight"
            );
            return SendOutcome::Stale;
        };

        let failed = result.is_err();
        let mut state = self.write();
        let reply = match result {
            Ok(response) => {
                if let Some(echoed) = response.session_id.as_deref() {
                    if echoed != ctx.id().as_str() {
                        warn!(
                            name: "chat.query.session_mismatch",
                            session_id = %ctx.id(),
                            echoed = %echoed,
                            "Backend answered for a different session"
                        );
                    }
                }
                Message::Assistant {
                    id: state.allocate_id(),
                    text: response.answer,
                    sources: response.sources,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                log_query_failure(ctx, &e);
                Message::Error {
                    id: state.allocate_id(),
                    text: FAILED_QUERY_TEXT.to_string(),
                    timestamp: Utc::now(),
                }
            }
        };

        if !state.is_current(ctx) || !state.conversation.resolve(ticket, reply.clone()) {
            if state.is_current(ctx) && !state.conversation.has_pending() {
                state.send_state = SendState::Idle;
            }
            debug!(
                name: "chat.query.stale",
                session_id = %ctx.id(),
                "Reply arrived after the conversation moved on; dropped"
            );
            return SendOutcome::Stale;
        }

        if failed {
            state.send_state = SendState::Failed;
            SendOutcome::Failed(reply)
        } else {
            state.send_state = SendState::Resolved;
            SendOutcome::Resolved(reply)
        }
    }

    /// Delete the session's history on the backend.
    ///
    /// On success the local conversation is emptied. On failure local state
    /// is untouched and the error is logged and returned; it is not added to
    /// the conversation.
    pub async fn clear_history(&self, ctx: &SessionContext) -> Result<ClearAck, GatewayError> {
        match self.inner.gateway.clear_history(ctx.id().as_str()).await {
            Ok(ack) => {
                let mut state = self.write();
                if state.is_current(ctx) {
                    state.conversation.clear();
                }
                drop(state);
                info!(
                    name: "chat.history.cleared",
                    session_id = %ctx.id(),
                    "Cleared chat history"
                );
                Ok(ack)
            }
            Err(e) => {
                error!(
                    name: "chat.history.clear_failed",
                    session_id = %ctx.id(),
                    error = %e,
                    "Error clearing history"
                );
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Messages in display order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.read().conversation.messages()
    }

    /// Messages as displayed, with each history entry counted as a question
    /// and an answer.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.read().conversation.len()
    }

    #[must_use]
    pub fn send_state(&self) -> SendState {
        self.read().send_state
    }

    /// Whether a send is awaiting its reply.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().conversation.has_pending()
    }

    #[must_use]
    pub fn sidebar_open(&self) -> bool {
        self.read().sidebar_open
    }

    /// Flip the sidebar flag and return the new value.
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.write();
        state.sidebar_open = !state.sidebar_open;
        state.sidebar_open
    }
}

fn log_query_failure(ctx: &SessionContext, err: &GatewayError) {
    error!(
        name: "chat.query.failed",
        session_id = %ctx.id(),
        status = ?err.status(),
        timeout = err.is_timeout(),
        error = %err,
        "Error sending message"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        AdvancedSearchResponse, DocumentInfo, HealthStatus, QueryResponse, SearchRequest,
    };
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    /// Gateway that answers every query with a fixed reply.
    #[derive(Debug)]
    struct EchoGateway;

    #[async_trait]
    impl Gateway for EchoGateway {
        async fn query(&self, text: &str, session_id: &str) -> Result<QueryResponse, GatewayError> {
            Ok(QueryResponse {
                answer: format!("echo: {text}"),
                sources: vec!["echo.pdf".to_string()],
                session_id: Some(session_id.to_string()),
            })
        }

        async fn fetch_history(&self, _: &str) -> Result<Vec<HistoryEntry>, GatewayError> {
            Ok(Vec::new())
        }

        async fn clear_history(&self, session_id: &str) -> Result<ClearAck, GatewayError> {
            Ok(ClearAck {
                message: format!("History cleared for session {session_id}"),
            })
        }

        async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                service: "echo".to_string(),
            })
        }

        async fn advanced_search(
            &self,
            _: &SearchRequest,
        ) -> Result<AdvancedSearchResponse, GatewayError> {
            Ok(AdvancedSearchResponse::default())
        }

        async fn list_documents(&self) -> Result<Vec<DocumentInfo>, GatewayError> {
            Ok(Vec::new())
        }
    }

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(EchoGateway), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_send_transitions_state() {
        let store = store();
        let ctx = store.initialize_session().unwrap();
        assert_eq!(store.send_state(), SendState::Idle);

        let outcome = store.send_and_resolve(&ctx, "hello").await;
        assert_eq!(outcome.message().unwrap().text(), "echo: hello");
        assert_eq!(store.send_state(), SendState::Resolved);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_blank_input_is_not_sent() {
        let store = store();
        let ctx = store.initialize_session().unwrap();
        assert_eq!(store.send_and_resolve(&ctx, "  \n").await, SendOutcome::Blank);
        assert_eq!(store.message_count(), 0);
        assert_eq!(store.send_state(), SendState::Idle);
    }

    #[tokio::test]
    async fn test_send_on_superseded_context_is_stale() {
        let store = store();
        let old = store.initialize_session().unwrap();
        let _new = store.start_new_session().unwrap();

        assert!(old.is_cancelled());
        assert_eq!(store.send_and_resolve(&old, "late").await, SendOutcome::Stale);
        assert_eq!(store.message_count(), 0);
    }

    #[test]
    fn test_local_ids_are_monotonic() {
        let store = store();
        let MessageId::Local(a) = store.next_local_id() else {
            panic!("expected local id");
        };
        let MessageId::Local(b) = store.next_local_id() else {
            panic!("expected local id");
        };
        assert!(b > a);
    }

    #[test]
    fn test_toggle_sidebar() {
        let store = store().with_sidebar_open(false);
        assert!(!store.sidebar_open());
        assert!(store.toggle_sidebar());
        assert!(store.sidebar_open());
    }
}
