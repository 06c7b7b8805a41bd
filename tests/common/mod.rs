//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mediquery_chat::error::{GatewayError, Operation};
use mediquery_chat::gateway::{
    AdvancedSearchResponse, ClearAck, DocumentInfo, Gateway, HealthStatus, HistoryEntry,
    QueryResponse, SearchRequest,
};
use mediquery_chat::session::ConversationStore;
use mediquery_chat::storage::{KeyValueStore, MemoryStore};

/// Scripted reply to one query.
#[derive(Debug, Clone)]
pub enum Reply {
    Answer { text: String, sources: Vec<String> },
    Fail,
    TimeOut,
}

impl Reply {
    pub fn answer(text: &str, sources: &[&str]) -> Self {
        Self::Answer {
            text: text.to_string(),
            sources: sources.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// In-process [`Gateway`] whose behavior is set per test.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    history: Mutex<Vec<HistoryEntry>>,
    history_fails: AtomicBool,
    clear_fails: AtomicBool,
    healthy: AtomicBool,
    query_delay: Mutex<Option<Duration>>,
    query_calls: AtomicUsize,
    queried_sessions: Mutex<Vec<String>>,
    cleared_sessions: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        let gateway = Self::default();
        gateway.healthy.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_history(&self, entries: Vec<HistoryEntry>) {
        *self.history.lock().unwrap() = entries;
    }

    pub fn fail_history(&self, fail: bool) {
        self.history_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clear(&self, fail: bool) {
        self.clear_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn delay_queries(&self, delay: Duration) {
        *self.query_delay.lock().unwrap() = Some(delay);
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn queried_sessions(&self) -> Vec<String> {
        self.queried_sessions.lock().unwrap().clone()
    }

    pub fn cleared_sessions(&self) -> Vec<String> {
        self.cleared_sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn query(&self, text: &str, session_id: &str) -> Result<QueryResponse, GatewayError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queried_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());

        let delay = *self.query_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Answer { text, sources }) => Ok(QueryResponse {
                answer: text,
                sources,
                session_id: Some(session_id.to_string()),
            }),
            Some(Reply::Fail) => Err(GatewayError::Server {
                operation: Operation::SendQuery,
                status: 500,
                message: "LLM provider unavailable".to_string(),
            }),
            Some(Reply::TimeOut) => Err(GatewayError::Timeout {
                operation: Operation::SendQuery,
                timeout: Duration::from_secs(30),
            }),
            None => Ok(QueryResponse {
                answer: format!("answer to: {text}"),
                sources: Vec::new(),
                session_id: Some(session_id.to_string()),
            }),
        }
    }

    async fn fetch_history(&self, _session_id: &str) -> Result<Vec<HistoryEntry>, GatewayError> {
        if self.history_fails.load(Ordering::SeqCst) {
            return Err(GatewayError::Server {
                operation: Operation::FetchHistory,
                status: 500,
                message: "database is locked".to_string(),
            });
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn clear_history(&self, session_id: &str) -> Result<ClearAck, GatewayError> {
        if self.clear_fails.load(Ordering::SeqCst) {
            return Err(GatewayError::Server {
                operation: Operation::ClearHistory,
                status: 500,
                message: "database is locked".to_string(),
            });
        }
        self.cleared_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());
        self.history.lock().unwrap().clear();
        Ok(ClearAck {
            message: format!("History cleared for session {session_id}"),
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                service: "Medical RAG Chatbot".to_string(),
            })
        } else {
            Err(GatewayError::Timeout {
                operation: Operation::HealthCheck,
                timeout: Duration::from_secs(5),
            })
        }
    }

    async fn advanced_search(
        &self,
        request: &SearchRequest,
    ) -> Result<AdvancedSearchResponse, GatewayError> {
        Ok(AdvancedSearchResponse {
            answer: format!("search: {}", request.query),
            topic_info: request.topic.clone(),
            sources: vec!["search.pdf".to_string()],
            session_id: Some(request.session_id.clone()),
            ..AdvancedSearchResponse::default()
        })
    }

    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, GatewayError> {
        Ok(vec![DocumentInfo {
            filename: Some("harrison.pdf".to_string()),
            total_pages: Some(2800),
            ..DocumentInfo::default()
        }])
    }
}

/// Store over a scripted gateway and fresh in-memory storage.
pub fn store_with(gateway: &Arc<ScriptedGateway>) -> (ConversationStore, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = ConversationStore::new(
        Arc::clone(gateway) as Arc<dyn Gateway>,
        Arc::clone(&storage) as Arc<dyn KeyValueStore>,
    );
    (store, storage)
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

pub fn history_entry(id: i64, question: &str, answer: &str, timestamp: DateTime<Utc>) -> HistoryEntry {
    HistoryEntry {
        id,
        session_id: None,
        message: question.to_string(),
        response: answer.to_string(),
        sources: vec!["doc1".to_string()],
        timestamp,
    }
}
