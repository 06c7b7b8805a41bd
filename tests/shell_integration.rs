//! Terminal shell driven with scripted input.

mod common;

use common::{Reply, ScriptedGateway, at, history_entry, store_with};
use mediquery_chat::session::FAILED_QUERY_TEXT;
use mediquery_chat::ui::chat::{ChatShell, Flow};

const BACKEND_URL: &str = "http://localhost:8000";

async fn run_script(gateway: &std::sync::Arc<ScriptedGateway>, script: &str) -> String {
    let (store, _) = store_with(gateway);
    let mut shell = ChatShell::start(store, BACKEND_URL, Vec::new()).await.unwrap();
    shell.run(script.as_bytes()).await.unwrap();
    String::from_utf8(shell.into_output()).unwrap()
}

#[tokio::test]
async fn test_start_shows_welcome_and_sidebar() {
    let gateway = ScriptedGateway::new();
    let output = run_script(&gateway, "/quit\n").await;

    assert!(output.starts_with("MediQuery Assistant\n"));
    assert!(output.contains("Status:  online (Medical RAG Chatbot)"));
    assert!(output.contains("Messages: 0"));
    assert!(output.contains("  2. What is the pathophysiology of diabetes?"));
}

#[tokio::test]
async fn test_start_replays_history_instead_of_welcome() {
    let gateway = ScriptedGateway::new();
    gateway.set_history(vec![
        history_entry(2, "Second?", "Second answer.", at(10, 5)),
        history_entry(1, "First?", "First answer.", at(10, 0)),
    ]);
    let output = run_script(&gateway, "").await;

    assert!(!output.contains("Welcome to MediQuery AI"));
    assert!(output.contains("Messages: 4"));
    let first = output.find("You: First?").unwrap();
    let second = output.find("You: Second?").unwrap();
    assert!(first < second);
    assert!(output.contains("MediQuery AI: First answer."));
}

#[tokio::test]
async fn test_suggestion_number_asks_question() {
    let gateway = ScriptedGateway::new();
    gateway.push_reply(Reply::answer("Antibiotics are first line.", &["pulm.pdf"]));
    let output = run_script(&gateway, "3\n/quit\n").await;

    assert!(output.contains("Searching medical database..."));
    assert!(output.contains("MediQuery AI: Antibiotics are first line."));
    assert!(output.contains("[1] pulm.pdf"));
    assert_eq!(gateway.query_calls(), 1);
}

#[tokio::test]
async fn test_failed_question_prints_error_text() {
    let gateway = ScriptedGateway::new();
    gateway.push_reply(Reply::Fail);
    let output = run_script(&gateway, "What is sepsis?\n").await;

    assert!(output.contains(&format!("[error] {FAILED_QUERY_TEXT}")));
}

#[tokio::test]
async fn test_new_chat_rotates_session() {
    let gateway = ScriptedGateway::new();
    let (store, _) = store_with(&gateway);
    let mut shell = ChatShell::start(store, BACKEND_URL, Vec::new()).await.unwrap();
    let before = shell.session().id().clone();

    shell.handle("What is asthma?").await.unwrap();
    assert_eq!(shell.handle("/new").await.unwrap(), Flow::Continue);

    assert_ne!(shell.session().id(), &before);
    assert_eq!(shell.store().message_count(), 0);
    let output = String::from_utf8(shell.into_output()).unwrap();
    assert!(output.contains("Started a new chat"));
}

#[tokio::test]
async fn test_clear_failure_is_silent() {
    let gateway = ScriptedGateway::new();
    gateway.fail_clear(true);
    let (store, _) = store_with(&gateway);
    let mut shell = ChatShell::start(store, BACKEND_URL, Vec::new()).await.unwrap();
    shell.handle("What is asthma?").await.unwrap();
    let before = String::from_utf8(shell.output().clone()).unwrap();

    shell.handle("/clear").await.unwrap();

    assert_eq!(shell.store().message_count(), 2);
    let after = String::from_utf8(shell.into_output()).unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_clear_success_prints_ack() {
    let gateway = ScriptedGateway::new();
    let output = run_script(&gateway, "What is asthma?\n/clear\n").await;

    assert!(output.contains("History cleared for session"));
    assert_eq!(gateway.cleared_sessions().len(), 1);
}

#[tokio::test]
async fn test_health_offline() {
    let gateway = ScriptedGateway::new();
    gateway.set_healthy(false);
    let output = run_script(&gateway, "/health\n").await;

    assert!(output.contains("Status:  offline"));
    assert!(output.contains("Backend offline: failed to check backend health"));
}

#[tokio::test]
async fn test_search_and_documents() {
    let gateway = ScriptedGateway::new();
    let output = run_script(&gateway, "/search pneumonia topic=respiratory +drugs\n/docs\n").await;

    assert!(output.contains("search: pneumonia"));
    assert!(output.contains("harrison.pdf"));
}

#[tokio::test]
async fn test_unknown_command_and_help() {
    let gateway = ScriptedGateway::new();
    let output = run_script(&gateway, "/bogus\n/help\n").await;

    assert!(output.contains("unknown command `/bogus`"));
    assert!(output.contains("/new                start a new chat"));
    assert_eq!(gateway.query_calls(), 0);
}
