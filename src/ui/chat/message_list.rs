//! Plain-text rendering of conversation messages.

use std::fmt::Write as _;

use crate::gateway::{AdvancedSearchResponse, DocumentInfo};
use crate::session::Message;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "MediQuery AI";

/// Render one message.
///
/// History entries expand into the question/answer pair they record.
pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    match message {
        Message::User { text, .. } => {
            let _ = writeln!(out, "{USER_LABEL}: {text}");
        }
        Message::Assistant { text, sources, .. } => {
            let _ = writeln!(out, "{ASSISTANT_LABEL}: {text}");
            out.push_str(&render_sources(sources));
        }
        Message::HistoryEntry(entry) => {
            let _ = writeln!(out, "{USER_LABEL}: {}", entry.message);
            let _ = writeln!(out, "{ASSISTANT_LABEL}: {}", entry.response);
            out.push_str(&render_sources(&entry.sources));
        }
        Message::Error { text, .. } => {
            let _ = writeln!(out, "[error] {text}");
        }
    }
    out
}

/// Render a list of messages separated by blank lines.
pub fn render_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered source list, or nothing when there are no sources.
pub fn render_sources(sources: &[String]) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let mut out = format!("  Sources ({}):\n", sources.len());
    for (idx, source) in sources.iter().enumerate() {
        let _ = writeln!(out, "    [{}] {source}", idx + 1);
    }
    out
}

pub fn render_search_result(result: &AdvancedSearchResponse) -> String {
    let mut out = format!("{ASSISTANT_LABEL}: {}\n", result.answer);
    if let Some(topic) = &result.topic_info {
        let _ = writeln!(out, "  Topic: {topic}");
    }
    push_list(&mut out, "Symptoms", &result.symptoms_found);
    if let Some(causes) = &result.causes_info {
        let _ = writeln!(out, "  Causes: {causes}");
    }
    push_list(&mut out, "Treatment options", &result.treatment_options);
    push_list(&mut out, "Recommended drugs", &result.recommended_drugs);
    out.push_str(&render_sources(&result.sources));
    out
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        let _ = writeln!(out, "  {label}: {}", items.join(", "));
    }
}

pub fn render_documents(documents: &[DocumentInfo]) -> String {
    if documents.is_empty() {
        return "No documents have been ingested.\n".to_string();
    }
    let mut out = format!("Ingested documents ({}):\n", documents.len());
    for doc in documents {
        let _ = write!(out, "  - {}", doc.display_name());
        match (doc.total_pages, doc.total_chunks) {
            (Some(pages), Some(chunks)) => {
                let _ = write!(out, " ({pages} pages, {chunks} chunks)");
            }
            (Some(pages), None) => {
                let _ = write!(out, " ({pages} pages)");
            }
            (None, Some(chunks)) => {
                let _ = write!(out, " ({chunks} chunks)");
            }
            (None, None) => {}
        }
        out.push('\n');
    }
    out
}
