//! Input line parsing.

use crate::gateway::SearchRequest;

use super::header::SUGGESTIONS;

pub const HELP_TEXT: &str = "\
Commands:
  <question>          ask a medical question
  /new                start a new chat (new session)
  /clear              clear this session's history
  /health             check the backend
  /docs               list ingested documents
  /search <query> [topic=..] [symptoms=a,b] [+causes] [+treatment] [+drugs]
                      structured search
  /sidebar            show or hide the session panel
  /help               show this help
  /quit               exit
";

/// Filters for `/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub query: String,
    pub topic: Option<String>,
    pub symptoms: Vec<String>,
    pub causes: bool,
    pub treatment: bool,
    pub drugs: bool,
}

impl SearchFilters {
    pub fn into_request(self, session_id: &str) -> SearchRequest {
        SearchRequest {
            query: self.query,
            topic: self.topic,
            symptoms: self.symptoms,
            causes: self.causes,
            treatment: self.treatment,
            drugs: self.drugs,
            session_id: session_id.to_string(),
        }
    }
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    NewChat,
    ClearHistory,
    Health,
    Documents,
    Search(SearchFilters),
    ToggleSidebar,
    Help,
    Quit,
    Empty,
    /// Unusable input, with the reason to show.
    Invalid(String),
}

impl Command {
    /// Parse one line of input.
    ///
    /// While `suggestions_visible`, a bare `1`-`3` picks the matching
    /// suggested question.
    pub fn parse(line: &str, suggestions_visible: bool) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        if suggestions_visible {
            if let Some(question) = trimmed
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| SUGGESTIONS.get(idx))
            {
                return Self::Ask((*question).to_string());
            }
        }

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Ask(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match name.to_ascii_lowercase().as_str() {
            "new" => Self::NewChat,
            "clear" => Self::ClearHistory,
            "health" => Self::Health,
            "docs" | "documents" => Self::Documents,
            "search" => parse_search(args),
            "sidebar" => Self::ToggleSidebar,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command `/{other}`; type /help")),
        }
    }
}

fn parse_search(args: &str) -> Command {
    let mut filters = SearchFilters::default();
    let mut words = Vec::new();

    for token in args.split_whitespace() {
        if let Some(topic) = token.strip_prefix("topic=") {
            filters.topic = Some(topic.to_string()).filter(|t| !t.is_empty());
        } else if let Some(list) = token.strip_prefix("symptoms=") {
            filters.symptoms = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        } else {
            match token {
                "+causes" => filters.causes = true,
                "+treatment" => filters.treatment = true,
                "+drugs" => filters.drugs = true,
                word => words.push(word),
            }
        }
    }

    if words.is_empty() {
        return Command::Invalid("usage: /search <query> [topic=..] [symptoms=a,b] [+causes] [+treatment] [+drugs]".to_string());
    }
    filters.query = words.join(" ");
    Command::Search(filters)
}
