//! Chat header and welcome screen.

/// Questions offered on the welcome screen, selectable by number.
pub const SUGGESTIONS: [&str; 3] = [
    "What are the symptoms of hypertension?",
    "What is the pathophysiology of diabetes?",
    "How is pneumonia treated?",
];

pub fn render_header() -> String {
    "MediQuery Assistant\nMedical knowledge base powered by RAG\n".to_string()
}

/// Shown while the conversation is empty.
pub fn render_welcome() -> String {
    let mut out = String::from(
        "Welcome to MediQuery AI\n\
         Ask any medical question and get answers backed by medical literature.\n\
         Try one of these (type its number):\n",
    );
    for (idx, question) in SUGGESTIONS.iter().enumerate() {
        out.push_str(&format!("  {}. {question}\n", idx + 1));
    }
    out.push_str("Type /help for commands.\n");
    out
}
