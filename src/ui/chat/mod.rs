//! Chat screen for the terminal front end.
//!
//! Rendering is plain text so the same functions serve the interactive
//! shell and tests.

mod header;
mod input_area;
mod message_list;
mod shell;

pub use header::{SUGGESTIONS, render_header, render_welcome};
pub use input_area::{Command, HELP_TEXT, SearchFilters};
pub use message_list::{
    render_documents, render_message, render_messages, render_search_result, render_sources,
};
pub use shell::{ChatShell, Flow};
