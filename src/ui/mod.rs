//! Terminal user interface.
//!
//! # Structure
//!
//! - [`chat`]: message rendering, input parsing and the interactive loop
//! - [`sidebar`]: session and backend status panel

pub mod chat;
pub mod sidebar;
