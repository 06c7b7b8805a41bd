//! Session panel: session id, backend status and controls.

use std::fmt::Write as _;

use crate::gateway::HealthStatus;
use crate::session::SessionId;

/// Backend liveness as last probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Online(HealthStatus),
    Offline(String),
}

/// Everything the panel shows.
#[derive(Debug, Clone)]
pub struct SidebarView<'a> {
    pub session_id: &'a SessionId,
    pub backend_url: &'a str,
    pub status: &'a BackendStatus,
    /// Messages as displayed; history entries count as question and answer.
    pub message_count: usize,
}

pub fn render_sidebar(view: &SidebarView<'_>) -> String {
    let mut out = String::from("---- MediQuery ----\n");
    let _ = writeln!(out, "Session: {}...", view.session_id.short());
    let _ = writeln!(out, "Backend: {}", view.backend_url);
    match view.status {
        BackendStatus::Online(health) if health.is_healthy() => {
            let _ = writeln!(out, "Status:  online ({})", health.service);
        }
        BackendStatus::Online(health) => {
            let _ = writeln!(out, "Status:  degraded ({})", health.status);
        }
        BackendStatus::Offline(reason) => {
            let _ = writeln!(out, "Status:  offline ({reason})");
        }
    }
    let _ = writeln!(out, "Messages: {}", view.message_count);
    out.push_str("/new  new chat   /clear  clear history   /sidebar  hide\n");
    out.push_str("Educational use only. Consult a qualified clinician for medical advice.\n");
    out.push_str("-------------------\n");
    out
}
