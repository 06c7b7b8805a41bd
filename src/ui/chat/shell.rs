//! Interactive chat loop.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::gateway::HealthStatus;
use crate::session::{ConversationStore, SendOutcome, SessionContext};
use crate::ui::sidebar::{BackendStatus, SidebarView, render_sidebar};

use super::header::{render_header, render_welcome};
use super::input_area::{Command, HELP_TEXT};
use super::message_list::{render_documents, render_message, render_messages, render_search_result};

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal chat front end over a [`ConversationStore`].
///
/// Input is handled one line at a time and each question is awaited before
/// the next line is read, so at most one send is in flight.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use mediquery_chat::gateway::GatewayClient;
/// use mediquery_chat::session::ConversationStore;
/// use mediquery_chat::storage::MemoryStore;
/// use mediquery_chat::ui::chat::ChatShell;
///
/// # async fn example() -> anyhow::Result<()> {
/// let gateway = Arc::new(GatewayClient::new("http://localhost:8000")?);
/// let store = ConversationStore::new(gateway, Arc::new(MemoryStore::new()));
/// let mut shell = ChatShell::start(store, "http://localhost:8000", std::io::stdout()).await?;
/// shell.run(tokio::io::BufReader::new(tokio::io::stdin())).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChatShell<W: Write> {
    store: ConversationStore,
    ctx: SessionContext,
    backend_url: String,
    out: W,
}

impl<W: Write> ChatShell<W> {
    /// Restore the session, replay its history and draw the first screen.
    pub async fn start(
        store: ConversationStore,
        backend_url: impl Into<String>,
        out: W,
    ) -> Result<Self> {
        let ctx = store
            .initialize_session()
            .context("failed to initialize session")?;
        store.load_history(&ctx).await;

        let mut shell = Self {
            store,
            ctx,
            backend_url: backend_url.into(),
            out,
        };
        shell.write(&render_header())?;
        if shell.store.sidebar_open() {
            shell.show_sidebar().await?;
        }
        shell.show_conversation()?;
        Ok(shell)
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Hand back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Read lines until end of input or `/quit`.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        loop {
            self.write("> ")?;
            let Some(line) = lines.next_line().await.context("failed to read input")? else {
                break;
            };
            if self.handle(&line).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle one input line.
    pub async fn handle(&mut self, line: &str) -> Result<Flow> {
        let suggestions_visible = self.store.message_count() == 0;
        match Command::parse(line, suggestions_visible) {
            Command::Ask(question) => self.ask(&question).await?,
            Command::NewChat => {
                self.ctx = self
                    .store
                    .start_new_session()
                    .context("failed to start a new session")?;
                self.write(&format!("Started a new chat ({}...).\n", self.ctx.id().short()))?;
                self.show_conversation()?;
            }
            Command::ClearHistory => {
                // Failures are logged by the store and not shown in the chat.
                if let Ok(ack) = self.store.clear_history(&self.ctx).await {
                    self.write(&format!("{}\n", ack.message))?;
                }
            }
            Command::Health => {
                let line = match self.probe().await {
                    BackendStatus::Online(health) => describe_health(&health),
                    BackendStatus::Offline(reason) => format!("Backend offline: {reason}\n"),
                };
                self.write(&line)?;
            }
            Command::Documents => {
                let text = match self.store.gateway().list_documents().await {
                    Ok(docs) => render_documents(&docs),
                    Err(e) => format!("[error] {e}\n"),
                };
                self.write(&text)?;
            }
            Command::Search(filters) => {
                self.write("Searching medical database...\n")?;
                let request = filters.into_request(self.ctx.id().as_str());
                let text = match self.store.gateway().advanced_search(&request).await {
                    Ok(result) => render_search_result(&result),
                    Err(e) => format!("[error] {e}\n"),
                };
                self.write(&text)?;
            }
            Command::ToggleSidebar => {
                if self.store.toggle_sidebar() {
                    self.show_sidebar().await?;
                } else {
                    self.write("Sidebar hidden.\n")?;
                }
            }
            Command::Help => self.write(HELP_TEXT)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Empty => {}
            Command::Invalid(reason) => self.write(&format!("{reason}\n"))?,
        }
        Ok(Flow::Continue)
    }

    async fn ask(&mut self, question: &str) -> Result<()> {
        self.write("Searching medical database...\n")?;
        match self.store.send_and_resolve(&self.ctx, question).await {
            SendOutcome::Resolved(reply) | SendOutcome::Failed(reply) => {
                self.write(&render_message(&reply))?;
            }
            SendOutcome::Stale => self.write("(reply discarded: the session changed)\n")?,
            SendOutcome::Blank => {}
        }
        Ok(())
    }

    async fn probe(&self) -> BackendStatus {
        match self.store.gateway().health_check().await {
            Ok(health) => BackendStatus::Online(health),
            Err(e) => BackendStatus::Offline(e.to_string()),
        }
    }

    async fn show_sidebar(&mut self) -> Result<()> {
        let status = self.probe().await;
        let panel = render_sidebar(&SidebarView {
            session_id: self.ctx.id(),
            backend_url: &self.backend_url,
            status: &status,
            message_count: self.store.message_count(),
        });
        self.write(&panel)
    }

    fn show_conversation(&mut self) -> Result<()> {
        let messages = self.store.messages();
        if messages.is_empty() {
            self.write(&render_welcome())
        } else {
            self.write(&render_messages(&messages))
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to write output")
    }
}

fn describe_health(health: &HealthStatus) -> String {
    if health.is_healthy() {
        format!("Backend online: {} ({})\n", health.service, health.status)
    } else {
        format!("Backend reachable but reports `{}`\n", health.status)
    }
}
