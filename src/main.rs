//! MediQuery terminal chat
//!
//! Entry point for the interactive client.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mediquery_chat::config::AppConfig;
use mediquery_chat::gateway::GatewayClient;
use mediquery_chat::session::ConversationStore;
use mediquery_chat::storage::FileStore;
use mediquery_chat::ui::chat::ChatShell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stderr keeps the chat on stdout clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = AppConfig::load().context("configuration error")?;

    info!(
        name: "config.loaded",
        base_url = %config.backend.base_url,
        query_timeout_secs = config.backend.query_timeout_secs,
        state_file = %config.storage.state_file,
        "Configuration loaded"
    );

    let gateway = Arc::new(
        GatewayClient::from_config(&config.backend).context("failed to create backend client")?,
    );
    let storage = Arc::new(
        FileStore::open(&config.storage.state_file).context("failed to open session storage")?,
    );
    let store = ConversationStore::new(gateway, storage).with_sidebar_open(config.ui.sidebar_open);

    let mut shell = ChatShell::start(store, config.backend.base_url.clone(), std::io::stdout()).await?;
    shell
        .run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await?;

    info!(name: "shell.exited", "Chat session ended");
    Ok(())
}
