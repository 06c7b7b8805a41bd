use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "mediquery.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the MediQuery backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// File holding the persisted session id
    #[arg(long, env = "MEDIQUERY_STATE_FILE")]
    pub state_file: Option<String>,

    /// Seconds to wait for an answer before giving up
    #[arg(long)]
    pub query_timeout: Option<u64>,

    /// Start with the sidebar panel hidden
    #[arg(long)]
    pub hide_sidebar: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub query_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub state_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub sidebar_open: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("backend.base_url", "http://localhost:8000")?
            .set_default("backend.query_timeout_secs", 30)?
            .set_default("backend.request_timeout_secs", 10)?
            .set_default("backend.health_timeout_secs", 5)?
            .set_default("storage.state_file", ".mediquery/state.json")?
            .set_default("ui.sidebar_open", true)?;

        // 2. Config file: explicit path must exist, the cwd fallback is optional
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }

        // 3. Environment variables, e.g. MEDIQUERY_BACKEND__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix("MEDIQUERY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and the env vars clap maps onto them) win
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(path) = cli.state_file {
            builder = builder.set_override("storage.state_file", path)?;
        }
        if let Some(secs) = cli.query_timeout {
            builder = builder.set_override("backend.query_timeout_secs", secs)?;
        }
        if cli.hide_sidebar {
            builder = builder.set_override("ui.sidebar_open", false)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
