//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/cguide.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [store]
//! max_retries = 2
//! timeout_ms = 5000
//!
//! [data]
//! failure_mode = "degrade"   # or "strict"
//!
//! [model]
//! provider = "disabled"      # or "anthropic"
//!
//! [router]
//! tech_keywords = ["python", "rust"]
//! ```
//!
//! Only `[db]` and `[server]` are required; every other section has
//! defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use community_guide_core::{FailureMode, RouterVocabulary};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub router: RouterVocabulary,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Retry and timeout policy around every store call.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_retries")]
    pub max_retries: u32,
    #[serde(default = "default_store_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: default_store_retries(),
            backoff_ms: default_store_backoff_ms(),
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

fn default_store_retries() -> u32 {
    2
}
fn default_store_backoff_ms() -> u64 {
    100
}
fn default_store_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    #[serde(default)]
    pub failure_mode: FailureMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override for the messages endpoint; defaults to the public API.
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            api_url: None,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}

impl ModelConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.store.timeout_ms == 0 {
        anyhow::bail!("store.timeout_ms must be > 0");
    }

    if config.store.max_retries > 10 {
        anyhow::bail!("store.max_retries must be <= 10");
    }

    match config.model.provider.as_str() {
        "disabled" => {}
        "anthropic" => {
            if config.model.model.is_none() {
                anyhow::bail!("model.model must be specified when provider is 'anthropic'");
            }
            if config.model.max_tokens == 0 {
                anyhow::bail!("model.max_tokens must be > 0");
            }
        }
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be disabled or anthropic.",
            other
        ),
    }

    if config.router.tech_keywords.iter().any(|k| k.trim().is_empty())
        || config.router.venue_keywords.iter().any(|k| k.trim().is_empty())
    {
        anyhow::bail!("router keywords must not be empty strings");
    }

    Ok(())
}
