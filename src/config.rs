use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::trello::DEFAULT_BASE_URL;

/// Values shipped in old deployment templates; treated as "not configured".
const PLACEHOLDER_API_KEY: &str = "your_api_key_here";
const PLACEHOLDER_TOKEN: &str = "your_token_here";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub trello: TrelloConfig,
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrelloConfig {
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloCredentials {
    pub api_key: String,
    pub token: String,
}

impl TrelloConfig {
    /// Both secrets, if each is set to something other than blank or a placeholder.
    pub fn credentials(&self) -> Option<TrelloCredentials> {
        let api_key = usable_secret(self.api_key.as_deref(), PLACEHOLDER_API_KEY)?;
        let token = usable_secret(self.token.as_deref(), PLACEHOLDER_TOKEN)?;
        Some(TrelloCredentials { api_key, token })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn usable_secret(value: Option<&str>, placeholder: &str) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value == placeholder {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct SyncConfig {
    /// Emit one record with empty step fields for cards that have no checklist items.
    /// Off by default: such cards produce no records.
    pub emit_cards_without_checklists: bool,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trello-sync")
        .join("config.toml")
}

/// Load `~/.trello-sync/config.toml` (if present), then apply environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let mut config = load_config_file(&config_path())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

impl AppConfig {
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var("TRELLO_API_KEY") {
            self.trello.api_key = Some(key);
        }
        if let Some(token) = var("TRELLO_TOKEN") {
            self.trello.token = Some(token);
        }
        if let Some(url) = var("TRELLO_BASE_URL") {
            self.trello.base_url = url;
        }
        if let Some(secs) = var("TRELLO_REQUEST_TIMEOUT_SECS") {
            self.trello.request_timeout_secs = Some(
                secs.parse()
                    .with_context(|| format!("Invalid TRELLO_REQUEST_TIMEOUT_SECS: {secs}"))?,
            );
        }
        if let Some(addr) = var("BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT: {port}"))?;
        }
        if let Some(flag) = var("TRELLO_SYNC_EMIT_BARE_CARDS") {
            self.sync.emit_cards_without_checklists = parse_flag(&flag)
                .with_context(|| format!("Invalid TRELLO_SYNC_EMIT_BARE_CARDS: {flag}"))?;
        }
        if let Some(level) = var("TRELLO_SYNC_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
