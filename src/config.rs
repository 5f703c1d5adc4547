// Bot connection configuration
// Persistent JSON settings plus environment overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bot::BotError;

/// Environment variable overriding `url`
pub const ENV_URL: &str = "MUSICBOT_URL";
/// Environment variable overriding `token`
pub const ENV_TOKEN: &str = "MUSICBOT_TOKEN";

/// Connection settings for one bot instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Web interface URL (e.g., http://127.0.0.1:8087)
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Bot id for login; looked up via `/botId` when unset
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Bearer token from a previous login
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on 429/5xx
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8087".to_string(),
            username: None,
            password: None,
            bot_id: None,
            token: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl BotConfig {
    /// Apply `MUSICBOT_URL` / `MUSICBOT_TOKEN` when set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var(ENV_URL).ok().filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(token) = std::env::var(ENV_TOKEN).ok().filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        self
    }
}

/// Default location: `<config_dir>/musicbot-files/config.json`
pub fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
    config_dir.join("musicbot-files").join("config.json")
}

/// Load the config from `path`, falling back to defaults when the file is
/// missing or unreadable
pub fn load_bot_config_from(path: &Path) -> BotConfig {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse bot config {:?}: {}", path, e),
            },
            Err(e) => tracing::warn!("Failed to read bot config {:?}: {}", path, e),
        }
    }

    BotConfig::default()
}

/// Load the config from the default location
pub fn load_bot_config() -> BotConfig {
    load_bot_config_from(&config_path())
}

/// Write the config to `path` as pretty JSON
pub fn save_bot_config_to(config: &BotConfig, path: &Path) -> Result<(), BotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;

    tracing::info!("Bot config saved to {:?}", path);
    Ok(())
}

/// Write the config to the default location
pub fn save_bot_config(config: &BotConfig) -> Result<(), BotError> {
    save_bot_config_to(config, &config_path())
}

/// Check that the config can be used to reach a bot
pub fn validate_config(config: &BotConfig) -> Result<(), BotError> {
    let url = config.url.trim();
    if url.is_empty() {
        return Err(BotError::InvalidConfig("Bot URL is empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(BotError::InvalidConfig(format!(
            "Bot URL must start with http:// or https://: {}",
            url
        )));
    }

    let has_token = config.token.as_deref().is_some_and(|t| !t.is_empty());
    let has_user = config.username.as_deref().is_some_and(|u| !u.is_empty());
    if !has_token && !has_user {
        return Err(BotError::InvalidConfig(
            "Either a token or a username is required".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(BotError::InvalidConfig("timeout_secs must be positive".to_string()));
    }

    Ok(())
}
