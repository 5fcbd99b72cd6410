use crate::constants::{APP_DIR_NAME, DEFAULT_ENDPOINT, DEFAULT_SERVER_URL, SERVER_URL_ENV};
use crate::errors::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub endpoint: String,
    pub log_level: String,
    pub start_open: bool,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            start_open: true,
            tick_rate_ms: 250,
        }
    }
}

/// Command-line values that win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub endpoint: Option<String>,
    pub closed: bool,
}

impl Config {
    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        self.url_for(&self.endpoint)
    }

    /// Full URL of any path on the insights server.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.server_url {
            self.server_url = url;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if overrides.closed {
            self.start_open = false;
        }
    }
}

/// Loads the config file (creating it with defaults when missing) and applies the
/// environment override. Validation is left to the caller, once every override
/// has been applied.
pub fn load_config(path: Option<&Path>) -> ChatResult<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    let mut config = load_or_create(&config_path)?;
    if let Ok(url) = env::var(SERVER_URL_ENV) {
        config.server_url = url;
    }
    Ok(config)
}

pub fn load_or_create(config_path: &Path) -> ChatResult<Config> {
    if config_path.exists() {
        let config_str = fs::read_to_string(config_path).map_err(|e| {
            ChatError::config_error(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&config_str)
            .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)))
    } else {
        let config = Config::default();
        save_config(config_path, &config)?;
        Ok(config)
    }
}

pub fn save_config(config_path: &Path, config: &Config) -> ChatResult<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)
        .map_err(|e| ChatError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(config_path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))
}

pub fn app_dir() -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join(APP_DIR_NAME))
}

fn get_config_path() -> ChatResult<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    let url = config.server_url.trim();
    if url.is_empty() {
        return Err(ChatError::config_error("server_url is required"));
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ChatError::config_error(
            "server_url must start with http:// or https://",
        ));
    }

    if !config.endpoint.starts_with('/') {
        return Err(ChatError::config_error("endpoint must start with '/'"));
    }

    if config.tick_rate_ms == 0 {
        return Err(ChatError::config_error("tick_rate_ms must be greater than 0"));
    }

    Ok(())
}
