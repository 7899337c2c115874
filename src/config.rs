use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::Deserialize;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-002";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_QUERY_LIMIT: u32 = 5;
/// Sessions idle this long start over with a fresh quota
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 720;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub lang: Option<String>,
    pub bind: Option<String>,
    pub query_limit: Option<u32>,
    pub session_idle_minutes: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/ytscribe/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytscribe")
        .join("config.toml")
}

/// Read the API key once at startup. Absence is not an error here; the
/// summarizer reports it when a summary is requested.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}
