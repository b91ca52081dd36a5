use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend, without a trailing slash.
    pub api_base: String,
    /// Key under which the bearer token is persisted.
    pub token_key: String,
    pub app_data_dir: PathBuf,
    pub http_proxy: String,
    pub https_proxy: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_min_interval_ms: u64,
}

const CONFIG_FILE_PATH: &str = "config.toml";

pub const DEFAULT_API_BASE: &str = "http://localhost:3001";
pub const DEFAULT_TOKEN_KEY: &str = "token";

fn default_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("auth-session")
}

fn parse_env_number<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {name}={value:?}: not a valid number");
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            app_data_dir: default_app_data_dir(),
            http_proxy: String::new(),
            https_proxy: String::new(),
            timeout_secs: 30,
            max_retries: 3,
            retry_min_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Defaults, then `config.toml` from the working directory, then environment overrides.
    pub fn new() -> Self {
        let mut config = Self::load_file(Path::new(CONFIG_FILE_PATH)).unwrap_or_default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Read a TOML config file. Missing or unparseable files yield `None`.
    pub fn load_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Config>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Failed to parse {}: {e}", path.display());
                None
            }
        }
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("AUTH_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(token_key) = lookup("AUTH_TOKEN_KEY") {
            self.token_key = token_key;
        }
        if let Some(dir) = lookup("AUTH_DATA_DIR") {
            self.app_data_dir = PathBuf::from(dir);
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(value) = lookup("AUTH_TIMEOUT_SECS") {
            if let Some(timeout) = parse_env_number("AUTH_TIMEOUT_SECS", &value) {
                self.timeout_secs = timeout;
            }
        }
        if let Some(value) = lookup("AUTH_MAX_RETRIES") {
            if let Some(retries) = parse_env_number("AUTH_MAX_RETRIES", &value) {
                self.max_retries = retries;
            }
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_app_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.app_data_dir = dir.into();
        self
    }

    /// Path of the file backing the persistent token store.
    pub fn session_file(&self) -> PathBuf {
        self.app_data_dir.join("session.json")
    }
}
