//! Application configuration read from the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DB_PATH: &str = "translations.db";
const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_APP_TITLE: &str = "Translation App";
const DEFAULT_PAGE_SIZE: u64 = 50;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for the upstream chat-completion API
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Sent as `HTTP-Referer` when present
    pub referer: Option<String>,
    /// Sent as `X-Title` when present
    pub title: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            referer: None,
            title: Some(DEFAULT_APP_TITLE.to_string()),
        }
    }
}

/// Grid behaviour for web UI sessions
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub page_size: u64,
    pub filter_debounce: Duration,
    /// Sessions unused for this long are discarded
    pub session_idle: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub gateway: GatewayConfig,
    pub grid: GridConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            gateway: GatewayConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("TRANSLATIONS_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidValue {
                name: "BIND_ADDR",
                value: addr.clone(),
            })?;
        }

        config.gateway.api_key = get("OPENROUTER_API_KEY");
        if let Some(url) = get("OPENROUTER_BASE_URL") {
            config.gateway.base_url = url.trim_end_matches('/').to_string();
        }
        config.gateway.referer = get("APP_URL");
        if let Some(title) = get("APP_TITLE") {
            config.gateway.title = Some(title);
        }

        if let Some(size) = get("GRID_PAGE_SIZE") {
            config.grid.page_size = parse_positive("GRID_PAGE_SIZE", &size)?;
        }
        if let Some(ms) = get("FILTER_DEBOUNCE_MS") {
            let ms: u64 = ms.parse().map_err(|_| ConfigError::InvalidValue {
                name: "FILTER_DEBOUNCE_MS",
                value: ms.clone(),
            })?;
            config.grid.filter_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = get("GRID_SESSION_IDLE_SECS") {
            let secs = parse_positive("GRID_SESSION_IDLE_SECS", &secs)?;
            config.grid.session_idle = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("translations.db"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.gateway.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.gateway.title.as_deref(), Some("Translation App"));
        assert!(config.gateway.api_key.is_none());
        assert!(config.gateway.referer.is_none());
        assert_eq!(config.grid.page_size, 50);
        assert_eq!(config.grid.filter_debounce, Duration::from_millis(500));
        assert_eq!(config.grid.session_idle, Duration::from_secs(1800));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TRANSLATIONS_DB", "/data/hu.db"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://localhost:9000/v1/"),
            ("APP_URL", "https://translate.example.com"),
            ("GRID_PAGE_SIZE", "25"),
            ("FILTER_DEBOUNCE_MS", "0"),
            ("GRID_SESSION_IDLE_SECS", "90"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/hu.db"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.gateway.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.gateway.base_url, "http://localhost:9000/v1");
        assert_eq!(
            config.gateway.referer.as_deref(),
            Some("https://translate.example.com")
        );
        assert_eq!(config.grid.page_size, 25);
        assert_eq!(config.grid.filter_debounce, Duration::ZERO);
        assert_eq!(config.grid.session_idle, Duration::from_secs(90));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = AppConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")])).unwrap();
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[("GRID_PAGE_SIZE", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "GRID_PAGE_SIZE",
                value: "0".to_string()
            }
        );

        assert!(AppConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("FILTER_DEBOUNCE_MS", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("GRID_SESSION_IDLE_SECS", "0")])).is_err());
    }
}
