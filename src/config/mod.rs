//! Configuration module for the translation graph service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default CAS retry budget for translation graph writes.
pub const DEFAULT_MAX_WRITE_RETRIES: u32 = 8;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// How many times a conflicting graph write is re-read and retried
    pub max_write_retries: u32,
    /// Reject links that would mix content types inside one translation group
    pub strict_content_types: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("TGRAPH_API_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("TGRAPH_DB_PATH")
            .unwrap_or_else(|_| "./data/translation-graph.sqlite".to_string())
            .into();

        let bind_addr = env::var("TGRAPH_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid TGRAPH_BIND_ADDR format: {}", e))?;

        let log_level = env::var("TGRAPH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_write_retries = match env::var("TGRAPH_MAX_WRITE_RETRIES") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("Invalid TGRAPH_MAX_WRITE_RETRIES: {}", e))?,
            Err(_) => DEFAULT_MAX_WRITE_RETRIES,
        };

        let strict_content_types = env::var("TGRAPH_STRICT_CONTENT_TYPES")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            max_write_retries,
            strict_content_types,
        })
    }

    /// The subset of settings the translation group store needs.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            max_write_retries: self.max_write_retries,
            strict_content_types: self.strict_content_types,
        }
    }
}

/// Settings passed explicitly into the translation group store.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub max_write_retries: u32,
    pub strict_content_types: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_write_retries: DEFAULT_MAX_WRITE_RETRIES,
            strict_content_types: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("TGRAPH_API_PSK");
        env::remove_var("TGRAPH_DB_PATH");
        env::remove_var("TGRAPH_BIND_ADDR");
        env::remove_var("TGRAPH_LOG_LEVEL");
        env::remove_var("TGRAPH_MAX_WRITE_RETRIES");
        env::remove_var("TGRAPH_STRICT_CONTENT_TYPES");

        let config = Config::from_env().unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(
            config.db_path,
            PathBuf::from("./data/translation-graph.sqlite")
        );
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_write_retries, DEFAULT_MAX_WRITE_RETRIES);
        assert!(config.strict_content_types);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }
}
