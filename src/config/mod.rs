//! Configuration module for the PinShot backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for editor API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Root directory for uploaded image files
    pub storage_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Public origin used to compose share and file URLs
    pub public_origin: String,
    /// Upper bound on request handling time
    pub request_timeout: Duration,
    /// Serve legacy self-contained share links (off by default)
    pub enable_legacy_links: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("PINSHOT_API_PSK").ok();

        let db_path = env::var("PINSHOT_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let storage_path = env::var("PINSHOT_STORAGE_PATH")
            .unwrap_or_else(|_| "./data/uploads".to_string())
            .into();

        let bind_addr = env::var("PINSHOT_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PINSHOT_BIND_ADDR format");

        let public_origin = env::var("PINSHOT_PUBLIC_ORIGIN")
            .unwrap_or_else(|_| format!("http://{}", bind_addr));

        let request_timeout = env::var("PINSHOT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let enable_legacy_links = env::var("PINSHOT_ENABLE_LEGACY_LINKS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let log_level = env::var("PINSHOT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_psk,
            db_path,
            storage_path,
            bind_addr,
            public_origin,
            request_timeout,
            enable_legacy_links,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PINSHOT_API_PSK");
        env::remove_var("PINSHOT_DB_PATH");
        env::remove_var("PINSHOT_STORAGE_PATH");
        env::remove_var("PINSHOT_BIND_ADDR");
        env::remove_var("PINSHOT_PUBLIC_ORIGIN");
        env::remove_var("PINSHOT_REQUEST_TIMEOUT_SECS");
        env::remove_var("PINSHOT_ENABLE_LEGACY_LINKS");
        env::remove_var("PINSHOT_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.storage_path, PathBuf::from("./data/uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.public_origin, "http://127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.enable_legacy_links);
        assert_eq!(config.log_level, "info");
    }
}
