use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use dialer_core::DEFAULT_DISPATCH_URL;

/// Dialer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Dispatch server endpoint the trigger posts to
    pub dispatch_url: String,
    /// LiveKit server URL pre-filled into a session
    pub server_url: Option<String>,
    /// Dispatch server bind address
    pub bind_address: String,
    /// Dispatch server port
    pub port: u16,
    /// Per-dispatch timeout in seconds; 0 waits forever
    pub timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_url: DEFAULT_DISPATCH_URL.to_string(),
            server_url: None,
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            timeout_secs: 30,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            dispatch_url: lookup("DIALER_DISPATCH_URL").unwrap_or(defaults.dispatch_url),
            server_url: lookup("LIVEKIT_URL").filter(|url| !url.trim().is_empty()),
            bind_address: lookup("DIALER_BIND").unwrap_or(defaults.bind_address),
            port: lookup("DIALER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            timeout_secs: lookup("DIALER_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: lookup("DIALER_LOG_DIR").map(PathBuf::from),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Base URL of the dispatch server, i.e. the dispatch endpoint minus its path.
    pub fn server_base(&self) -> String {
        let trimmed = self.dispatch_url.trim_end_matches('/');
        trimmed
            .strip_suffix("/dispatch")
            .unwrap_or(trimmed)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.dispatch_url, "http://localhost:8000/dispatch");
        assert_eq!(config.port, 8000);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DIALER_DISPATCH_URL", "http://agents.internal:9000/dispatch"),
            ("LIVEKIT_URL", "wss://example.com"),
            ("DIALER_PORT", "9000"),
            ("DIALER_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.server_url.as_deref(), Some("wss://example.com"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.server_base(), "http://agents.internal:9000");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("DIALER_PORT", "eighty"),
            ("DIALER_TIMEOUT_SECS", "-1"),
        ]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.timeout_secs, 30);
    }
}
