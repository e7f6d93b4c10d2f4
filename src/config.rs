//! Service configuration.
//!
//! Layered model: compiled-in defaults, then an optional TOML file, then
//! environment variables. Environment variables always win so container
//! deployments can run without a config file at all.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load the file at `path` if given, otherwise start from defaults, then
    /// apply process environment overrides and validate.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => {
                debug!("no config file given, using compiled-in defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    ///
    /// Empty values are ignored. Values that fail to parse are logged and the
    /// previous setting is kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        parse_into(&get, "SERVER_PORT", &mut self.server.port);
        if let Some(v) = get("ENVIRONMENT") {
            self.server.environment = v;
        }
        parse_into(&get, "READ_TIMEOUT", &mut self.server.read_timeout_sec);
        parse_into(&get, "WRITE_TIMEOUT", &mut self.server.write_timeout_sec);

        if let Some(v) = get("BING_API_KEY") {
            self.search.api_key = Some(v);
        }
        if let Some(v) = get("BING_ENDPOINT") {
            self.search.endpoint = v;
        }

        if let Some(v) = get("MANUS_NODE_URL") {
            self.ledger.node_url = v;
        }
        if let Some(v) = get("MANUS_NETWORK_ID") {
            self.ledger.network_id = v;
        }
        parse_into(&get, "MANUS_ENABLE_PLANETARY", &mut self.ledger.enable_planetary);

        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
        match get("LOG_FORMAT").as_deref() {
            Some("json") => self.logging.format = LogFormat::Json,
            Some("text") => self.logging.format = LogFormat::Text,
            Some(other) => warn!(value = other, "ignoring unknown LOG_FORMAT"),
            None => {}
        }
    }

    /// Reject settings that cannot work in the configured environment.
    pub fn validate(&self) -> Result<()> {
        let has_key = self
            .search
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty());
        if self.server.is_production() && !has_key {
            bail!("BING_API_KEY is required in production environment");
        }
        Ok(())
    }
}

fn parse_into<T, G>(get: &G, key: &str, slot: &mut T)
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        match raw.trim().parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!(key, value = %raw, "ignoring unparseable environment value"),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment name (`development`, `staging`, `production`).
    pub environment: String,
    pub read_timeout_sec: u64,
    /// Upper bound on handling a single request, in seconds.
    pub write_timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            read_timeout_sec: 15,
            write_timeout_sec: 15,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_sec.max(self.read_timeout_sec))
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Bing subscription key. Without one, static results are served.
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.bing.microsoft.com/v7.0/search".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub node_url: String,
    pub network_id: String,
    /// Report Moon and Mars nodes alongside Earth.
    pub enable_planetary: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: "http://localhost:9545".to_string(),
            network_id: "1".to_string(),
            enable_planetary: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Logging settings usable before the full configuration is resolved.
    ///
    /// Reads only `LOG_LEVEL` and `LOG_FORMAT`, silently falling back to the
    /// defaults, so warnings raised while loading the rest of the config have
    /// somewhere to go.
    pub fn bootstrap<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut logging = Self::default();
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            logging.level = level;
        }
        if lookup("LOG_FORMAT").as_deref() == Some("json") {
            logging.format = LogFormat::Json;
        }
        logging
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(cfg.server.environment, "development");
        assert_eq!(cfg.server.read_timeout_sec, 15);
        assert_eq!(cfg.server.write_timeout_sec, 15);
        assert!(cfg.search.api_key.is_none());
        assert_eq!(cfg.search.endpoint, "https://api.bing.microsoft.com/v7.0/search");
        assert_eq!(cfg.ledger.node_url, "http://localhost:9545");
        assert_eq!(cfg.ledger.network_id, "1");
        assert!(!cfg.ledger.enable_planetary);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[server]
port = 9090

[ledger]
enable_planetary = true

[logging]
format = "json"
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.ledger.enable_planetary);
        assert_eq!(cfg.ledger.network_id, "1");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "127.0.0.1"),
            ("ENVIRONMENT", "staging"),
            ("WRITE_TIMEOUT", "30"),
            ("BING_API_KEY", "k"),
            ("MANUS_NETWORK_ID", "7"),
            ("MANUS_ENABLE_PLANETARY", "true"),
            ("LOG_FORMAT", "json"),
        ]));

        assert_eq!(cfg.server.bind_address(), "127.0.0.1:3000");
        assert_eq!(cfg.server.environment, "staging");
        assert_eq!(cfg.server.write_timeout_sec, 30);
        assert_eq!(cfg.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.search.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.ledger.network_id, "7");
        assert!(cfg.ledger.enable_planetary);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_values_keep_previous() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("SERVER_PORT", "eighty"),
            ("MANUS_ENABLE_PLANETARY", "maybe"),
            ("SERVER_HOST", ""),
            ("LOG_FORMAT", "xml"),
        ]));
        assert_eq!(cfg.server.port, 8080);
        assert!(!cfg.ledger.enable_planetary);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_bootstrap_logging_reads_only_log_vars() {
        let logging = LoggingConfig::bootstrap(env(&[
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);

        let logging = LoggingConfig::bootstrap(env(&[("LOG_LEVEL", " "), ("LOG_FORMAT", "xml")]));
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Text);
    }

    #[test]
    fn test_production_requires_api_key() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("ENVIRONMENT", "production")]));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("BING_API_KEY"));

        cfg.apply_env(env(&[("BING_API_KEY", "secret")]));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mission-control.toml");
        std::fs::write(
            &path,
            r#"
[search]
endpoint = "http://127.0.0.1:9999/search"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.search.endpoint, "http://127.0.0.1:9999/search");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = AppConfig::load(Path::new("/nonexistent/path/mission-control.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let roundtripped: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(cfg.server.port, roundtripped.server.port);
        assert_eq!(cfg.ledger.node_url, roundtripped.ledger.node_url);
        assert_eq!(cfg.logging.format, roundtripped.logging.format);
    }
}
