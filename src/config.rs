//! Configuration System
//!
//! Settings come from a TOML file (platform config dir, then
//! `./crmdash.toml`) with `CRMDASH_*` environment variables layered on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::export::ExportFormat;

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub mock: MockConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote CRM backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Origin every resource path is appended to
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Unset means the HTTP client's own default applies
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_backend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_secs: None,
            default_page_size: default_page_size(),
        }
    }
}

/// Token persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolved location of the token store file
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(default_storage_path)
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("crmdash").join("storage.json"))
        .unwrap_or_else(|| PathBuf::from("./crmdash_storage.json"))
}

/// Bulk export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: ExportFormat,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
        }
    }
}

/// Mock backend server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_mock_host")]
    pub host: String,

    #[serde(default = "default_mock_port")]
    pub port: u16,
}

fn default_mock_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mock_port() -> u16 {
    3000
}

impl MockConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            host: default_mock_host(),
            port: default_mock_port(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First readable default location, else defaults plus environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("crmdash").join("config.toml")),
            Some(PathBuf::from("./crmdash.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend overrides
        if let Some(url) = var("CRMDASH_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(secs) = var("CRMDASH_REQUEST_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.backend.request_timeout_secs = Some(s);
            }
        }

        // Session overrides
        if let Some(path) = var("CRMDASH_STORAGE_PATH") {
            self.session.storage_path = Some(PathBuf::from(path));
        }

        // Mock server overrides
        if let Some(host) = var("CRMDASH_MOCK_HOST") {
            self.mock.host = host;
        }
        if let Some(port) = var("CRMDASH_MOCK_PORT") {
            if let Ok(p) = port.parse() {
                self.mock.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("CRMDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CRMDASH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Commented default config file
pub fn generate_default_config() -> String {
    r#"# crmdash Configuration
#
# Environment variables override these settings:
# - CRMDASH_BACKEND_URL
# - CRMDASH_REQUEST_TIMEOUT_SECS
# - CRMDASH_STORAGE_PATH
# - CRMDASH_MOCK_HOST
# - CRMDASH_MOCK_PORT
# - CRMDASH_LOG_LEVEL
# - CRMDASH_LOG_FORMAT

[backend]
# Origin of the CRM backend; resource paths such as /contacts are appended
url = "http://localhost:3000"

# Request timeout in seconds (leave unset for no timeout)
# request_timeout_secs = 30

# Page size used when listing records
default_page_size = 10

[session]
# Where the session token is persisted
# storage_path = "~/.local/share/crmdash/storage.json"

[export]
# Directory export files are written to
output_dir = "."

# Export format: csv, json or ndjson
format = "csv"

[mock]
# Bind address of the crmdash-mock development backend
host = "127.0.0.1"
port = 3000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/crmdash/crmdash.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:3000");
        assert_eq!(config.backend.default_page_size, 10);
        assert!(config.backend.request_timeout().is_none());
        assert_eq!(config.export.format, ExportFormat::Csv);
        assert_eq!(config.mock.addr(), "127.0.0.1:3000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.backend.url, "http://localhost:3000");
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse(
            r#"
[backend]
url = "https://crm.example.com/api"
request_timeout_secs = 15

[export]
format = "ndjson"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://crm.example.com/api");
        assert_eq!(config.backend.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.backend.default_page_size, 10);
        assert_eq!(config.export.format, ExportFormat::Ndjson);
        assert_eq!(config.mock.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CRMDASH_BACKEND_URL", "http://10.0.0.5:4000"),
            ("CRMDASH_REQUEST_TIMEOUT_SECS", "5"),
            ("CRMDASH_STORAGE_PATH", "/tmp/crm/storage.json"),
            ("CRMDASH_MOCK_PORT", "not-a-port"),
            ("CRMDASH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "http://10.0.0.5:4000");
        assert_eq!(config.backend.request_timeout_secs, Some(5));
        assert_eq!(
            config.session.storage_path(),
            PathBuf::from("/tmp/crm/storage.json")
        );
        // Unparseable values leave the default in place
        assert_eq!(config.mock.port, 3000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/crmdash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nurl = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
