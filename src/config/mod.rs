//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::source::DEFAULT_FETCH_LIMIT;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS (the local dev-server ports by default).
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Row-source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Backend type: "jsonl" or "supabase"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Path to the JSONL pace table (jsonl backend)
    #[serde(default = "default_table_path")]
    pub path: PathBuf,

    /// Supabase project URL (supabase backend)
    #[serde(default)]
    pub url: String,

    /// Table name (supabase backend)
    #[serde(default = "default_table_name")]
    pub table: String,

    /// Max rows fetched per lookup
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

fn default_backend() -> String {
    "jsonl".to_string()
}

fn default_table_path() -> PathBuf {
    PathBuf::from("./data/vdot.jsonl")
}

fn default_table_name() -> String {
    "vdot_data".to_string()
}

fn default_fetch_limit() -> usize {
    DEFAULT_FETCH_LIMIT
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_table_path(),
            url: String::new(),
            table: default_table_name(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

/// Lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Column holding the reference 5k race time
    #[serde(default = "default_match_field")]
    pub match_field: String,
}

fn default_match_field() -> String {
    "race_5km".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            match_field: default_match_field(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub lookup: LookupConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.source.fetch_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch limit must be greater than 0".to_string(),
            ));
        }

        match self.source.backend.as_str() {
            "jsonl" => {}
            "supabase" => {
                if self.source.url.is_empty() {
                    return Err(ConfigError::ValidationError(
                        "Supabase backend requires a source URL".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown source backend: {}",
                    other
                )));
            }
        }

        if self.lookup.match_field.is_empty() {
            return Err(ConfigError::ValidationError(
                "Match field must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.source.backend, "jsonl");
        assert_eq!(config.source.table, "vdot_data");
        assert_eq!(config.source.fetch_limit, 1000);
        assert_eq!(config.lookup.match_field, "race_5km");
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_fetch_limit() {
        let mut config = AppConfig::default();
        config.source.fetch_limit = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_backend() {
        let mut config = AppConfig::default();
        config.source.backend = "redis".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_supabase_needs_url() {
        let mut config = AppConfig::default();
        config.source.backend = "supabase".to_string();
        assert!(config.validate().is_err());

        config.source.url = "https://example.supabase.co".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [server]
            port = 9000

            [source]
            backend = "supabase"
            url = "https://example.supabase.co"
            fetch_limit = 250

            [lookup]
            match_field = "race_10km"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.source.fetch_limit, 250);
        assert_eq!(config.lookup.match_field, "race_10km");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.source.path, parsed.source.path);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }
}
