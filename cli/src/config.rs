//! Operator configuration with TOML file support.

use accrue_types::{LedgerParams, Rate};
use accrue_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the `accrue` operator binary.
///
/// Loaded from a TOML file via [`LedgerConfig::from_toml_file`]; every field
/// may be omitted and command-line flags take precedence over file values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Global rate a fresh ledger starts with, raw per-second fixed point.
    #[serde(default = "default_initial_rate")]
    pub initial_rate: Rate,

    /// JSON snapshot file holding the ledger between invocations.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_initial_rate() -> Rate {
    LedgerParams::DEFAULT_INITIAL_RATE
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./accrue_state.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn params(&self) -> LedgerParams {
        LedgerParams::with_initial_rate(self.initial_rate)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_rate: default_initial_rate(),
            state_file: default_state_file(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = LedgerConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = LedgerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = LedgerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.initial_rate, LedgerParams::DEFAULT_INITIAL_RATE);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            initial_rate = 40000000000
            log_format = "json"
        "#;
        let config = LedgerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.initial_rate, Rate::new(40_000_000_000));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.state_file, PathBuf::from("./accrue_state.json")); // default
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = LedgerConfig::from_toml_str(r#"log_format = "xml""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "state_file = \"/var/lib/accrue/state.json\"").unwrap();

        let config = LedgerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.state_file, PathBuf::from("/var/lib/accrue/state.json"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = LedgerConfig::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
