//! Configuration loading and management.
//!
//! Every field has a default, so `EngineConfig::default()` is a working
//! configuration and a TOML file only needs the values it changes.

use serde::Deserialize;
use slirc_wire::CaseMapping;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown casemapping: {0}")]
    UnknownCaseMapping(String),
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Who we register as.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Processing behavior.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Log filter for binaries.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Registration identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_realname")]
    pub realname: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            username: default_username(),
            realname: default_realname(),
        }
    }
}

/// Processing switches.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Answer `PING` with `PONG` automatically.
    #[serde(default = "default_true")]
    pub auto_pong: bool,
    /// Casemapping to assume until the server's `005` says otherwise
    /// (`ascii`, `rfc1459` or `strict-rfc1459`).
    #[serde(default)]
    pub casemapping: Option<String>,
    /// Emit `RawLineIn`/`RawLineOut` events for every line.
    #[serde(default)]
    pub emit_raw_lines: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            auto_pong: true,
            casemapping: None,
            emit_raw_lines: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins if set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_nickname() -> String {
    "slirc".to_string()
}

fn default_username() -> String {
    "slirc".to_string()
}

fn default_realname() -> String {
    "slirc engine".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.initial_casemapping()?;
        Ok(config)
    }

    /// The casemapping the State Model starts with.
    pub fn initial_casemapping(&self) -> Result<CaseMapping, ConfigError> {
        match &self.engine.casemapping {
            None => Ok(CaseMapping::default()),
            Some(token) => CaseMapping::from_token(token)
                .ok_or_else(|| ConfigError::UnknownCaseMapping(token.clone())),
        }
    }
}
