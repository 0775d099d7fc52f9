//! Runtime configuration for the contacts core.
//!
//! # Responsibility
//! - Load optional TOML settings, falling back to defaults.
//! - Reject settings that would fail later at open/log-init time.
//!
//! # Invariants
//! - A missing config file is not an error.
//! - `phone_prefix` only contains `+` and ASCII digits.

use crate::controller::add_or_edit::DEFAULT_PHONE_PREFIX;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "contacts";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "contacts.sqlite3";
const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Settings shared by every front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    /// Text pre-filled into the phone field of a new contact.
    pub phone_prefix: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME);
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join("logs"),
            phone_prefix: DEFAULT_PHONE_PREFIX.to_string(),
        }
    }
}

impl CoreConfig {
    /// Default config location, e.g. `~/.config/contacts/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Loads and validates `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }

        let level = self.log_level.trim().to_ascii_lowercase();
        if !KNOWN_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unsupported log_level `{}`",
                self.log_level
            )));
        }

        if !self
            .phone_prefix
            .chars()
            .all(|ch| ch == '+' || ch.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "phone_prefix `{}` may only contain `+` and digits",
                self.phone_prefix
            )));
        }

        Ok(())
    }
}
