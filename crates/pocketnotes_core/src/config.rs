//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where data and logs live and which group colors are offered.
//! - Load settings from a JSON file or from `POCKETNOTES_*` env variables.
//!
//! # Invariants
//! - A loaded config always has a non-empty palette with no blank entries.
//! - `log_level` always parses as a supported level.

use crate::logging::{default_log_level, init_logging, LogLevel, LoggingError};
use crate::model::group::DEFAULT_GROUP_PALETTE;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "POCKETNOTES_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "POCKETNOTES_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POCKETNOTES_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "pocketnotes.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    EmptyPalette,
    BlankPaletteEntry(usize),
    InvalidLogLevel(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::EmptyPalette => write!(f, "palette must contain at least one color"),
            Self::BlankPaletteEntry(index) => write!(f, "palette entry {index} is blank"),
            Self::InvalidLogLevel(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidLogLevel(err) => Some(err),
            _ => None,
        }
    }
}

/// Runtime settings for the core and its bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file holding the collections.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Colors offered for new groups.
    pub palette: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().as_str().to_string(),
            log_dir: None,
            palette: DEFAULT_GROUP_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CoreConfig {
    /// Reads and validates a JSON config file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults overridden by `POCKETNOTES_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        config.validate()?;
        Ok(config)
    }

    /// Starts file logging at `log_dir` with `log_level`.
    ///
    /// Returns `Ok(false)` without touching the logger when no directory
    /// is configured.
    pub fn start_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(&self.log_level, &log_dir.to_string_lossy())?;
        Ok(true)
    }

    /// Checks palette and log level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if let Some(index) = self.palette.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankPaletteEntry(index));
        }
        LogLevel::parse(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::LoggingError;
    use crate::model::group::DEFAULT_GROUP_PALETTE;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn json_file_fills_missing_keys_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "db_path": "/data/notes.sqlite3" }}"#).unwrap();

        let config = CoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.sqlite3"));
        assert_eq!(config.palette.len(), DEFAULT_GROUP_PALETTE.len());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn json_file_rejects_empty_palette() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "palette": [] }}"#).unwrap();

        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPalette));
    }

    #[test]
    fn env_lookup_overrides_defaults_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(|key| match key {
            ENV_DB_PATH => Some(" /tmp/pn.sqlite3 ".to_string()),
            ENV_LOG_LEVEL => Some("   ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/pn.sqlite3"));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn env_lookup_rejects_unknown_log_level() {
        let err = CoreConfig::from_lookup(|key| {
            (key == ENV_LOG_LEVEL).then(|| "chatty".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn start_logging_is_a_no_op_without_log_dir() {
        let config = CoreConfig::default();
        assert!(!config.start_logging().unwrap());
    }

    #[test]
    fn start_logging_uses_env_log_dir_and_rejects_relative_paths() {
        let config = CoreConfig::from_lookup(|key| {
            (key == ENV_LOG_DIR).then(|| "logs/relative".to_string())
        })
        .unwrap();
        assert_eq!(config.log_dir, Some(PathBuf::from("logs/relative")));

        let err = config.start_logging().unwrap_err();
        assert!(matches!(err, LoggingError::RelativeLogDir(_)));
    }
}
