//! Process configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve log level, log directory and database path for hosts that wire
//!   the task core (CLI, view shells).
//!
//! # Invariants
//! - Blank values count as unset.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKLIST_LOG_DIR";
pub const ENV_DB_PATH: &str = "TASKLIST_DB_PATH";

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

/// Configuration errors naming the offending variable.
#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel {
        var: &'static str,
        source: LoggingError,
    },
    RelativeLogDir {
        var: &'static str,
        value: PathBuf,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel { var, source } => write!(f, "{var}: {source}"),
            Self::RelativeLogDir { var, value } => {
                write!(f, "{var} must be an absolute path, got `{}`", value.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel { source, .. } => Some(source),
            Self::RelativeLogDir { .. } => None,
        }
    }
}

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: LogLevel,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub db_path: PathBuf,
}

impl CoreConfig {
    /// Reads `TASKLIST_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => LogLevel::parse(&value).map_err(|source| {
                ConfigError::InvalidLogLevel {
                    var: ENV_LOG_LEVEL,
                    source,
                }
            })?,
            None => default_log_level(),
        };

        let log_dir = match read(ENV_LOG_DIR).map(PathBuf::from) {
            Some(path) if !path.is_absolute() => {
                return Err(ConfigError::RelativeLogDir {
                    var: ENV_LOG_DIR,
                    value: path,
                });
            }
            other => other,
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        Ok(Self {
            log_level,
            log_dir,
            db_path,
        })
    }
}
