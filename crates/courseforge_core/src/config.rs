//! Runtime configuration parsed from environment variables.
//!
//! - `COURSEFORGE_DB_PATH`: SQLite file; default `<temp_dir>/courseforge.sqlite3`
//! - `COURSEFORGE_LOG_LEVEL`: `trace|debug|info|warn|error`; default per build mode
//! - `COURSEFORGE_LOG_DIR`: absolute directory for rotating log files; unset
//!   means log to stderr
//! - `COURSEFORGE_AUTHOR`: author recorded on new projects; default `Me`

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LogDestination};
use crate::service::wizard_service::DEFAULT_AUTHOR;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "COURSEFORGE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "COURSEFORGE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "COURSEFORGE_LOG_DIR";
pub const AUTHOR_ENV: &str = "COURSEFORGE_AUTHOR";

const DEFAULT_DB_FILE_NAME: &str = "courseforge.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_destination: LogDestination,
    pub author: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_destination: LogDestination::Stderr,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl AppConfig {
    /// Builds config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let db_path = get(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from);
        let log_level = match get(LOG_LEVEL_ENV) {
            Some(raw) => normalize_level(&raw).map_err(|message| ConfigError::Invalid {
                key: LOG_LEVEL_ENV,
                message,
            })?,
            None => defaults.log_level,
        };
        let log_destination = match get(LOG_DIR_ENV) {
            Some(raw) => LogDestination::Directory(normalize_log_dir(&raw).map_err(|message| {
                ConfigError::Invalid {
                    key: LOG_DIR_ENV,
                    message,
                }
            })?),
            None => defaults.log_destination,
        };
        let author = get(AUTHOR_ENV).unwrap_or(defaults.author);

        Ok(Self {
            db_path,
            log_level,
            log_destination,
            author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, AUTHOR_ENV, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::LogDestination;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.author, "Me");
        assert_eq!(config.log_destination, LogDestination::Stderr);
    }

    #[test]
    fn values_are_read_and_normalized() {
        let config = AppConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/data/books.sqlite3"),
            (LOG_LEVEL_ENV, "WARNING"),
            (LOG_DIR_ENV, "/var/log/courseforge"),
            (AUTHOR_ENV, " Ada "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/books.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.log_destination,
            LogDestination::Directory(PathBuf::from("/var/log/courseforge"))
        );
        assert_eq!(config.author, "Ada");
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = AppConfig::from_lookup(lookup(&[(LOG_LEVEL_ENV, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == LOG_LEVEL_ENV));

        let err = AppConfig::from_lookup(lookup(&[(LOG_DIR_ENV, "relative/logs")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == LOG_DIR_ENV));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[(AUTHOR_ENV, "   ")])).unwrap();
        assert_eq!(config.author, "Me");
    }
}
