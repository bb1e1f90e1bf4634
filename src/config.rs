//! Runtime configuration, read from the environment once at startup and
//! passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    /// env_logger filter directives, e.g. `info` or `taskdesk=debug`.
    pub log_filter: String,
    /// Logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
    pub environment: String,
}

fn default_db_path(home: Option<String>) -> PathBuf {
    let base = home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    base.join(".taskdesk").join("taskdesk.db")
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let busy_timeout = match get("TASKDESK_BUSY_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::validation(format!(
                    "invalid TASKDESK_BUSY_TIMEOUT_MS '{raw}': expected milliseconds"
                ))
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Ok(Self {
            db_path: get("TASKDESK_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_db_path(get("HOME"))),
            busy_timeout: Duration::from_millis(busy_timeout),
            log_filter: get("TASKDESK_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_file: get("TASKDESK_LOG_FILE").map(PathBuf::from),
            environment: get("TASKDESK_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[("HOME", "/home/ann")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/home/ann/.taskdesk/taskdesk.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(5000));
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.log_file, None);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn no_home_falls_back_to_cwd() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("./.taskdesk/taskdesk.db"));
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TASKDESK_DB", "/tmp/t.db"),
            ("TASKDESK_BUSY_TIMEOUT_MS", "250"),
            ("TASKDESK_LOG", "taskdesk=debug"),
            ("TASKDESK_LOG_FILE", "/tmp/t.log"),
            ("TASKDESK_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.log_filter, "taskdesk=debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/t.log")));
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config =
            Config::from_lookup(lookup(&[("HOME", "/h"), ("TASKDESK_DB", ""), ("TASKDESK_LOG", "")]))
                .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/h/.taskdesk/taskdesk.db"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn bad_busy_timeout_rejected() {
        let err = Config::from_lookup(lookup(&[("TASKDESK_BUSY_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.is_validation());
    }
}
