use crate::constants::*;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub query_timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid SERVER_PORT: {0}")]
    InvalidPort(String),
    #[error("Invalid QUERY_TIMEOUT_SECS: {0} (must be a positive integer)")]
    InvalidQueryTimeout(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests never touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("SERVER_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let data_path = lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }

        let query_timeout = match lookup("QUERY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidQueryTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        };

        let log_format = LogFormat::parse(lookup("LOG_FORMAT").as_deref());

        Ok(Config {
            host,
            port,
            data_path,
            query_timeout,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_file(&self) -> PathBuf {
        PathBuf::from(&self.data_path).join(DATABASE_FILE_NAME)
    }
}
