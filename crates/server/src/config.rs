//! Startup configuration read from the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `None` keeps idle connections open forever
    pub read_timeout: Option<Duration>,
    pub log_level: Level,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },
}

impl ConfigError {
    fn invalid_value(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue { key, value: value.to_owned(), reason: reason.to_string() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            read_timeout: Some(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS)),
            log_level: Level::INFO,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which maps a variable name to its value.
    ///
    /// `PORT` takes precedence over `NODE_PORT`. A `READ_TIMEOUT_SECS` of `0` disables the
    /// idle timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some((key, value)) = lookup("PORT").map(|v| ("PORT", v)).or_else(|| lookup("NODE_PORT").map(|v| ("NODE_PORT", v))) {
            config.port = parse(key, &value)?;
        }

        if let Some(value) = lookup("HOST") {
            config.host = parse("HOST", &value)?;
        }

        if let Some(value) = lookup("READ_TIMEOUT_SECS") {
            let secs: u64 = parse("READ_TIMEOUT_SECS", &value)?;
            config.read_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(value) = lookup("LOG_LEVEL") {
            config.log_level = parse("LOG_LEVEL", &value)?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::invalid_value(key, value, e))
}
