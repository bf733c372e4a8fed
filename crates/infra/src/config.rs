//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::db::PostgresSettings;
use crate::retry::{DelayPolicy, RetryOptions};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0}")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where read models live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres(PostgresSettings),
}

/// Polling budget for read-model lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadModelRetrySettings {
    pub max_attempts: u32,
    pub delay: Duration,
    pub deadline: Option<Duration>,
}

impl Default for ReadModelRetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(100),
            deadline: None,
        }
    }
}

impl ReadModelRetrySettings {
    pub fn options<E>(&self) -> RetryOptions<E> {
        let options = RetryOptions::new(self.max_attempts, DelayPolicy::Fixed(self.delay));
        match self.deadline {
            Some(deadline) => options.with_deadline(deadline),
            None => options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    pub read_model_retry: ReadModelRetrySettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse(
            "BIND_ADDR",
            get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let use_persistent = match get("USE_PERSISTENT_STORES") {
            Some(raw) => parse("USE_PERSISTENT_STORES", raw)?,
            None => false,
        };

        let persistence = if use_persistent {
            let connection_string = get("DATABASE_URL").ok_or(ConfigError::Missing(
                "Postgres connection string not set. Please define \"DATABASE_URL\" environment variable",
            ))?;
            let schema_name = get("DATABASE_SCHEMA").ok_or(ConfigError::Missing(
                "Postgres schema name string not set. Please define \"DATABASE_SCHEMA\" environment variable",
            ))?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => parse("DATABASE_MAX_CONNECTIONS", raw)?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            Persistence::Postgres(PostgresSettings {
                connection_string,
                schema_name,
                max_connections,
            })
        } else {
            Persistence::InMemory
        };

        let defaults = ReadModelRetrySettings::default();
        let read_model_retry = ReadModelRetrySettings {
            max_attempts: match get("READ_MODEL_RETRY_MAX_ATTEMPTS") {
                Some(raw) => parse("READ_MODEL_RETRY_MAX_ATTEMPTS", raw)?,
                None => defaults.max_attempts,
            },
            delay: match get("READ_MODEL_RETRY_DELAY_MS") {
                Some(raw) => Duration::from_millis(parse("READ_MODEL_RETRY_DELAY_MS", raw)?),
                None => defaults.delay,
            },
            deadline: get("READ_MODEL_RETRY_DEADLINE_MS")
                .map(|raw| parse("READ_MODEL_RETRY_DEADLINE_MS", raw).map(Duration::from_millis))
                .transpose()?,
        };

        Ok(Self {
            bind_addr,
            persistence,
            read_model_retry,
        })
    }
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}
