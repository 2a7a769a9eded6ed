//! Typed configuration from environment variables.
//!
//! Loaded once at startup; invalid values fail fast. The database URL is
//! wrapped in [`SecretString`] so it never reaches the logs.

use secrecy::SecretString;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default session lifetime: two weeks.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 1_209_600;

/// Default connection pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid("TASKBOARD_LOG_FORMAT", value)),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str) -> Self {
        Self::Invalid {
            name,
            value: value.to_owned(),
        }
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct AppConfig {
    /// `PostgreSQL` connection string; the in-memory store is used when
    /// absent.
    pub database_url: Option<SecretString>,
    /// Listen address.
    pub bind: SocketAddr,
    /// Session lifetime in seconds.
    pub session_ttl_secs: i64,
    /// Maximum pooled database connections.
    pub db_pool_size: u32,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv().ok()` first to honour a local `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").map(SecretString::from);
        let bind = parse_or("TASKBOARD_BIND", var("TASKBOARD_BIND"), || {
            SocketAddr::from(([127, 0, 0, 1], 8000))
        })?;
        let session_ttl_secs = parse_or(
            "TASKBOARD_SESSION_TTL_SECS",
            var("TASKBOARD_SESSION_TTL_SECS"),
            || DEFAULT_SESSION_TTL_SECS,
        )?;
        if session_ttl_secs <= 0 {
            return Err(ConfigError::invalid(
                "TASKBOARD_SESSION_TTL_SECS",
                &session_ttl_secs.to_string(),
            ));
        }
        let db_pool_size = parse_or("TASKBOARD_DB_POOL_SIZE", var("TASKBOARD_DB_POOL_SIZE"), || {
            DEFAULT_DB_POOL_SIZE
        })?;
        if db_pool_size == 0 {
            return Err(ConfigError::invalid("TASKBOARD_DB_POOL_SIZE", "0"));
        }
        let log_filter = var("TASKBOARD_LOG")
            .or_else(|| var("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        let log_format = var("TASKBOARD_LOG_FORMAT")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            bind,
            session_ttl_secs,
            db_pool_size,
            log_filter,
            log_format,
        })
    }

    /// Session lifetime as a [`chrono::Duration`].
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    value.map_or_else(
        || Ok(default()),
        |raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::invalid(name, &raw))
        },
    )
}
