//! Executor configuration
//!
//! Pool settings handed to the sqlx driver when a `PostgresExecutor` is built.
//! Values come from the environment with the same variable names the rest of
//! the framework uses.

use std::env;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// Configuration for the PostgreSQL executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/postgres".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600), // 10 minutes
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration for the given URL with default pool settings
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`
    /// and `DB_ACQUIRE_TIMEOUT` fall back to the defaults when unset.
    pub fn from_env() -> ModelResult<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ModelError::Connection("DATABASE_URL is not set".to_string()))?;
        let defaults = Self::default();

        let config = Self {
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            acquire_timeout_seconds: env_or(
                "DB_ACQUIRE_TIMEOUT",
                defaults.acquire_timeout_seconds,
            )?,
            idle_timeout_seconds: defaults.idle_timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ModelResult<()> {
        let parsed = url::Url::parse(&self.database_url)
            .map_err(|e| ModelError::Connection(format!("Invalid database URL: {}", e)))?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            return Err(ModelError::Connection(format!(
                "Unsupported database URL scheme '{}'",
                parsed.scheme()
            )));
        }

        if self.max_connections == 0 {
            return Err(ModelError::Connection(
                "max_connections must be greater than zero".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ModelError::Connection(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> ModelResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ModelError::Connection(format!("Invalid value '{}' for {}", raw, name))),
        Err(_) => Ok(default),
    }
}
