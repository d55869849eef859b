//! Configuration for the catalog CLI

use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_parse};
use database::common::RetryPolicy;
use database::postgres::PostgresConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PostgresConfig,
    pub retry: RetryPolicy,
}

/// Environment variables, on top of the `DATABASE_URL`/`DB_*` pool settings:
/// - `DB_CONNECT_ATTEMPTS` (default: 5)
/// - `DB_CONNECT_BACKOFF_MS` (default: 200)
impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = RetryPolicy::default();
        let attempts = env_parse("DB_CONNECT_ATTEMPTS", defaults.max_attempts)?;
        let backoff_ms = env_parse(
            "DB_CONNECT_BACKOFF_MS",
            defaults.initial_delay.as_millis() as u64,
        )?;

        Ok(Self {
            database: PostgresConfig::from_env()?,
            retry: defaults
                .with_max_attempts(attempts)
                .with_initial_delay(Duration::from_millis(backoff_ms)),
        })
    }
}
