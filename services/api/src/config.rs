//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    /// Replaces the password embedded in `database_url` when set.
    pub database_access_key: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub log_level: Level,
    pub categories_snapshot_path: PathBuf,
    pub questions_snapshot_path: PathBuf,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let database_access_key = lookup("DATABASE_ACCESS_KEY").filter(|k| !k.is_empty());

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", &lookup, 5)?;
        let run_migrations = parse_or("RUN_MIGRATIONS", &lookup, false)?;

        let log_level = log_level(&lookup)?;

        // --- Snapshot Output ---
        let categories_snapshot_path = lookup("CATEGORIES_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("src/assets/categories.json"));
        let questions_snapshot_path = lookup("QUESTIONS_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("src/assets/questions.json"));

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            database_access_key,
            db_max_connections,
            run_migrations,
            log_level,
            categories_snapshot_path,
            questions_snapshot_path,
            cors_origin,
        })
    }
}

/// Settings of the `refresh` binary, which fires the snapshot trigger.
#[derive(Clone, Debug)]
pub struct TriggerConfig {
    pub export_url: reqwest::Url,
    pub log_level: Level,
}

impl TriggerConfig {
    /// Loads the trigger settings from environment variables (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let export_url = parse_or(
            "EXPORT_URL",
            &lookup,
            reqwest::Url::parse("http://127.0.0.1:3000/api/update-data")
                .map_err(|e| ConfigError::InvalidValue("EXPORT_URL".to_string(), e.to_string()))?,
        )?;
        let log_level = log_level(&lookup)?;

        Ok(Self {
            export_url,
            log_level,
        })
    }
}

fn log_level<F>(lookup: &F) -> Result<Level, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
    log_level_str.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", log_level_str),
        )
    })
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
