//! Configuration management for gridfetch
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Environment Variables
//!
//! Any setting can be overridden with `GRIDFETCH__<section>__<key>`:
//! - `GRIDFETCH__SERVICE__BASE_URL=http://localhost:8080/electricity-service`
//! - `GRIDFETCH__TRANSPORT__MAX_RETRIES=5`
//! - `GRIDFETCH__PATHS__OUTPUT_DIR=out`
//!
//! Credentials are read only from `EPIAS_TRANSPARENCY_USERNAME` and
//! `EPIAS_TRANSPARENCY_PASSWORD` (a `.env` file is honored).
//!
//! # Configuration File
//!
//! Loaded from `config/gridfetch.toml` unless `GRIDFETCH_CONFIG` points
//! elsewhere. The file is optional.

mod models;
mod sources;
mod validation;

pub use models::{Config, Credentials, PathsConfig, ServiceConfig, TelemetryConfig, TransportConfig};
pub use sources::{PASSWORD_ENV_VAR, USERNAME_ENV_VAR};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without credentials
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
