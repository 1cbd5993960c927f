use super::models::{Config, Credentials};
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "GRIDFETCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/gridfetch.toml";
const ENV_PREFIX: &str = "GRIDFETCH";
const ENV_SEPARATOR: &str = "__";

pub const USERNAME_ENV_VAR: &str = "EPIAS_TRANSPARENCY_USERNAME";
pub const PASSWORD_ENV_VAR: &str = "EPIAS_TRANSPARENCY_PASSWORD";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    config.credentials = credentials_from_env();

    Ok(config)
}

/// Credentials live in the environment only
fn credentials_from_env() -> Credentials {
    Credentials {
        username: env::var(USERNAME_ENV_VAR).ok(),
        password: env::var(PASSWORD_ENV_VAR).ok(),
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // GRIDFETCH__TRANSPORT__MAX_RETRIES -> transport.max_retries
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
