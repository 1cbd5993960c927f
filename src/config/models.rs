use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::catalog::DEFAULT_CATALOG_VERSION;
use crate::transport::DEFAULT_RETRY_STATUSES;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Loaded from the environment only, never from the config file
    #[serde(skip)]
    pub credentials: Credentials,
}

/// Remote service endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Value of the `Accept-Language` header
    #[serde(default = "default_language")]
    pub language: String,
    /// Endpoint catalog version
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            language: default_language(),
            catalog: default_catalog(),
        }
    }
}

fn default_base_url() -> String {
    "https://seffaflik.epias.com.tr/electricity-service".to_string()
}

fn default_auth_url() -> String {
    "https://giris.epias.com.tr/cas/v1/tickets".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_catalog() -> String {
    DEFAULT_CATALOG_VERSION.to_string()
}

/// Retry and timeout policy shared by every data call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_statuses() -> Vec<u16> {
    DEFAULT_RETRY_STATUSES.to_vec()
}

/// Local state and output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_ticket_file")]
    pub ticket_file: PathBuf,
    #[serde(default = "default_targets_file")]
    pub targets_file: PathBuf,
    /// Per-target batch artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ticket_file: default_ticket_file(),
            targets_file: default_targets_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_ticket_file() -> PathBuf {
    PathBuf::from("data/tgt.json")
}

fn default_targets_file() -> PathBuf {
    PathBuf::from("data/selected_powerplants.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/selected_powerplants_data")
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Directory for daily log files; stdout only when unset
    #[serde(default = "default_log_dir")]
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_log_dir() -> Option<PathBuf> {
    Some(PathBuf::from("logs"))
}

/// Service account credentials
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Both values, when both are present and non-empty
    pub fn require(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
