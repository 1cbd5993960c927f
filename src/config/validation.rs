use super::models::Config;
use crate::catalog::Catalog;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid URL for {field}: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Unknown catalog version '{0}'")]
    UnknownCatalog(String),

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("Retry status {0} is not an HTTP error status (400-599)")]
    InvalidRetryStatus(u16),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_service(config)?;
    validate_transport(config)?;
    validate_telemetry(config)?;
    Ok(())
}

fn validate_service(config: &Config) -> Result<(), ValidationError> {
    let service = &config.service;

    for (field, value) in [("service.base_url", &service.base_url), ("service.auth_url", &service.auth_url)] {
        let valid = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    if service.language.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "service.language",
        });
    }

    if Catalog::for_version(&service.catalog).is_err() {
        return Err(ValidationError::UnknownCatalog(service.catalog.clone()));
    }

    Ok(())
}

fn validate_transport(config: &Config) -> Result<(), ValidationError> {
    let transport = &config.transport;

    if transport.timeout_secs == 0 {
        return Err(ValidationError::NotPositive {
            field: "transport.timeout_secs",
        });
    }
    if transport.connect_timeout_secs == 0 {
        return Err(ValidationError::NotPositive {
            field: "transport.connect_timeout_secs",
        });
    }
    if transport.backoff_base_ms == 0 {
        return Err(ValidationError::NotPositive {
            field: "transport.backoff_base_ms",
        });
    }

    if let Some(status) = transport
        .retry_statuses
        .iter()
        .find(|status| !(400..=599).contains(*status))
    {
        return Err(ValidationError::InvalidRetryStatus(*status));
    }

    Ok(())
}

fn validate_telemetry(config: &Config) -> Result<(), ValidationError> {
    if config.telemetry.filter.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "telemetry.filter",
        });
    }
    Ok(())
}
