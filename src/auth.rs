//! Credential provider: exchanges username/password for a session ticket
//!
//! A single form-encoded POST against the central authentication service.
//! No retry is applied; a rejected credential or an unreachable auth
//! service is reported immediately.

use std::fmt;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Credentials, TransportConfig};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required (set EPIAS_TRANSPARENCY_USERNAME and EPIAS_TRANSPARENCY_PASSWORD)")]
    MissingCredentials,

    #[error("ticket request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("ticket response could not be read: {0}")]
    MalformedResponse(String),

    #[error("ticket request timed out")]
    Timeout,

    #[error("could not reach authentication service: {0}")]
    Connection(String),

    #[error("invalid authentication URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Opaque session credential.
///
/// Serialized as `{"tgt": "..."}`, the shape the auth service returns and
/// the ticket store persists. Debug output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    tgt: String,
}

impl Ticket {
    pub fn new(tgt: impl Into<String>) -> Self {
        Self { tgt: tgt.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.tgt
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket").field("tgt", &"<redacted>").finish()
    }
}

pub struct TicketProvider {
    client: Client,
    auth_url: Url,
    credentials: Credentials,
}

impl TicketProvider {
    pub fn new(auth_url: &str, credentials: Credentials, config: &TransportConfig) -> Result<Self> {
        let auth_url = Url::parse(auth_url).map_err(|e| AuthError::InvalidUrl(format!("{}: {}", auth_url, e)))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            auth_url,
            credentials,
        })
    }

    /// Exchange the configured credentials for a ticket
    pub async fn acquire(&self) -> Result<Ticket> {
        let (username, password) = self.credentials.require().ok_or(AuthError::MissingCredentials)?;

        info!(url = %self.auth_url, "Requesting ticket");

        let response = self
            .client
            .post(self.auth_url.clone())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else {
                    AuthError::Connection(e.to_string())
                }
            })?;

        let status = response.status();

        if status != StatusCode::OK && status != StatusCode::CREATED {
            warn!(status = status.as_u16(), "Ticket request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        let ticket: Ticket =
            serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if ticket.as_str().is_empty() {
            return Err(AuthError::MalformedResponse("empty ticket".to_string()));
        }

        info!(status = status.as_u16(), "Ticket acquired");
        Ok(ticket)
    }
}
