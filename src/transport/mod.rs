//! Transport: authenticated HTTP calls with bounded retry
//!
//! [`Transport`] is the seam between request assembly and the network.
//! [`HttpTransport`] is the production implementation; tests swap in their
//! own implementations or point it at a local mock server.

mod http;
mod retry;

pub use http::{HttpTransport, TICKET_HEADER};
pub use retry::{DEFAULT_RETRY_STATUSES, RetryPolicy};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::auth::Ticket;
use crate::catalog::ApiRequest;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Remote rejected the ticket
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TransportError::HttpStatus { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A 2xx response, body untouched
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `ticket` when given.
    ///
    /// Only 2xx responses come back as `Ok`; everything else is a
    /// [`TransportError`] once retries are exhausted or ruled out.
    async fn send(&self, request: &ApiRequest, ticket: Option<&Ticket>) -> Result<ApiResponse>;
}
