//! Dataset client: catalog lookup, request assembly and dispatch

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::Ticket;
use crate::catalog::{Catalog, RequestError, RequestParams};
use crate::storage::StorageError;
use crate::transport::{Transport, TransportError};

/// Anything that can go wrong fetching one dataset for one target
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("dataset '{dataset}' requires a ticket")]
    MissingTicket { dataset: &'static str },

    #[error("response for '{dataset}' is not valid JSON: {detail}")]
    Parse { dataset: &'static str, detail: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Coarse failure category recorded in batch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    Unauthorized,
    HttpStatus,
    Timeout,
    Connection,
    Parse,
    Storage,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Timeout => "timeout",
            FailureKind::Connection => "connection",
            FailureKind::Parse => "parse",
            FailureKind::Storage => "storage",
        };
        f.write_str(s)
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Request(_) => FailureKind::InvalidRequest,
            FetchError::MissingTicket { .. } => FailureKind::Unauthorized,
            FetchError::Transport(e) if e.is_auth_failure() => FailureKind::Unauthorized,
            FetchError::Transport(TransportError::HttpStatus { .. }) => FailureKind::HttpStatus,
            FetchError::Transport(TransportError::Timeout) => FailureKind::Timeout,
            FetchError::Transport(TransportError::Connection(_)) => FailureKind::Connection,
            FetchError::Transport(TransportError::InvalidUrl(_)) => FailureKind::InvalidRequest,
            FetchError::Parse { .. } => FailureKind::Parse,
            FetchError::Storage(_) => FailureKind::Storage,
        }
    }
}

/// Sends catalog requests through a [`Transport`] with the session ticket
#[derive(Clone)]
pub struct DatasetClient {
    catalog: Catalog,
    transport: Arc<dyn Transport>,
    ticket: Option<Ticket>,
}

impl DatasetClient {
    pub fn new(catalog: Catalog, transport: Arc<dyn Transport>, ticket: Option<Ticket>) -> Self {
        Self {
            catalog,
            transport,
            ticket,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetch one dataset and parse the body as JSON.
    ///
    /// Request errors surface before anything is sent.
    pub async fn fetch(&self, dataset: &str, params: &RequestParams) -> Result<Value, FetchError> {
        let descriptor = self.catalog.get(dataset)?;
        let request = descriptor.build(params)?;

        if request.requires_ticket && self.ticket.is_none() {
            return Err(FetchError::MissingTicket {
                dataset: descriptor.name,
            });
        }

        debug!(dataset = descriptor.name, method = %request.method, path = request.path, "Sending request");

        let response = self.transport.send(&request, self.ticket.as_ref()).await?;

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| FetchError::Parse {
            dataset: descriptor.name,
            detail: e.to_string(),
        })?;

        info!(dataset = descriptor.name, status = response.status, size = response.body.len(), "Dataset fetched");
        Ok(value)
    }
}
