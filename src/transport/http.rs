//! reqwest-backed transport

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::{ApiResponse, Result, RetryPolicy, Transport, TransportError};
use crate::auth::Ticket;
use crate::catalog::ApiRequest;
use crate::config::TransportConfig;
use crate::observability::Metrics;

/// Header carrying the session ticket
pub const TICKET_HEADER: &str = "TGT";

pub struct HttpTransport {
    client: Client,
    base_url: Url,
    language: HeaderValue,
    policy: RetryPolicy,
    metrics: Arc<Metrics>,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url`.
    ///
    /// Request paths are joined onto the base, so a trailing slash is added
    /// when missing.
    pub fn new(
        base_url: &str,
        language: &str,
        config: &TransportConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let language = HeaderValue::from_str(language)
            .map_err(|e| TransportError::InvalidUrl(format!("invalid language header: {}", e)))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gridfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            language,
            policy: RetryPolicy::from(config),
            metrics,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// One attempt, no retry
    async fn send_once(
        &self,
        url: &Url,
        request: &ApiRequest,
        ticket: Option<&Ticket>,
    ) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), url.clone())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .header(ACCEPT_LANGUAGE, self.language.clone());

        if let Some(ticket) = ticket {
            builder = builder.header(TICKET_HEADER, ticket.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(dataset = request.dataset, status = status.as_u16(), size = body.len(), "Response received");

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, ticket: Option<&Ticket>) -> Result<ApiResponse> {
        let url = self
            .base_url
            .join(request.path)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", request.path, e)))?;

        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            self.metrics.request_sent();

            match self.send_once(&url, request, ticket).await {
                Ok(response) => {
                    if attempts > 1 {
                        debug!(dataset = request.dataset, attempts, "Request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if !self.policy.is_retryable(&e) || !self.policy.has_budget(attempts) {
                        warn!(dataset = request.dataset, %url, attempts, error = %e, "Request failed");
                        self.metrics.request_failed();
                        return Err(e);
                    }

                    let backoff = self.policy.backoff(attempts);
                    warn!(
                        dataset = request.dataset,
                        attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    self.metrics.retry_scheduled();
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&normalized).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(TransportError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidUrl(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}
