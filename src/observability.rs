//! Observability: tracing subscriber lifecycle and run counters
//!
//! Nothing here is global until [`init`] is called. The returned
//! [`Telemetry`] owns the file writer guard; closing (or dropping) it
//! flushes buffered log lines. [`Metrics`] is constructed by the caller and
//! handed to the transport and orchestrator explicitly.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::TelemetryConfig;

const LOG_FILE_PREFIX: &str = "gridfetch.log";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Handle for the installed subscriber
#[derive(Debug)]
pub struct Telemetry {
    file_guard: Option<WorkerGuard>,
}

impl Telemetry {
    /// Flush pending file output and release the writer
    pub fn close(mut self) {
        if let Some(guard) = self.file_guard.take() {
            drop(guard);
        }
    }
}

/// Install the process subscriber: stdout always, plus a daily rolling file
/// under `log_dir` when configured. `RUST_LOG` overrides the configured filter.
pub fn init(config: &TelemetryConfig) -> Result<Telemetry, TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: config.filter.clone(),
            reason: e.to_string(),
        })?,
    };

    let stdout_layer = fmt::layer().with_target(true);

    let (file_layer, file_guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| TelemetryError::LogDir {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    Ok(Telemetry { file_guard })
}

/// Counters for one process run
#[derive(Debug, Default)]
pub struct Metrics {
    requests_sent: AtomicU64,
    retries: AtomicU64,
    requests_failed: AtomicU64,
    targets_succeeded: AtomicU64,
    targets_skipped: AtomicU64,
    targets_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "requests_sent", "Metric incremented");
    }

    pub fn retry_scheduled(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "retries", "Metric incremented");
    }

    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "requests_failed", "Metric incremented");
    }

    pub fn target_succeeded(&self) {
        self.targets_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn target_skipped(&self) {
        self.targets_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn target_failed(&self) {
        self.targets_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            targets_succeeded: self.targets_succeeded.load(Ordering::Relaxed),
            targets_skipped: self.targets_skipped.load(Ordering::Relaxed),
            targets_failed: self.targets_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub retries: u64,
    pub requests_failed: u64,
    pub targets_succeeded: u64,
    pub targets_skipped: u64,
    pub targets_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = Metrics::new();
        metrics.request_sent();
        metrics.request_sent();
        metrics.retry_scheduled();
        metrics.target_skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_sent, 2);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.requests_failed, 0);
        assert_eq!(snapshot.targets_skipped, 1);
    }
}
