//! Fetch orchestrator: one dataset call per target, failures isolated
//!
//! Targets are processed strictly in order. Each ends in exactly one of
//! three states: skipped (no identifier), succeeded (artifact written) or
//! failed (kind and message recorded). No target error stops the batch.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::{DateRange, PayloadShape, RequestError, RequestParams};
use crate::client::{DatasetClient, FailureKind, FetchError};
use crate::observability::Metrics;
use crate::state::FetchTarget;
use crate::storage::{ArtifactStore, artifact_name};

/// Produces the payload for one target id
#[async_trait]
pub trait TargetFetcher: Send + Sync {
    async fn fetch_target(&self, id: i64, range: DateRange) -> Result<Value, FetchError>;
}

/// Fetches a per-plant dataset, passing the target id as the plant id
pub struct PlantDatasetFetcher {
    client: DatasetClient,
    dataset: &'static str,
}

impl PlantDatasetFetcher {
    /// Fails unless `dataset` takes a date range and a plant id
    pub fn new(client: DatasetClient, dataset: &str) -> Result<Self, RequestError> {
        let descriptor = client.catalog().get(dataset)?;
        if !matches!(descriptor.shape, PayloadShape::DateRangeWithPlant { .. }) {
            return Err(RequestError::UnsupportedParameter {
                dataset: descriptor.name,
                parameter: "plant id",
            });
        }
        Ok(Self {
            client,
            dataset: descriptor.name,
        })
    }

    pub fn dataset(&self) -> &'static str {
        self.dataset
    }
}

#[async_trait]
impl TargetFetcher for PlantDatasetFetcher {
    async fn fetch_target(&self, id: i64, range: DateRange) -> Result<Value, FetchError> {
        let params = RequestParams::for_range(range).with_plant(Some(id));
        self.client.fetch(self.dataset, &params).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSuccess {
    pub index: usize,
    pub id: i64,
    pub name: String,
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedTarget {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetFailure {
    pub index: usize,
    pub id: i64,
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub succeeded: Vec<TargetSuccess>,
    pub skipped: Vec<SkippedTarget>,
    pub failed: Vec<TargetFailure>,
}

impl BatchReport {
    fn new(range: DateRange) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            start: range.start(),
            end: range.end(),
            succeeded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }

    /// Targets for which a fetch was issued
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// At least one target failed
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Runs batches, writing each successful payload to the artifact store
pub struct BatchRunner {
    store: ArtifactStore,
    metrics: Arc<Metrics>,
}

impl BatchRunner {
    pub fn new(store: ArtifactStore, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn run(&self, targets: &[FetchTarget], range: DateRange, fetcher: &dyn TargetFetcher) -> BatchReport {
        let mut report = BatchReport::new(range);

        info!(
            run_id = %report.run_id,
            targets = targets.len(),
            %range,
            output = self.store.location(),
            "Batch started"
        );

        for (index, target) in targets.iter().enumerate() {
            let Some(id) = target.id else {
                warn!(index, target = %target.name, "Skipping target without id");
                self.metrics.target_skipped();
                report.skipped.push(SkippedTarget {
                    index,
                    name: target.name.clone(),
                });
                continue;
            };

            info!(index, target = %target.name, id, "Fetching target");

            match self.fetch_and_store(target, id, range, fetcher).await {
                Ok(artifact) => {
                    info!(index, target = %target.name, id, artifact = %artifact, "Target saved");
                    self.metrics.target_succeeded();
                    report.succeeded.push(TargetSuccess {
                        index,
                        id,
                        name: target.name.clone(),
                        artifact,
                    });
                }
                Err(e) => {
                    error!(index, target = %target.name, id, kind = %e.kind(), error = %e, "Target failed");
                    self.metrics.target_failed();
                    report.failed.push(TargetFailure {
                        index,
                        id,
                        name: target.name.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Batch finished"
        );

        report
    }

    async fn fetch_and_store(
        &self,
        target: &FetchTarget,
        id: i64,
        range: DateRange,
        fetcher: &dyn TargetFetcher,
    ) -> Result<String, FetchError> {
        let value = fetcher.fetch_target(id, range).await?;
        let key = artifact_name(&target.name, id);
        let meta = self.store.put_json(&key, &value).await?;
        Ok(meta.key)
    }
}
