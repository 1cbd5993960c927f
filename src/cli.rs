//! Command line surface
//!
//! Every command that talks to the data service loads the persisted ticket
//! before building any client, so missing local state never costs a request.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthError, Ticket, TicketProvider};
use crate::catalog::{Catalog, DateRange, RequestError, RequestParams};
use crate::client::{DatasetClient, FetchError};
use crate::config::Config;
use crate::observability::Metrics;
use crate::orchestrator::{BatchReport, BatchRunner, PlantDatasetFetcher};
use crate::state::{self, LocalStateError};
use crate::storage::{ArtifactStore, StorageError};
use crate::transport::{HttpTransport, TransportError};

/// Days covered by a batch when no range is given, ending yesterday
pub const DEFAULT_BATCH_DAYS: u64 = 7;

pub const DEFAULT_BATCH_DATASET: &str = "realtime-generation";

const POWERPLANT_LIST_DATASET: &str = "powerplant-list";
const POWERPLANT_LIST_FILE: &str = "powerplants_info.json";

#[derive(Parser, Debug)]
#[command(name = "gridfetch")]
#[command(about = "Fetch client for the electricity market transparency platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange credentials for a ticket and persist it
    Ticket,
    /// List the endpoint catalog
    Datasets,
    /// Fetch one dataset and save the raw JSON
    Fetch(FetchArgs),
    /// Save the power plant lookup list
    Powerplants,
    /// Fetch a per-plant dataset for every target in the target list
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Dataset name, see `gridfetch datasets`
    pub dataset: String,

    /// First day (YYYY-MM-DD); alone it selects a single day
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Day for single-date datasets and id lookups
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub organization_id: Option<i64>,

    #[arg(long)]
    pub uevcb_id: Option<i64>,

    #[arg(long)]
    pub plant_id: Option<i64>,

    /// Output file; defaults to `<data_dir>/<dataset>.json`
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Per-plant dataset to fetch
    #[arg(long, default_value = DEFAULT_BATCH_DATASET)]
    pub dataset: String,

    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Exit non-zero when any target failed
    #[arg(long)]
    pub fail_on_degraded: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    LocalState(#[from] LocalStateError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to set up transport: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to save output: {0}")]
    Storage(#[from] StorageError),
}

/// How a successful command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The batch finished but some targets failed
    Degraded,
}

pub async fn run(cli: Cli, config: &Config, metrics: Arc<Metrics>) -> Result<Outcome, CliError> {
    match cli.command {
        Commands::Ticket => {
            acquire_ticket(config).await?;
            Ok(Outcome::Completed)
        }
        Commands::Datasets => {
            list_datasets(&Catalog::for_version(&config.service.catalog)?);
            Ok(Outcome::Completed)
        }
        Commands::Fetch(args) => {
            fetch_dataset(config, metrics, &args).await?;
            Ok(Outcome::Completed)
        }
        Commands::Powerplants => {
            fetch_powerplants(config, metrics).await?;
            Ok(Outcome::Completed)
        }
        Commands::Batch(args) => {
            let report = run_batch(config, metrics, &args).await?;
            if args.fail_on_degraded && report.is_degraded() {
                Ok(Outcome::Degraded)
            } else {
                Ok(Outcome::Completed)
            }
        }
    }
}

async fn acquire_ticket(config: &Config) -> Result<(), CliError> {
    let provider = TicketProvider::new(
        &config.service.auth_url,
        config.credentials.clone(),
        &config.transport,
    )?;
    let ticket = provider.acquire().await?;
    state::save_ticket(&config.paths.ticket_file, &ticket).await?;

    info!(path = %config.paths.ticket_file.display(), "Ticket saved");
    Ok(())
}

fn list_datasets(catalog: &Catalog) {
    println!("{:<42} {:<6} {:<17} PATH", "DATASET", "METHOD", "PARAMETERS");
    for descriptor in catalog.iter() {
        println!(
            "{:<42} {:<6} {:<17} {}",
            descriptor.name,
            descriptor.method,
            descriptor.shape.label(),
            descriptor.path
        );
    }
}

fn build_client(config: &Config, metrics: Arc<Metrics>, ticket: Ticket) -> Result<DatasetClient, CliError> {
    let catalog = Catalog::for_version(&config.service.catalog)?;
    let transport = HttpTransport::new(
        &config.service.base_url,
        &config.service.language,
        &config.transport,
        metrics,
    )?;
    Ok(DatasetClient::new(catalog, Arc::new(transport), Some(ticket)))
}

fn fetch_params(args: &FetchArgs) -> Result<RequestParams, RequestError> {
    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        (Some(start), None) => Some(DateRange::single_day(start)),
        (None, Some(_)) => return Err(RequestError::MissingDateRange),
        (None, None) => None,
    };

    Ok(RequestParams {
        range,
        date: args.date,
        organization_id: args.organization_id,
        uevcb_id: args.uevcb_id,
        plant_id: args.plant_id,
    })
}

/// Write `value` to `path` through a store rooted at its parent directory
async fn save_output(path: &Path, value: &Value) -> Result<(), CliError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::InvalidPath {
            key: path.display().to_string(),
            detail: "no file name".to_string(),
        })?;

    let store = ArtifactStore::local(dir)?;
    let meta = store.put_json(&file_name, value).await?;

    info!(path = %path.display(), size = meta.size, "Output saved");
    Ok(())
}

pub async fn fetch_dataset(config: &Config, metrics: Arc<Metrics>, args: &FetchArgs) -> Result<(), CliError> {
    let ticket = state::load_ticket(&config.paths.ticket_file).await?;
    let params = fetch_params(args)?;

    let client = build_client(config, metrics, ticket)?;
    let value = client.fetch(&args.dataset, &params).await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.paths.data_dir.join(format!("{}.json", args.dataset)));
    save_output(&output, &value).await
}

pub async fn fetch_powerplants(config: &Config, metrics: Arc<Metrics>) -> Result<(), CliError> {
    let ticket = state::load_ticket(&config.paths.ticket_file).await?;

    let client = build_client(config, metrics, ticket)?;
    let value = client.fetch(POWERPLANT_LIST_DATASET, &RequestParams::none()).await?;

    save_output(&config.paths.data_dir.join(POWERPLANT_LIST_FILE), &value).await
}

/// Run the per-plant batch over the configured target list
pub async fn run_batch(config: &Config, metrics: Arc<Metrics>, args: &BatchArgs) -> Result<BatchReport, CliError> {
    let ticket = state::load_ticket(&config.paths.ticket_file).await?;
    let targets = state::load_targets(&config.paths.targets_file).await?;

    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => DateRange::new(start, end)?,
        _ => DateRange::trailing_days(Local::now().date_naive(), DEFAULT_BATCH_DAYS)?,
    };

    let client = build_client(config, metrics.clone(), ticket)?;
    let fetcher = PlantDatasetFetcher::new(client, &args.dataset)?;
    let store = ArtifactStore::local(&config.paths.output_dir)?;

    info!(dataset = fetcher.dataset(), targets = targets.len(), %range, "Running batch");

    let runner = BatchRunner::new(store, metrics);
    Ok(runner.run(&targets, range, &fetcher).await)
}
