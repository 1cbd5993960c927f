use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use gridfetch::cli::{self, Cli, Outcome};
use gridfetch::config::Config;
use gridfetch::observability::{self, Metrics};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gridfetch: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let telemetry = match observability::init(&config.telemetry) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("gridfetch: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let metrics = Arc::new(Metrics::new());
    let result = cli::run(cli, &config, metrics.clone()).await;

    tracing::info!(metrics = ?metrics.snapshot(), "Run finished");

    let code = match result {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Degraded) => {
            tracing::warn!("Batch degraded: some targets failed");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    };

    telemetry.close();
    code
}
