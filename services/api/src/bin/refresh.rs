//! services/api/src/bin/refresh.rs
//!
//! Fires the snapshot trigger once against a running server and exits with a
//! non-zero status when the export failed.

use api_lib::config::TriggerConfig;
use api_lib::trigger::{SnapshotTrigger, TriggerStatus};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match TriggerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.log_level.to_string(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Loading data from {}...", config.export_url);

    let trigger = SnapshotTrigger::new(reqwest::Client::new(), config.export_url.as_str());
    match trigger.fire_once().await {
        Some(TriggerStatus::Succeeded(_)) => {
            info!("Data has been refreshed.");
            ExitCode::SUCCESS
        }
        Some(TriggerStatus::Failed(message)) => {
            error!("Refresh failed: {}", message);
            ExitCode::FAILURE
        }
        Some(TriggerStatus::Loading) | None => ExitCode::FAILURE,
    }
}
