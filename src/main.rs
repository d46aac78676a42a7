//! Zerolift binary
//!
//! Loads configuration from the environment, then runs one decision cycle
//! (or a fixed-interval loop of them) against the metrics endpoint and the
//! fleet-management backend.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use zerolift::cli::{Cli, Command};
use zerolift::config::Config;
use zerolift::fleet::HttpFleetBackend;
use zerolift::telemetry;
use zerolift::trigger::Trigger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    // Initialize telemetry
    telemetry::init(&config.observability.log_level);

    if let Some(Command::CheckConfig) = cli.command {
        let mut mapping: Vec<_> = config.fleets.tag_fleets().iter().collect();
        mapping.sort();
        for (tag, fleet) in mapping {
            println!("{} -> {}", tag, fleet);
        }
        println!("configuration OK");
        return Ok(());
    }

    let backend = Arc::new(HttpFleetBackend::new(config.fleets.api_url.clone())?);
    let trigger = Trigger::new(config.clone(), backend)?;

    match cli.interval {
        None => {
            // Single shot: exit non-zero on a failed cycle so the scheduler
            // records the failure.
            trigger.run_cycle().await?;
        }
        Some(secs) => {
            tracing::info!(interval_secs = secs, "running on a fixed interval");
            let mut ticker = tokio::time::interval(Duration::from_secs(secs));
            loop {
                ticker.tick().await;
                // A failed cycle made no partial decisions worth keeping; the
                // next tick re-evaluates from scratch.
                if let Err(e) = trigger.run_cycle().await {
                    tracing::error!(error = %e, "decision cycle failed");
                }
            }
        }
    }

    Ok(())
}
