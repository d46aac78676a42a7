//! Command-line interface for Zerolift
//!
//! Provides argument parsing for the Zerolift binary.

use clap::{Parser, Subcommand};

/// Backlog-driven scale-from-zero trigger for worker fleets
#[derive(Parser)]
#[command(name = "zerolift")]
#[command(version)]
#[command(about = "Backlog-driven scale-from-zero trigger for worker fleets")]
#[command(
    long_about = "Zerolift runs one decision cycle against the cluster's metrics endpoint and \
    the fleet-management backend, launching a first worker for any tag whose fleet is scaled \
    to zero while work is waiting. By default it runs a single cycle and exits, which suits \
    external schedulers; --interval keeps it running on a fixed period instead."
)]
pub struct Cli {
    /// Re-run the decision cycle every N seconds instead of exiting after one pass
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load and validate configuration from the environment, print the resolved mapping, and exit
    CheckConfig,
}
