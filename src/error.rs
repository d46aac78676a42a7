//! Error types for Zerolift
//!
//! One enum covers the whole decision cycle. Every variant is fatal for the
//! cycle it occurs in: errors propagate to the invocation entry point and the
//! next scheduled cycle re-evaluates from scratch.

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics endpoint returned {status}: {body}")]
    SnapshotFetch { status: u16, body: String },

    #[error("Failed to fetch metrics from {url}: {source}")]
    SnapshotTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse metrics exposition text: {source}")]
    SnapshotParse {
        #[source]
        source: std::io::Error,
    },

    #[error("Fleet query for {fleet} returned {count} records, expected exactly 1")]
    FleetCardinality { fleet: String, count: usize },

    #[error("Fleet query for {requested} returned a record named {returned}")]
    FleetIdentityMismatch { requested: String, returned: String },

    #[error("Fleet backend request for {fleet} failed: {reason}")]
    Backend { fleet: String, reason: String },
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
