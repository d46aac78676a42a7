//! Configuration management for Zerolift
//!
//! All configuration is read once from the environment at process start and
//! is immutable for the process lifetime. The tag-to-fleet mapping is a JSON
//! object, e.g. `ZEROLIFT_TAG_FLEETS='{"gpu": "gpu-asg"}'`.

use crate::aggregate::DEFAULT_BACKLOG_METRIC;
use crate::error::{AppError, AppResult};
use std::collections::HashMap;

pub const ENV_METRICS_URL: &str = "ZEROLIFT_METRICS_URL";
pub const ENV_TAG_FLEETS: &str = "ZEROLIFT_TAG_FLEETS";
pub const ENV_FLEET_API_URL: &str = "ZEROLIFT_FLEET_API_URL";
pub const ENV_METRICS_TIMEOUT_MS: &str = "ZEROLIFT_METRICS_TIMEOUT_MS";
pub const ENV_BACKLOG_METRIC: &str = "ZEROLIFT_BACKLOG_METRIC";
pub const ENV_LOG_LEVEL: &str = "ZEROLIFT_LOG_LEVEL";

/// Default snapshot fetch timeout. One second: cycles run on a tight
/// schedule and must stay fast.
const DEFAULT_METRICS_TIMEOUT_MS: u64 = 1_000;

/// Upper bound for the snapshot fetch timeout (10 seconds). Anything slower
/// than "low single-digit seconds" means the metrics endpoint is the problem.
const MAX_METRICS_TIMEOUT_MS: u64 = 10_000;

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub metrics: MetricsConfig,
    pub fleets: FleetsConfig,
    pub observability: ObservabilityConfig,
}

/// Metrics snapshot source configuration
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub url: String,
    pub timeout_ms: u64,
    /// Name of the gauge representing "steps waiting" in the cluster.
    pub backlog_metric: String,
}

/// Fleet backend configuration
///
/// The mapping is private to keep it immutable after validation; it is only
/// readable through the accessor.
#[derive(Debug, Clone)]
pub struct FleetsConfig {
    pub api_url: String,
    tag_fleets: HashMap<String, String>,
}

impl FleetsConfig {
    /// Get the static tag-to-fleet mapping
    pub fn tag_fleets(&self) -> &HashMap<String, String> {
        &self.tag_fleets
    }
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_env_map(&vars)
    }

    /// Load configuration from an explicit variable map
    ///
    /// This is the testable entry point: tests pass a plain map instead of
    /// mutating process-global environment state.
    pub fn from_env_map(vars: &HashMap<String, String>) -> AppResult<Self> {
        let metrics_url = require(vars, ENV_METRICS_URL)?;
        let fleet_api_url = require(vars, ENV_FLEET_API_URL)?;
        let mapping_raw = require(vars, ENV_TAG_FLEETS)?;

        let tag_fleets: HashMap<String, String> =
            serde_json::from_str(&mapping_raw).map_err(|e| {
                AppError::Config(format!(
                    "{} must be a JSON object mapping tag to fleet identifier, \
                    e.g. '{{\"gpu\": \"gpu-asg\"}}': {}",
                    ENV_TAG_FLEETS, e
                ))
            })?;

        let timeout_ms = match vars.get(ENV_METRICS_TIMEOUT_MS) {
            None => DEFAULT_METRICS_TIMEOUT_MS,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "{} must be an integer number of milliseconds, got '{}'",
                    ENV_METRICS_TIMEOUT_MS, raw
                ))
            })?,
        };

        let backlog_metric = vars
            .get(ENV_BACKLOG_METRIC)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BACKLOG_METRIC.to_string());

        let log_level = vars
            .get(ENV_LOG_LEVEL)
            .cloned()
            .unwrap_or_else(|| ObservabilityConfig::default().log_level);

        let config = Self {
            metrics: MetricsConfig {
                url: metrics_url,
                timeout_ms,
                backlog_metric,
            },
            fleets: FleetsConfig {
                // Trailing slashes would produce `//fleets` request paths.
                api_url: fleet_api_url.trim_end_matches('/').to_string(),
                tag_fleets,
            },
            observability: ObservabilityConfig { log_level },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_env_map()`, but can also be
    /// called explicitly when constructing Config via other means (e.g., in
    /// tests).
    pub fn validate(&self) -> AppResult<()> {
        for (what, url) in [
            (ENV_METRICS_URL, &self.metrics.url),
            (ENV_FLEET_API_URL, &self.fleets.api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} has invalid URL '{}'. It must start with 'http://' or 'https://'.",
                    what, url
                )));
            }
        }

        if self.metrics.timeout_ms == 0 || self.metrics.timeout_ms > MAX_METRICS_TIMEOUT_MS {
            return Err(AppError::Config(format!(
                "{} must be between 1 and {} milliseconds, got {}. \
                Decision cycles are meant to be fast; a slow metrics endpoint \
                should be fixed there, not worked around here.",
                ENV_METRICS_TIMEOUT_MS, MAX_METRICS_TIMEOUT_MS, self.metrics.timeout_ms
            )));
        }

        if self.metrics.backlog_metric.is_empty() {
            return Err(AppError::Config(format!(
                "{} must not be empty",
                ENV_BACKLOG_METRIC
            )));
        }

        for (tag, fleet) in &self.fleets.tag_fleets {
            if tag.is_empty() {
                return Err(AppError::Config(format!(
                    "{} contains an empty tag key. Jobs with no tag aggregate \
                    under the literal tag \"none\"; map that instead.",
                    ENV_TAG_FLEETS
                )));
            }
            if fleet.is_empty() {
                return Err(AppError::Config(format!(
                    "{} maps tag '{}' to an empty fleet identifier",
                    ENV_TAG_FLEETS, tag
                )));
            }
        }

        if self.fleets.tag_fleets.is_empty() {
            tracing::warn!(
                "tag-to-fleet mapping is empty; decision cycles will never scale anything"
            );
        }

        Ok(())
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> AppResult<String> {
    match vars.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(AppError::Config(format!(
            "required environment variable {} is not set",
            name
        ))),
    }
}
