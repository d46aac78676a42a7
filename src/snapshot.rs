//! Metrics snapshot retrieval
//!
//! Fetches one metrics snapshot from the cluster's exposition endpoint and
//! converts the parsed scrape into plain [`Sample`]s for aggregation. The
//! exposition text format itself is handled by `prometheus-parse`.

use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::time::Duration;

/// A single observation from the metrics snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: String,
    pub labels: HashMap<String, String>,
    pub value: f64,
}

/// Client for the metrics exposition endpoint
///
/// Holds its own `reqwest::Client` built with the configured timeout so the
/// fetch can never stall a cycle.
pub struct SnapshotClient {
    http: reqwest::Client,
    url: String,
}

impl SnapshotClient {
    /// Create a new SnapshotClient for the given URL and fetch timeout
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to build HTTP client for metrics fetch: {}", e))
            })?;

        Ok(Self { http, url })
    }

    /// Fetch and parse one snapshot
    ///
    /// A non-success status is fatal and carries the status code and response
    /// body upward; no partial decisions are made from a failed fetch.
    pub async fn fetch(&self) -> AppResult<Vec<Sample>> {
        let response =
            self.http
                .get(&self.url)
                .send()
                .await
                .map_err(|source| AppError::SnapshotTransport {
                    url: self.url.clone(),
                    source,
                })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| AppError::SnapshotTransport {
                url: self.url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(AppError::SnapshotFetch {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(url = %self.url, bytes = body.len(), "fetched metrics snapshot");
        parse_exposition(&body)
    }
}

/// Parse exposition text into scalar samples
///
/// Counter, gauge, and untyped samples carry scalar values. Histogram and
/// summary families are composite and cannot represent a backlog count, so
/// they are skipped rather than flattened.
pub fn parse_exposition(body: &str) -> AppResult<Vec<Sample>> {
    let lines = body
        .lines()
        .map(|line| Ok::<String, std::io::Error>(line.to_string()));
    let scrape = prometheus_parse::Scrape::parse(lines)
        .map_err(|source| AppError::SnapshotParse { source })?;

    Ok(scrape
        .samples
        .into_iter()
        .filter_map(|sample| {
            let value = scalar_value(&sample.value)?;
            Some(Sample {
                metric: sample.metric,
                labels: sample
                    .labels
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                value,
            })
        })
        .collect())
}

fn scalar_value(value: &prometheus_parse::Value) -> Option<f64> {
    match value {
        prometheus_parse::Value::Counter(v)
        | prometheus_parse::Value::Gauge(v)
        | prometheus_parse::Value::Untyped(v) => Some(*v),
        prometheus_parse::Value::Histogram(_) | prometheus_parse::Value::Summary(_) => None,
    }
}
