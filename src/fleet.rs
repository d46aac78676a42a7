//! Fleet-management backend client
//!
//! The backend owns all capacity mechanics; this module is only the seam.
//! [`FleetBackend`] is the injectable trait the decision engine works
//! against, and [`HttpFleetBackend`] is the production implementation
//! speaking the backend's JSON HTTP API.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of one fleet as reported by the backend
///
/// `desired_capacity` is signed: a backend handing back an impossible
/// negative value must deserialize cleanly and take the no-action path in the
/// engine, not fail here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FleetState {
    pub name: String,
    pub desired_capacity: i64,
}

/// External fleet-management backend operations
///
/// The backend is the single source of truth for fleet state and the only
/// serialization point; implementations carry their own credentials, retries,
/// and timeouts.
#[async_trait]
pub trait FleetBackend: Send + Sync {
    /// Query the backend for fleets matching `name`
    ///
    /// Returns however many records the backend reports; cardinality and
    /// identity validation belong to the caller.
    async fn describe_fleets(&self, name: &str) -> AppResult<Vec<FleetState>>;

    /// Ask the backend to set one fleet's desired capacity
    ///
    /// Fire-and-forget: success means the backend accepted the request, not
    /// that the capacity change has taken effect.
    async fn set_desired_capacity(&self, name: &str, desired_capacity: i64) -> AppResult<()>;
}

/// Timeout for fleet API calls. More generous than the snapshot fetch since
/// describe/set are control-plane operations, but still bounded so a hung
/// backend cannot stall the cycle indefinitely.
const FLEET_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct SetDesiredCapacityRequest {
    desired_capacity: i64,
}

/// HTTP implementation of [`FleetBackend`]
///
/// Wire protocol:
/// - `GET {base}/fleets?name={name}` returns a JSON array of fleet records
/// - `PUT {base}/fleets/{name}/desired-capacity` with `{"desired_capacity": n}`
pub struct HttpFleetBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFleetBackend {
    /// Create a backend client for the given base URL
    pub fn new(base_url: String) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(FLEET_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to build HTTP client for fleet API: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    fn backend_error(fleet: &str, reason: impl std::fmt::Display) -> AppError {
        AppError::Backend {
            fleet: fleet.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl FleetBackend for HttpFleetBackend {
    async fn describe_fleets(&self, name: &str) -> AppResult<Vec<FleetState>> {
        let url = format!("{}/fleets", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| Self::backend_error(name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::backend_error(
                name,
                format!("describe returned {}", status),
            ));
        }

        response
            .json::<Vec<FleetState>>()
            .await
            .map_err(|e| Self::backend_error(name, format!("invalid describe response: {}", e)))
    }

    async fn set_desired_capacity(&self, name: &str, desired_capacity: i64) -> AppResult<()> {
        let url = format!("{}/fleets/{}/desired-capacity", self.base_url, name);
        let response = self
            .http
            .put(&url)
            .json(&SetDesiredCapacityRequest { desired_capacity })
            .send()
            .await
            .map_err(|e| Self::backend_error(name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::backend_error(
                name,
                format!("set desired capacity returned {}", status),
            ));
        }

        tracing::debug!(fleet = name, desired_capacity, "requested capacity change");
        Ok(())
    }
}
