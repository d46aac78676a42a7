//! Capacity decision engine
//!
//! For each resolved (tag, fleet) pair, reads the fleet's live state from the
//! backend, validates it, and issues a single idempotent "ensure one worker"
//! mutation only when the fleet is scaled to exactly zero. Repeated
//! invocations are safe by construction: the zero-capacity check against live
//! state is the idempotency guard, and no decision history is kept locally.

use crate::error::{AppError, AppResult};
use crate::fleet::FleetBackend;
use std::sync::Arc;

/// Outcome for a single (tag, fleet) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleDecision {
    /// A capacity request was issued for the given target count.
    ScaleTo(i64),
    /// The fleet already has capacity (or reports an impossible value); leave
    /// it alone.
    NoChange,
}

/// The decision engine evaluates backlogged fleets and breaks zero-capacity
/// deadlocks.
pub struct CapacityEngine {
    backend: Arc<dyn FleetBackend>,
}

impl CapacityEngine {
    /// Create a new engine over an injected backend
    pub fn new(backend: Arc<dyn FleetBackend>) -> Self {
        Self { backend }
    }

    /// Ensure the fleet for a backlogged tag has at least one worker
    ///
    /// The describe response must contain exactly one record, and that
    /// record's name must equal the requested identifier. Anything else means
    /// stale or ambiguous configuration (a renamed, duplicated, or deleted
    /// fleet) and is an error rather than a guess. Capacity is only ever
    /// raised from 0 to 1: this engine never sizes a working fleet.
    pub async fn ensure_min_capacity(&self, tag: &str, fleet_id: &str) -> AppResult<ScaleDecision> {
        let records = self.backend.describe_fleets(fleet_id).await?;

        if records.len() != 1 {
            return Err(AppError::FleetCardinality {
                fleet: fleet_id.to_string(),
                count: records.len(),
            });
        }

        let fleet = &records[0];
        if fleet.name != fleet_id {
            return Err(AppError::FleetIdentityMismatch {
                requested: fleet_id.to_string(),
                returned: fleet.name.clone(),
            });
        }

        if fleet.desired_capacity == 0 {
            self.backend.set_desired_capacity(fleet_id, 1).await?;
            tracing::info!(
                tag,
                fleet = fleet_id,
                "backlog waiting on a zero-capacity fleet; launched first worker"
            );
            Ok(ScaleDecision::ScaleTo(1))
        } else {
            tracing::debug!(
                tag,
                fleet = fleet_id,
                desired_capacity = fleet.desired_capacity,
                "fleet already has capacity"
            );
            Ok(ScaleDecision::NoChange)
        }
    }
}
