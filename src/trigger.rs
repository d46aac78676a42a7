//! Decision-cycle entry point
//!
//! Wires the three components together: fetch one snapshot, aggregate backlog
//! by tag, resolve tags to fleets, then let the engine evaluate each pair in
//! sequence. One call runs exactly one cycle; no state is retained between
//! cycles.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::engine::{CapacityEngine, ScaleDecision};
use crate::error::AppResult;
use crate::fleet::FleetBackend;
use crate::resolve::resolve;
use crate::snapshot::SnapshotClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Summary of one completed decision cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Tags observed in the snapshot for the backlog metric.
    pub tags_observed: usize,
    /// Pairs that passed resolution (non-zero backlog and a configured fleet).
    pub targets: usize,
    /// Fleets actually scaled from zero this cycle.
    pub scaled: usize,
}

/// One-shot decision trigger
///
/// Holds the injected configuration and backend; callable any number of times,
/// concurrently safe because every decision re-checks live fleet state.
pub struct Trigger {
    config: Arc<Config>,
    snapshot: SnapshotClient,
    engine: CapacityEngine,
}

impl Trigger {
    /// Build a trigger from configuration and an injected backend
    pub fn new(config: Arc<Config>, backend: Arc<dyn FleetBackend>) -> AppResult<Self> {
        let snapshot = SnapshotClient::new(
            config.metrics.url.clone(),
            Duration::from_millis(config.metrics.timeout_ms),
        )?;

        Ok(Self {
            config,
            snapshot,
            engine: CapacityEngine::new(backend),
        })
    }

    /// Run exactly one decision cycle
    ///
    /// Any fatal condition aborts the cycle immediately and propagates to the
    /// caller; a failed cycle makes no partial guarantees beyond the mutations
    /// already issued, and the next cycle re-evaluates everything from
    /// scratch.
    pub async fn run_cycle(&self) -> AppResult<CycleReport> {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("decision_cycle", %cycle_id);

        async {
            let samples = self.snapshot.fetch().await?;
            let backlog = aggregate(&samples, &self.config.metrics.backlog_metric);
            let targets = resolve(&backlog, self.config.fleets.tag_fleets());

            let mut scaled = 0;
            for target in &targets {
                let decision = self
                    .engine
                    .ensure_min_capacity(&target.tag, &target.fleet)
                    .await?;
                if let ScaleDecision::ScaleTo(_) = decision {
                    scaled += 1;
                }
            }

            let report = CycleReport {
                tags_observed: backlog.len(),
                targets: targets.len(),
                scaled,
            };

            tracing::info!(
                tags_observed = report.tags_observed,
                targets = report.targets,
                scaled = report.scaled,
                "decision cycle complete"
            );

            Ok(report)
        }
        .instrument(span)
        .await
    }
}
