//! Snapshot aggregation
//!
//! Folds the raw metrics snapshot into one backlog figure per worker tag.
//! Only the designated backlog gauge is considered; every other metric in the
//! snapshot is ignored. Jobs that require no particular worker capability
//! report an empty `workerTags` label, and those aggregate under the literal
//! tag "none"; that is a legitimate, expected case, not a data error.

use crate::snapshot::Sample;
use std::collections::HashMap;

/// Gauge representing "steps waiting for a worker", per the cluster's
/// exposition format.
pub const DEFAULT_BACKLOG_METRIC: &str = "concourse_steps_waiting";

/// Label carrying the worker-capability tag on each sample.
pub const TAG_LABEL: &str = "workerTags";

/// Tag that untagged backlog aggregates under.
pub const UNTAGGED_TAG: &str = "none";

/// Sum backlog values by worker tag
///
/// Summation (not max, not count) is what makes the result mean "total items
/// waiting for this capability across all workers offering it". Tags absent
/// from the snapshot are absent from the result, never present with value 0.
pub fn aggregate(samples: &[Sample], backlog_metric: &str) -> HashMap<String, f64> {
    let mut backlog: HashMap<String, f64> = HashMap::new();

    for sample in samples {
        if sample.metric != backlog_metric {
            continue;
        }

        let tag = match sample.labels.get(TAG_LABEL) {
            Some(tag) if !tag.is_empty() => tag.as_str(),
            _ => UNTAGGED_TAG,
        };

        *backlog.entry(tag.to_string()).or_insert(0.0) += sample.value;
    }

    backlog
}
