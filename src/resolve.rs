//! Tag-to-fleet resolution
//!
//! Pure data transformation between aggregation and the decision engine: out
//! of the observed backlog, keep only tags that both have work waiting and
//! have a configured fleet.

use std::collections::HashMap;

/// A (tag, fleet) pair the decision engine should evaluate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleTarget {
    pub tag: String,
    pub fleet: String,
}

/// Resolve backlogged tags to their fleets
///
/// Tags with backlog exactly 0 are skipped (nothing to do), as are tags with
/// no entry in the mapping (nothing to scale). Processing order carries no
/// meaning; the output is sorted by tag purely for stable logs.
pub fn resolve(
    backlog: &HashMap<String, f64>,
    mapping: &HashMap<String, String>,
) -> Vec<ScaleTarget> {
    let mut targets: Vec<ScaleTarget> = backlog
        .iter()
        .filter(|(_, waiting)| **waiting != 0.0)
        .filter_map(|(tag, _)| {
            mapping.get(tag).map(|fleet| ScaleTarget {
                tag: tag.clone(),
                fleet: fleet.clone(),
            })
        })
        .collect();

    targets.sort_by(|a, b| a.tag.cmp(&b.tag));
    targets
}
