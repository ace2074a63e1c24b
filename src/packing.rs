//! Lane assignment for zones
//!
//! Distributing zones over `k` lanes while minimising the tallest lane is
//! the identical-machines makespan problem, NP-hard in general. The packer
//! is a pluggable heuristic behind the [`LanePacker`] trait. The stretcher
//! only needs the mapping to be *complete*: packing quality affects the
//! stretched row count, never soundness.

use std::collections::HashMap;

/// Assigns every zone to one lane
pub trait LanePacker {
    /// Map each `(zone, size)` entry to a lane in `[0, lanes)`, roughly
    /// balancing total size per lane. Every zone must appear in the result.
    fn pack(&self, zones: &[(usize, usize)], lanes: usize) -> HashMap<usize, usize>;
}

/// Longest-processing-time list scheduling: sort zones by decreasing size,
/// give each to the currently least-loaded lane. Guarantees a makespan
/// within 4/3 of optimal.
#[derive(Clone, Copy, Debug, Default)]
pub struct LptPacker;

impl LanePacker for LptPacker {
    fn pack(&self, zones: &[(usize, usize)], lanes: usize) -> HashMap<usize, usize> {
        debug_assert!(lanes > 0);

        let mut order: Vec<(usize, usize)> = zones.to_vec();
        // Ties broken by zone id so the schedule is deterministic.
        order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut load = vec![0usize; lanes];
        let mut mapping = HashMap::with_capacity(zones.len());
        for (zone, size) in order {
            let lane = load
                .iter()
                .enumerate()
                .min_by_key(|(lane, load)| (**load, *lane))
                .map(|(lane, _)| lane)
                .unwrap_or(0);
            mapping.insert(zone, lane);
            load[lane] += size;
        }
        mapping
    }
}
