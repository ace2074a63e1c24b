//! Zoning analysis: which rows must stay together
//!
//! A gate constraint may read the row above or below its active row, so
//! rows connected through such a footprint cannot be split across lanes.
//! The analyzer partitions the component's rows into connectivity classes
//! ("zones") with a disjoint-set forest over `R + S + 1` nodes: one per
//! row, one synthetic node per gate (so a gate's whole footprint lands in
//! one zone), and a single sentinel for the constant column. Constant
//! reads are not zoned precisely: every constant-touched row is pulled
//! into the one sentinel zone, which therefore lands on a single lane.
//!
//! Rows only ever merge with their direct neighbours, so every
//! witness-connected zone is a contiguous row interval; placing such an
//! interval on one lane keeps its rows at consecutive lane slots, which is
//! what preserves the `-1..=1` relative offsets after relocation.

mod dsu;

use std::collections::BTreeMap;

use p3_field::{Field, AbstractField};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit::Circuit;
use crate::constraints::Gate;
use crate::error::{StretchError, StretchResult};
use crate::types::{VariableKind, ROTATIONS};
use crate::witness::Assignment;

pub use dsu::DisjointSet;

/// A node of the zoning partition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneNode {
    /// One row of the component region
    Row(usize),
    /// Synthetic node tying a gate's footprint together
    Selector(usize),
    /// Sentinel for the single constant column
    ConstantZone,
}

/// Which rotations of a gate's window touch witness or constant cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateFootprint {
    /// Witness occurrence per rotation `-1`, `0`, `+1`
    pub witness: [bool; 3],
    /// Constant occurrence per rotation `-1`, `0`, `+1`
    pub constant: [bool; 3],
}

#[inline]
fn rotation_slot(rotation: i32) -> Option<usize> {
    match rotation {
        -1 => Some(0),
        0 => Some(1),
        1 => Some(2),
        _ => None,
    }
}

/// Scan a gate's constraints and record its footprint over the rotation
/// window. Any variable outside the witness/constant kinds, any absolute
/// reference, and any rotation outside the window is a structural
/// violation.
pub fn gate_footprint<F: Field + AbstractField>(gate: &Gate<F>) -> StretchResult<GateFootprint> {
    let mut footprint = GateFootprint::default();
    let mut violation: Option<StretchError> = None;

    for constraint in &gate.constraints {
        constraint.for_each_variable(&mut |var| {
            if violation.is_some() {
                return;
            }
            match var.kind {
                VariableKind::Witness | VariableKind::Constant => {
                    if !var.relative {
                        violation = Some(StretchError::AbsoluteGateVariable {
                            selector: gate.selector,
                        });
                        return;
                    }
                    let Some(slot) = rotation_slot(var.rotation) else {
                        violation = Some(StretchError::RotationOutOfWindow {
                            selector: gate.selector,
                            rotation: var.rotation,
                        });
                        return;
                    };
                    if var.kind == VariableKind::Witness {
                        footprint.witness[slot] = true;
                    } else {
                        footprint.constant[slot] = true;
                    }
                }
                kind => {
                    violation = Some(StretchError::ForbiddenGateVariable {
                        kind,
                        selector: gate.selector,
                    });
                }
            }
        });
    }

    match violation {
        Some(err) => Err(err),
        None => Ok(footprint),
    }
}

/// Result of the zoning analysis: resolved partition, per-zone row counts
/// and constant-priority flags. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoningInfo {
    rows: usize,
    selectors: usize,
    /// Resolved root per flat node
    roots: Vec<usize>,
    /// Root → number of rows in the zone (synthetic nodes count zero)
    zone_sizes: BTreeMap<usize, usize>,
    /// Rows whose constant cell must land at its mapped position
    constant_priority: Vec<bool>,
}

impl ZoningInfo {
    #[inline]
    fn flat(&self, node: ZoneNode) -> usize {
        match node {
            ZoneNode::Row(row) => {
                debug_assert!(row < self.rows);
                row
            }
            ZoneNode::Selector(selector) => {
                debug_assert!(selector < self.selectors);
                self.rows + selector
            }
            ZoneNode::ConstantZone => self.rows + self.selectors,
        }
    }

    /// Zone (root id) containing a node
    #[inline]
    pub fn zone_of(&self, node: ZoneNode) -> usize {
        self.roots[self.flat(node)]
    }

    /// Rows of the analyzed region
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of distinct zones
    #[inline]
    pub fn zones_amount(&self) -> usize {
        self.zone_sizes.len()
    }

    /// Root → row count, in deterministic root order
    #[inline]
    pub fn zone_sizes(&self) -> &BTreeMap<usize, usize> {
        &self.zone_sizes
    }

    /// Whether this row's constant cell must land at its mapped position
    #[inline]
    pub fn constant_priority(&self, row: usize) -> bool {
        self.constant_priority[row]
    }
}

/// Partition the component's `rows` rows into zones, driven by the gates of
/// `circuit` and their selector activations in `assignment`.
pub fn analyze<F: Field + AbstractField>(
    circuit: &Circuit<F>,
    assignment: &Assignment<F>,
    rows: usize,
) -> StretchResult<ZoningInfo> {
    let selectors = circuit.gates_amount();
    let node_count = rows + selectors + 1;
    let constant_node = rows + selectors;

    let mut dsu = DisjointSet::new(node_count);
    let mut constant_priority = vec![false; rows];

    for gate in circuit.gates() {
        let footprint = gate_footprint(gate)?;
        let selector_node = rows + gate.selector;

        for row in 0..rows {
            if assignment.selector(gate.selector, row).is_zero() {
                continue;
            }
            for (slot, rotation) in ROTATIONS.iter().enumerate() {
                let touched = (row as i64) + (*rotation as i64);
                if footprint.witness[slot] {
                    let target = checked_row(touched, rows, gate.selector)?;
                    dsu.union(row, target);
                    dsu.union(target, selector_node);
                }
                if footprint.constant[slot] {
                    let target = checked_row(touched, rows, gate.selector)?;
                    dsu.union(target, constant_node);
                    constant_priority[target] = true;
                }
            }
        }
    }

    let roots: Vec<usize> = (0..node_count).map(|node| dsu.find(node)).collect();
    let mut zone_sizes = BTreeMap::new();
    for &root in &roots {
        zone_sizes.entry(root).or_insert(0usize);
    }
    for row in 0..rows {
        *zone_sizes.entry(roots[row]).or_insert(0) += 1;
    }

    debug!(
        rows,
        selectors,
        zones = zone_sizes.len(),
        "zoning analysis complete"
    );

    Ok(ZoningInfo {
        rows,
        selectors,
        roots,
        zone_sizes,
        constant_priority,
    })
}

#[inline]
fn checked_row(row: i64, rows: usize, selector: usize) -> StretchResult<usize> {
    if row < 0 || row >= rows as i64 {
        return Err(StretchError::RowOutOfRegion {
            selector,
            row,
            rows,
        });
    }
    Ok(row as usize)
}
