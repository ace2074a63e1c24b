//! Remapping plan derivation and relocation
//!
//! The [`RemappingPlan`] is the frozen product of analysis: it fixes, for
//! every row, gate, selector and constant cell of the narrow component,
//! where that element lives in the stretched region. Derivation is pure:
//! it reads the throwaway narrow circuit and never touches the caller's
//! targets. Application happens through [`move_circuit`] and
//! [`move_assignment`], which rewrite everything up front and only then
//! write, so a failure never leaves a target partially transformed.

use std::collections::{BTreeMap, HashMap};

use p3_field::{Field, AbstractField};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::circuit::{Circuit, CopyConstraint};
use crate::columns::LaneLayout;
use crate::constraints::Constraint;
use crate::error::{StretchError, StretchResult};
use crate::types::{Variable, VariableKind};
use crate::witness::Assignment;
use crate::zoning::{ZoneNode, ZoningInfo};

/// Frozen relocation tables for one wrapped-component occurrence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemappingPlan {
    layout: LaneLayout,
    zoning: ZoningInfo,
    /// Zone root → lane
    zone_mapping: BTreeMap<usize, usize>,
    /// Old row → row within its lane
    line_mapping: Vec<usize>,
    /// Resolved destination rows for constant cells referenced by copy
    /// constraints outside the priority set (collision overrides included)
    constant_remapping: BTreeMap<usize, usize>,
    /// Rows of the stretched region
    stretched_rows: usize,
}

impl RemappingPlan {
    /// Derive the plan from a zoning partition, a lane assignment and the
    /// narrow circuit's copy constraints. Read-only: the caller's targets
    /// are untouched regardless of the outcome.
    pub(crate) fn derive(
        layout: LaneLayout,
        zoning: ZoningInfo,
        packed: HashMap<usize, usize>,
        copy_constraints: &[CopyConstraint],
    ) -> StretchResult<Self> {
        let lanes = layout.lanes();
        let rows = zoning.rows();

        // The packer must have covered every zone with an in-range lane.
        let mut zone_mapping = BTreeMap::new();
        for (&zone, _) in zoning.zone_sizes() {
            match packed.get(&zone) {
                Some(&lane) if lane < lanes => {
                    zone_mapping.insert(zone, lane);
                }
                _ => return Err(StretchError::IncompletePacking { zone, lanes }),
            }
        }

        // Walk rows in order, handing each the next free slot of its lane.
        let mut line_mapping = vec![0usize; rows];
        let mut lane_counters = vec![0usize; lanes];
        for row in 0..rows {
            let lane = zone_mapping[&zoning.zone_of(ZoneNode::Row(row))];
            line_mapping[row] = lane_counters[lane];
            lane_counters[lane] += 1;
        }

        // The region must hold the fullest lane. With a balanced packing
        // this equals the largest zone.
        let stretched_rows = lane_counters.iter().copied().max().unwrap_or(0);

        // Priority rows all sit in the constant pseudo-zone, hence on one
        // lane with pairwise-distinct slots; reserve those slots first.
        let mut constant_occupied = vec![false; stretched_rows];
        for row in 0..rows {
            if zoning.constant_priority(row) {
                let slot = line_mapping[row];
                debug_assert!(!constant_occupied[slot]);
                constant_occupied[slot] = true;
            }
        }

        // Constant cells referenced by copy constraints get a resolved
        // destination: the natural slot when free, otherwise the next free
        // slot of a monotone pointer, bounded by the region size.
        let mut constant_remapping = BTreeMap::new();
        let mut free_slot = 0usize;
        for constraint in copy_constraints {
            for var in [constraint.left, constraint.right] {
                validate_endpoint(&var, rows)?;
                if var.kind != VariableKind::Constant {
                    continue;
                }
                let row = absolute_endpoint_row(&var, rows)?;
                if zoning.constant_priority(row) || constant_remapping.contains_key(&row) {
                    continue;
                }
                let natural = line_mapping[row];
                let destination = if !constant_occupied[natural] {
                    natural
                } else {
                    while free_slot < stretched_rows && constant_occupied[free_slot] {
                        free_slot += 1;
                    }
                    if free_slot == stretched_rows {
                        return Err(StretchError::ConstantRowsExhausted {
                            capacity: stretched_rows,
                        });
                    }
                    free_slot
                };
                constant_occupied[destination] = true;
                constant_remapping.insert(row, destination);
            }
        }

        info!(
            rows,
            stretched_rows,
            lanes,
            zones = zoning.zones_amount(),
            remapped_constants = constant_remapping.len(),
            "remapping plan frozen"
        );

        Ok(Self {
            layout,
            zoning,
            zone_mapping,
            line_mapping,
            constant_remapping,
            stretched_rows,
        })
    }

    /// Column geometry of the stretch
    #[inline]
    pub fn layout(&self) -> LaneLayout {
        self.layout
    }

    /// Zoning partition the plan was derived from
    #[inline]
    pub fn zoning(&self) -> &ZoningInfo {
        &self.zoning
    }

    /// Zone root → lane
    #[inline]
    pub fn zone_mapping(&self) -> &BTreeMap<usize, usize> {
        &self.zone_mapping
    }

    /// Resolved constant destinations for copy-referenced constant rows
    #[inline]
    pub fn constant_remapping(&self) -> &BTreeMap<usize, usize> {
        &self.constant_remapping
    }

    /// Rows of the narrow component
    #[inline]
    pub fn rows(&self) -> usize {
        self.line_mapping.len()
    }

    /// Rows of the stretched region
    #[inline]
    pub fn stretched_rows(&self) -> usize {
        self.stretched_rows
    }

    /// Lane holding an old row
    #[inline]
    pub fn lane_of_row(&self, row: usize) -> usize {
        self.zone_mapping[&self.zoning.zone_of(ZoneNode::Row(row))]
    }

    /// Lane holding a gate's footprint
    #[inline]
    pub fn lane_of_selector(&self, selector: usize) -> usize {
        self.zone_mapping[&self.zoning.zone_of(ZoneNode::Selector(selector))]
    }

    /// Row within its lane an old row maps to
    #[inline]
    pub fn line_of(&self, row: usize) -> usize {
        self.line_mapping[row]
    }

    /// Destination row of an old constant cell: the recorded override when
    /// one exists, the natural line mapping otherwise
    #[inline]
    pub fn constant_destination(&self, row: usize) -> usize {
        self.constant_remapping
            .get(&row)
            .copied()
            .unwrap_or_else(|| self.line_mapping[row])
    }

    /// Whether `move_circuit` copies this row's constant cell
    #[inline]
    pub fn copies_constant(&self, row: usize) -> bool {
        self.zoning.constant_priority(row) || self.constant_remapping.contains_key(&row)
    }
}

/// Row index of an absolutely-addressed witness/constant endpoint, bounds
/// checked against the component region.
fn absolute_endpoint_row(var: &Variable, rows: usize) -> StretchResult<usize> {
    let Some(row) = var.absolute_row() else {
        return Err(StretchError::RelativeCopyEndpoint { variable: *var });
    };
    if row >= rows {
        return Err(StretchError::CopyEndpointOutOfRegion {
            row: row as i64,
            rows,
        });
    }
    Ok(row)
}

fn validate_endpoint(var: &Variable, rows: usize) -> StretchResult<()> {
    match var.kind {
        VariableKind::Witness | VariableKind::Constant => {
            absolute_endpoint_row(var, rows).map(|_| ())
        }
        VariableKind::PublicInput => {
            if var.relative {
                return Err(StretchError::RelativeCopyEndpoint { variable: *var });
            }
            Ok(())
        }
        kind => Err(StretchError::UnmovableVariable { kind }),
    }
}

/// Variable relocation bound to a plan, a destination offset and the
/// adapter's public-input deconversion
pub struct Relocator<'a> {
    plan: &'a RemappingPlan,
    start_row: usize,
    deconvert: &'a dyn Fn(Variable) -> StretchResult<Variable>,
}

impl<'a> Relocator<'a> {
    pub(crate) fn new(
        plan: &'a RemappingPlan,
        start_row: usize,
        deconvert: &'a dyn Fn(Variable) -> StretchResult<Variable>,
    ) -> Self {
        Self {
            plan,
            start_row,
            deconvert,
        }
    }

    /// The plan this relocator applies
    #[inline]
    pub fn plan(&self) -> &RemappingPlan {
        self.plan
    }

    /// First row of the stretched region in the target
    #[inline]
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Relocate an absolutely-addressed variable (copy-constraint endpoints
    /// and exposed results). Public inputs are never relocated; they
    /// resolve back to the caller's own variable.
    pub fn move_var(&self, var: Variable) -> StretchResult<Variable> {
        match var.kind {
            VariableKind::Witness => {
                let row = self.endpoint_row(&var)?;
                let lane = self.plan.lane_of_row(row);
                Ok(Variable::witness(
                    self.plan.layout().lane_column(lane, var.column),
                    self.start_row + self.plan.line_of(row),
                ))
            }
            VariableKind::Constant => {
                let row = self.endpoint_row(&var)?;
                Ok(Variable {
                    kind: VariableKind::Constant,
                    column: var.column,
                    rotation: (self.start_row + self.plan.constant_destination(row)) as i32,
                    relative: false,
                })
            }
            VariableKind::PublicInput => (self.deconvert)(var),
            kind => Err(StretchError::UnmovableVariable { kind }),
        }
    }

    /// Relocate a variable inside a gate constraint, keeping its relative
    /// rotation. The gate's whole footprint shares one lane, so only the
    /// column moves.
    pub fn move_gate_var(&self, var: Variable, selector: usize) -> StretchResult<Variable> {
        match var.kind {
            VariableKind::Witness => {
                let lane = self.plan.lane_of_selector(selector);
                Ok(Variable {
                    column: self.plan.layout().lane_column(lane, var.column),
                    ..var
                })
            }
            VariableKind::Constant => Ok(var),
            kind => Err(StretchError::ForbiddenGateVariable { kind, selector }),
        }
    }

    fn endpoint_row(&self, var: &Variable) -> StretchResult<usize> {
        absolute_endpoint_row(var, self.plan.rows())
    }
}

/// Relocate the narrow circuit into the target: gates, selector
/// activations, constant cells and copy constraints. Returns the old → new
/// selector mapping. Every rewrite happens before the first write to
/// either target.
pub(crate) fn move_circuit<F: Field + AbstractField>(
    relocator: &Relocator<'_>,
    narrow_circuit: &Circuit<F>,
    narrow_assignment: &Assignment<F>,
    target_circuit: &mut Circuit<F>,
    target_assignment: &mut Assignment<F>,
) -> StretchResult<HashMap<usize, usize>> {
    let plan = relocator.plan();
    let start_row = relocator.start_row();

    let mut rewritten: Vec<Vec<Constraint<F>>> = Vec::with_capacity(narrow_circuit.gates_amount());
    for gate in narrow_circuit.gates() {
        let constraints = gate
            .constraints
            .iter()
            .map(|constraint| {
                constraint.map_variables(&mut |var| relocator.move_gate_var(var, gate.selector))
            })
            .collect::<StretchResult<Vec<_>>>()?;
        rewritten.push(constraints);
    }

    let mut moved_copies = Vec::with_capacity(narrow_circuit.copy_constraints().len());
    for constraint in narrow_circuit.copy_constraints() {
        moved_copies.push(CopyConstraint::new(
            relocator.move_var(constraint.left)?,
            relocator.move_var(constraint.right)?,
        ));
    }

    // All rewrites succeeded; commit to the targets.
    let mut gate_mapping = HashMap::with_capacity(narrow_circuit.gates_amount());
    for (gate, constraints) in narrow_circuit.gates().iter().zip(rewritten) {
        let new_selector = target_circuit.add_gate(constraints);
        gate_mapping.insert(gate.selector, new_selector);

        for row in 0..plan.rows() {
            let activation = narrow_assignment.selector(gate.selector, row);
            if !activation.is_zero() {
                target_assignment.set_selector(
                    new_selector,
                    start_row + plan.line_of(row),
                    activation,
                );
            }
        }
    }

    for row in 0..plan.rows() {
        if !plan.copies_constant(row) {
            continue;
        }
        let value = narrow_assignment.constant(0, row);
        if !value.is_zero() {
            target_assignment.set_constant(0, start_row + plan.constant_destination(row), value);
        }
    }

    for constraint in &moved_copies {
        target_circuit.add_copy_constraint(constraint.left, constraint.right);
    }

    debug!(
        gates = gate_mapping.len(),
        copies = moved_copies.len(),
        start_row,
        "circuit relocated into stretched region"
    );

    Ok(gate_mapping)
}

/// Copy the narrow witness values into their lane columns of the target.
/// Public inputs are never copied; selectors and constants are owned by
/// [`move_circuit`].
pub(crate) fn move_assignment<F: Field + AbstractField>(
    relocator: &Relocator<'_>,
    narrow_assignment: &Assignment<F>,
    target_assignment: &mut Assignment<F>,
) {
    let plan = relocator.plan();
    let start_row = relocator.start_row();

    for row in 0..plan.rows() {
        let lane = plan.lane_of_row(row);
        let destination = start_row + plan.line_of(row);
        for column in 0..narrow_assignment.witness_columns() {
            let value = narrow_assignment.witness(column, row);
            if !value.is_zero() {
                target_assignment.set_witness(
                    plan.layout().lane_column(lane, column),
                    destination,
                    value,
                );
            }
        }
    }
}
