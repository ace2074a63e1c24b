//! Circuit structure: gates plus copy constraints
//!
//! A [`Circuit`] owns the symbolic side of a region: gates with their
//! constraints, and copy constraints asserting cell equality. Selector
//! indices are allocated here: `add_gate` returns the index of the
//! activation column the gate listens to.

use crate::constraints::{Constraint, Gate};
use crate::types::Variable;

/// An unordered pair of absolutely-addressed cells asserted equal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyConstraint {
    pub left: Variable,
    pub right: Variable,
}

impl CopyConstraint {
    /// Assert two cells equal
    pub fn new(left: Variable, right: Variable) -> Self {
        Self { left, right }
    }

    /// Whether this constraint connects the given pair, in either order
    pub fn connects(&self, a: Variable, b: Variable) -> bool {
        (self.left == a && self.right == b) || (self.left == b && self.right == a)
    }
}

/// Gates and copy constraints of one circuit region
#[derive(Clone, Debug, Default)]
pub struct Circuit<F> {
    gates: Vec<Gate<F>>,
    copy_constraints: Vec<CopyConstraint>,
}

impl<F> Circuit<F> {
    /// Create an empty circuit
    pub fn new() -> Self {
        Self {
            gates: Vec::new(),
            copy_constraints: Vec::new(),
        }
    }

    /// Register a gate and return its selector index
    pub fn add_gate(&mut self, constraints: Vec<Constraint<F>>) -> usize {
        let selector = self.gates.len();
        self.gates.push(Gate {
            selector,
            constraints,
        });
        selector
    }

    /// Registered gates, in selector order
    #[inline]
    pub fn gates(&self) -> &[Gate<F>] {
        &self.gates
    }

    /// Number of registered gates
    #[inline]
    pub fn gates_amount(&self) -> usize {
        self.gates.len()
    }

    /// Assert that two cells hold equal values
    pub fn add_copy_constraint(&mut self, left: Variable, right: Variable) {
        self.copy_constraints.push(CopyConstraint::new(left, right));
    }

    /// Registered copy constraints, in insertion order
    #[inline]
    pub fn copy_constraints(&self) -> &[CopyConstraint] {
        &self.copy_constraints
    }
}
