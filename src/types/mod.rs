//! Cell references for PLONK-style tables
//!
//! A [`Variable`] names one cell of a circuit table: the role the cell plays
//! (witness, selector, constant or public input), a column within that
//! role's table, and a row offset. Gate constraints reference cells
//! *relatively*, as a signed offset from the gate's active row restricted to
//! the window `-1..=1`, while copy constraints and exposed results
//! reference cells *absolutely* (the offset is the row index itself).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative rotations a gate constraint may use, in scan order
pub const ROTATIONS: [i32; 3] = [-1, 0, 1];

/// The role a referenced cell plays in the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// Per-occurrence private values
    Witness,
    /// Values shared with the caller through a dedicated column
    PublicInput,
    /// Values fixed at circuit-construction time
    Constant,
    /// Gate activation flags; one column per gate
    Selector,
    /// Placeholder before allocation
    Uninitialized,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableKind::Witness => "witness",
            VariableKind::PublicInput => "public input",
            VariableKind::Constant => "constant",
            VariableKind::Selector => "selector",
            VariableKind::Uninitialized => "uninitialized",
        };
        f.write_str(name)
    }
}

/// A reference to one cell of a circuit table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    /// Which table the cell lives in
    pub kind: VariableKind,
    /// Column within that table
    pub column: usize,
    /// Row offset: relative to a gate's active row when `relative` is set,
    /// an absolute row index otherwise
    pub rotation: i32,
    /// Interpretation of `rotation`
    pub relative: bool,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            kind: VariableKind::Uninitialized,
            column: 0,
            rotation: 0,
            relative: false,
        }
    }
}

impl Variable {
    /// Absolute witness cell reference
    pub fn witness(column: usize, row: usize) -> Self {
        Self {
            kind: VariableKind::Witness,
            column,
            rotation: row as i32,
            relative: false,
        }
    }

    /// Witness reference relative to a gate's active row
    pub fn relative_witness(column: usize, rotation: i32) -> Self {
        Self {
            kind: VariableKind::Witness,
            column,
            rotation,
            relative: true,
        }
    }

    /// Absolute constant cell reference (single constant column)
    pub fn constant(row: usize) -> Self {
        Self {
            kind: VariableKind::Constant,
            column: 0,
            rotation: row as i32,
            relative: false,
        }
    }

    /// Constant reference relative to a gate's active row
    pub fn relative_constant(rotation: i32) -> Self {
        Self {
            kind: VariableKind::Constant,
            column: 0,
            rotation,
            relative: true,
        }
    }

    /// Absolute public-input cell reference
    pub fn public_input(column: usize, row: usize) -> Self {
        Self {
            kind: VariableKind::PublicInput,
            column,
            rotation: row as i32,
            relative: false,
        }
    }

    /// The row index of an absolutely-addressed variable, or `None` for
    /// relative references
    #[inline]
    pub fn absolute_row(&self) -> Option<usize> {
        if self.relative || self.rotation < 0 {
            None
        } else {
            Some(self.rotation as usize)
        }
    }
}
