//! Assignment tables: concrete values per `(column, row)`
//!
//! An [`Assignment`] holds the four value tables of a PLONK-style circuit
//! region: witness, public-input, constant and selector columns. Columns
//! grow on write; reading a cell that was never written yields zero, so a
//! freshly created table behaves like an all-zero matrix of unbounded size.

use p3_field::{Field, AbstractField};

use crate::types::{Variable, VariableKind};

/// Value tables for one circuit region
#[derive(Clone, Debug, Default)]
pub struct Assignment<F> {
    witness: Vec<Vec<F>>,
    public_input: Vec<Vec<F>>,
    constant: Vec<Vec<F>>,
    selector: Vec<Vec<F>>,
}

impl<F: Field + AbstractField> Assignment<F> {
    /// Create an empty assignment
    pub fn new() -> Self {
        Self {
            witness: Vec::new(),
            public_input: Vec::new(),
            constant: Vec::new(),
            selector: Vec::new(),
        }
    }

    fn read(table: &[Vec<F>], column: usize, row: usize) -> F {
        table
            .get(column)
            .and_then(|col| col.get(row))
            .copied()
            .unwrap_or(F::zero())
    }

    fn write(table: &mut Vec<Vec<F>>, column: usize, row: usize, value: F) {
        if table.len() <= column {
            table.resize(column + 1, Vec::new());
        }
        let col = &mut table[column];
        if col.len() <= row {
            col.resize(row + 1, F::zero());
        }
        col[row] = value;
    }

    /// Read a witness cell
    #[inline]
    pub fn witness(&self, column: usize, row: usize) -> F {
        Self::read(&self.witness, column, row)
    }

    /// Write a witness cell
    pub fn set_witness(&mut self, column: usize, row: usize, value: F) {
        Self::write(&mut self.witness, column, row, value);
    }

    /// Read a public-input cell
    #[inline]
    pub fn public_input(&self, column: usize, row: usize) -> F {
        Self::read(&self.public_input, column, row)
    }

    /// Write a public-input cell
    pub fn set_public_input(&mut self, column: usize, row: usize, value: F) {
        Self::write(&mut self.public_input, column, row, value);
    }

    /// Read a constant cell
    #[inline]
    pub fn constant(&self, column: usize, row: usize) -> F {
        Self::read(&self.constant, column, row)
    }

    /// Write a constant cell
    pub fn set_constant(&mut self, column: usize, row: usize, value: F) {
        Self::write(&mut self.constant, column, row, value);
    }

    /// Read a selector cell; nonzero means the gate is active on that row
    #[inline]
    pub fn selector(&self, column: usize, row: usize) -> F {
        Self::read(&self.selector, column, row)
    }

    /// Write a selector cell
    pub fn set_selector(&mut self, column: usize, row: usize, value: F) {
        Self::write(&mut self.selector, column, row, value);
    }

    /// Number of witness columns written so far
    #[inline]
    pub fn witness_columns(&self) -> usize {
        self.witness.len()
    }

    /// Number of public-input columns written so far
    #[inline]
    pub fn public_input_columns(&self) -> usize {
        self.public_input.len()
    }

    /// Number of selector columns written so far
    #[inline]
    pub fn selector_columns(&self) -> usize {
        self.selector.len()
    }

    /// Highest written row index plus one, across all tables
    pub fn rows_amount(&self) -> usize {
        [
            &self.witness,
            &self.public_input,
            &self.constant,
            &self.selector,
        ]
        .iter()
        .flat_map(|table| table.iter().map(Vec::len))
        .max()
        .unwrap_or(0)
    }

    /// Resolve a variable against this assignment. Relative references are
    /// taken as offsets from `at_row`; rows before the table start read as
    /// zero.
    pub fn value_of(&self, var: &Variable, at_row: usize) -> F {
        let row = if var.relative {
            match (at_row as i64).checked_add(var.rotation as i64) {
                Some(r) if r >= 0 => r as usize,
                _ => return F::zero(),
            }
        } else {
            match var.absolute_row() {
                Some(r) => r,
                None => return F::zero(),
            }
        };
        match var.kind {
            VariableKind::Witness => self.witness(var.column, row),
            VariableKind::PublicInput => self.public_input(var.column, row),
            VariableKind::Constant => self.constant(var.column, row),
            VariableKind::Selector => self.selector(var.column, row),
            VariableKind::Uninitialized => F::zero(),
        }
    }
}
