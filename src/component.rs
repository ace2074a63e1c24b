//! External interfaces: the wrapped component and its adapters
//!
//! A [`Component`] is anything the stretcher can wrap: it declares its
//! geometry and knows how to emit its own gates and witness values into a
//! circuit region. A [`StretchAdapter`] bridges the caller's types to the
//! component's: it carries outer input values into a fresh inner
//! public-input column, resolves inner public-input variables back to the
//! caller's own variables, and adapts the component's result to the outer
//! world. The set of wrapped components is closed per build, so both are
//! resolved at compile time; no runtime polymorphism is involved.

use p3_field::Field;

use crate::circuit::Circuit;
use crate::error::StretchResult;
use crate::remap::Relocator;
use crate::types::Variable;
use crate::witness::Assignment;

/// A fixed-width circuit component the stretcher can wrap
///
/// Implementations guarantee:
/// - exactly `rows_amount()` rows starting at `start_row` are used,
/// - gate constraints only use rotations in `-1..=1`,
/// - results are exposed as witness, constant or public-input variables.
pub trait Component<F: Field> {
    /// Input handed to the generators
    type Input;
    /// Value the generators expose to the caller
    type Result;

    /// Rows the component occupies
    fn rows_amount(&self) -> usize;

    /// Witness columns the component occupies
    fn witness_amount(&self) -> usize;

    /// Emit gates, selector activations, constants and copy constraints
    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> StretchResult<Self::Result>;

    /// Fill in the witness values
    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> StretchResult<Self::Result>;
}

/// Conversion layer between a caller's types and a wrapped component's
pub trait StretchAdapter<F: Field, C: Component<F>> {
    /// The caller-side input type
    type OuterInput;
    /// The caller-side result type
    type OuterResult;

    /// Build the component's input from the outer one, copying the outer
    /// values through a fresh public-input column of `inner_assignment`
    fn convert_input(
        &self,
        outer: &Self::OuterInput,
        outer_assignment: &Assignment<F>,
        inner_assignment: &mut Assignment<F>,
    ) -> StretchResult<C::Input>;

    /// Resolve an inner public-input variable back to the caller's own
    /// variable. Inverse of the copy performed by [`convert_input`].
    ///
    /// [`convert_input`]: StretchAdapter::convert_input
    fn deconvert_var(&self, outer: &Self::OuterInput, var: Variable) -> StretchResult<Variable>;

    /// Adapt the component's result to the outer world, relocating every
    /// exposed variable through the relocator
    fn convert_result(
        &self,
        relocator: &Relocator<'_>,
        inner: C::Result,
        outer: &Self::OuterInput,
    ) -> StretchResult<Self::OuterResult>;
}
