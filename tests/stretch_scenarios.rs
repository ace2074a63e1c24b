//! End-to-end stretching scenarios
//!
//! Exercises the stretcher against synthetic components:
//! - a two-row multiply chain (one gate, rotations 0 and +1),
//! - a four-row double block (two independent gates, one reading the
//!   constant column),
//! and checks the relocation invariants: zone containment, column
//! disjointness, copy-constraint preservation, public-input transparency,
//! plan idempotence, and rejection of non-divisible widths.

use std::cell::Cell;

use p3_field::AbstractField;
use plonk_stretcher::{
    Assignment, Circuit, Component, Expression, Relocator, StretchAdapter, StretchError,
    StretchResult, Stretcher, Variable, VariableKind, F,
};

// ============================================================================
// SYNTHETIC COMPONENTS
// ============================================================================

/// Input handed to the synthetic components: one public-input cell.
struct CellInput {
    var: Variable,
}

fn value_of_input(assignment: &Assignment<F>, input: &CellInput) -> F {
    assignment.value_of(&input.var, 0)
}

/// Two-row multiply chain: one gate active on its first row, enforcing
/// `w0[r] * w1[r] = w0[r+1]`, with the input copied into `w0[r]`.
struct MulChain;

impl MulChain {
    fn constraints() -> Vec<Expression<F>> {
        let a = Expression::from(Variable::relative_witness(0, 0));
        let b = Expression::from(Variable::relative_witness(1, 0));
        let out = Expression::from(Variable::relative_witness(0, 1));
        vec![a * b - out]
    }
}

impl Component<F> for MulChain {
    type Input = CellInput;
    type Result = Variable;

    fn rows_amount(&self) -> usize {
        2
    }

    fn witness_amount(&self) -> usize {
        2
    }

    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        input: &CellInput,
        start_row: usize,
    ) -> StretchResult<Variable> {
        let selector = circuit.add_gate(Self::constraints());
        assignment.set_selector(selector, start_row, F::one());
        circuit.add_copy_constraint(input.var, Variable::witness(0, start_row));
        Ok(Variable::witness(0, start_row + 1))
    }

    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        input: &CellInput,
        start_row: usize,
    ) -> StretchResult<Variable> {
        let a = value_of_input(assignment, input);
        assignment.set_witness(0, start_row, a);
        assignment.set_witness(1, start_row, a);
        assignment.set_witness(0, start_row + 1, a * a);
        Ok(Variable::witness(0, start_row + 1))
    }
}

/// Four-row component made of two independent two-row blocks. The second
/// block's gate additionally adds the constant column at rotation 0:
/// `w0[r] * w1[r] + c[r] = w0[r+1]`.
struct DoubleBlock;

impl DoubleBlock {
    const OFFSET: u32 = 7;

    fn block_constraints(with_constant: bool) -> Vec<Expression<F>> {
        let a = Expression::from(Variable::relative_witness(0, 0));
        let b = Expression::from(Variable::relative_witness(1, 0));
        let out = Expression::from(Variable::relative_witness(0, 1));
        let mut body = a * b - out;
        if with_constant {
            body = body + Expression::from(Variable::relative_constant(0));
        }
        vec![body]
    }
}

impl Component<F> for DoubleBlock {
    type Input = CellInput;
    type Result = Variable;

    fn rows_amount(&self) -> usize {
        4
    }

    fn witness_amount(&self) -> usize {
        2
    }

    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        input: &CellInput,
        start_row: usize,
    ) -> StretchResult<Variable> {
        let first = circuit.add_gate(Self::block_constraints(false));
        let second = circuit.add_gate(Self::block_constraints(true));
        assignment.set_selector(first, start_row, F::one());
        assignment.set_selector(second, start_row + 2, F::one());
        assignment.set_constant(0, start_row + 2, F::from_canonical_u32(Self::OFFSET));

        circuit.add_copy_constraint(input.var, Variable::witness(0, start_row));
        circuit.add_copy_constraint(
            Variable::witness(0, start_row + 1),
            Variable::witness(0, start_row + 2),
        );
        Ok(Variable::witness(0, start_row + 3))
    }

    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        input: &CellInput,
        start_row: usize,
    ) -> StretchResult<Variable> {
        let a = value_of_input(assignment, input);
        assignment.set_witness(0, start_row, a);
        assignment.set_witness(1, start_row, a);
        assignment.set_witness(0, start_row + 1, a * a);

        // Second block continues from the first through the copy constraint.
        assignment.set_witness(0, start_row + 2, a * a);
        assignment.set_witness(1, start_row + 2, a);
        assignment.set_witness(
            0,
            start_row + 3,
            a * a * a + F::from_canonical_u32(Self::OFFSET),
        );
        Ok(Variable::witness(0, start_row + 3))
    }
}

/// Wrapper counting generator invocations, for plan-idempotence checks.
struct Counting<C> {
    inner: C,
    circuit_calls: Cell<usize>,
    assignment_calls: Cell<usize>,
}

impl<C> Counting<C> {
    fn new(inner: C) -> Self {
        Self {
            inner,
            circuit_calls: Cell::new(0),
            assignment_calls: Cell::new(0),
        }
    }
}

impl<C: Component<F>> Component<F> for Counting<C> {
    type Input = C::Input;
    type Result = C::Result;

    fn rows_amount(&self) -> usize {
        self.inner.rows_amount()
    }

    fn witness_amount(&self) -> usize {
        self.inner.witness_amount()
    }

    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> StretchResult<Self::Result> {
        self.circuit_calls.set(self.circuit_calls.get() + 1);
        self.inner
            .generate_circuit(circuit, assignment, input, start_row)
    }

    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        input: &Self::Input,
        start_row: usize,
    ) -> StretchResult<Self::Result> {
        self.assignment_calls.set(self.assignment_calls.get() + 1);
        self.inner.generate_assignments(assignment, input, start_row)
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Adapter routing one outer cell through the component's public-input
/// column, and relocating the exposed result variable.
#[derive(Debug)]
struct VarAdapter;

impl<C> StretchAdapter<F, C> for VarAdapter
where
    C: Component<F, Input = CellInput, Result = Variable>,
{
    type OuterInput = Variable;
    type OuterResult = Variable;

    fn convert_input(
        &self,
        outer: &Variable,
        outer_assignment: &Assignment<F>,
        inner_assignment: &mut Assignment<F>,
    ) -> StretchResult<CellInput> {
        let value = outer_assignment.value_of(outer, 0);
        inner_assignment.set_public_input(0, 0, value);
        Ok(CellInput {
            var: Variable::public_input(0, 0),
        })
    }

    fn deconvert_var(&self, outer: &Variable, var: Variable) -> StretchResult<Variable> {
        if var == Variable::public_input(0, 0) {
            Ok(*outer)
        } else {
            Err(StretchError::UnmovableVariable { kind: var.kind })
        }
    }

    fn convert_result(
        &self,
        relocator: &Relocator<'_>,
        inner: Variable,
        _outer: &Variable,
    ) -> StretchResult<Variable> {
        relocator.move_var(inner)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Outer assignment with the input value in a public-input cell.
fn outer_with_input(value: u32) -> (Assignment<F>, Variable) {
    let mut assignment: Assignment<F> = Assignment::new();
    let var = Variable::public_input(0, 0);
    assignment.set_public_input(0, 0, F::from_canonical_u32(value));
    (assignment, var)
}

/// Every constraint of every gate must vanish on every row where the
/// gate's selector is active.
fn assert_all_gates_satisfied(circuit: &Circuit<F>, assignment: &Assignment<F>) {
    for gate in circuit.gates() {
        for row in 0..assignment.rows_amount() {
            if assignment.selector(gate.selector, row) == F::zero() {
                continue;
            }
            for (index, constraint) in gate.constraints.iter().enumerate() {
                assert_eq!(
                    constraint.evaluate(assignment, row),
                    F::zero(),
                    "gate {} constraint {} not satisfied at row {}",
                    gate.selector,
                    index,
                    row
                );
            }
        }
    }
}

/// Columns referenced by the witness leaves of a gate's constraints.
fn gate_witness_columns(circuit: &Circuit<F>, selector: usize) -> Vec<usize> {
    let mut columns = Vec::new();
    for constraint in &circuit.gates()[selector].constraints {
        constraint.for_each_variable(&mut |var| {
            if var.kind == VariableKind::Witness {
                columns.push(var.column);
            }
        });
    }
    columns.sort_unstable();
    columns.dedup();
    columns
}

// ============================================================================
// SCENARIO A: one gate, two rows, doubled width
// ============================================================================

mod scenario_a {
    use super::*;

    #[test]
    fn test_zone_layout_and_result() {
        let stretcher = Stretcher::new(MulChain, VarAdapter, 4).unwrap();
        let (mut assignment, input) = outer_with_input(3);
        let mut circuit: Circuit<F> = Circuit::new();

        let result = stretcher
            .generate_circuit(&mut circuit, &mut assignment, &input, 0)
            .unwrap();
        stretcher
            .generate_assignments(&mut assignment, &input, 0)
            .unwrap();

        // One two-row zone on one lane; the stretched region still has two
        // rows.
        let plan = stretcher.plan().unwrap();
        assert_eq!(plan.stretched_rows(), 2);
        assert_eq!(plan.lane_of_row(0), plan.lane_of_row(1));

        // The zone landed on lane 0, so columns are unchanged.
        assert_eq!(gate_witness_columns(&circuit, 0), vec![0, 1]);
        assert_eq!(result, Variable::witness(0, 1));

        // 3 * 3 = 9 lands in the output cell.
        assert_eq!(assignment.witness(0, 1), F::from_canonical_u32(9));
        assert_all_gates_satisfied(&circuit, &assignment);
    }

    #[test]
    fn test_public_input_endpoint_survives_untouched() {
        let stretcher = Stretcher::new(MulChain, VarAdapter, 4).unwrap();
        let (mut assignment, input) = outer_with_input(5);
        let mut circuit: Circuit<F> = Circuit::new();

        stretcher
            .generate_circuit(&mut circuit, &mut assignment, &input, 0)
            .unwrap();

        assert_eq!(circuit.copy_constraints().len(), 1);
        let copy = circuit.copy_constraints()[0];
        assert!(copy.connects(input, Variable::witness(0, 0)));
    }

    #[test]
    fn test_single_lane_stretch_is_identity_geometry() {
        let stretcher = Stretcher::new(MulChain, VarAdapter, 2).unwrap();
        let (mut assignment, input) = outer_with_input(4);
        let mut circuit: Circuit<F> = Circuit::new();

        stretcher
            .generate_circuit(&mut circuit, &mut assignment, &input, 0)
            .unwrap();
        stretcher
            .generate_assignments(&mut assignment, &input, 0)
            .unwrap();

        assert_eq!(stretcher.layout().lanes(), 1);
        assert_eq!(stretcher.stretched_rows(), Some(2));
        assert_eq!(gate_witness_columns(&circuit, 0), vec![0, 1]);
        assert_all_gates_satisfied(&circuit, &assignment);
    }
}

// ============================================================================
// SCENARIO B: non-divisible width
// ============================================================================

mod scenario_b {
    use super::*;

    /// Three-column stub; never generates anything.
    #[derive(Debug)]
    struct ThreeWide;

    impl Component<F> for ThreeWide {
        type Input = CellInput;
        type Result = Variable;

        fn rows_amount(&self) -> usize {
            1
        }

        fn witness_amount(&self) -> usize {
            3
        }

        fn generate_circuit(
            &self,
            _circuit: &mut Circuit<F>,
            _assignment: &mut Assignment<F>,
            _input: &CellInput,
            start_row: usize,
        ) -> StretchResult<Variable> {
            Ok(Variable::witness(0, start_row))
        }

        fn generate_assignments(
            &self,
            _assignment: &mut Assignment<F>,
            _input: &CellInput,
            start_row: usize,
        ) -> StretchResult<Variable> {
            Ok(Variable::witness(0, start_row))
        }
    }

    #[test]
    fn test_width_seven_over_three_rejected_before_any_mutation() {
        let err = Stretcher::new(ThreeWide, VarAdapter, 7).unwrap_err();
        assert_eq!(
            err,
            StretchError::WidthNotDivisible {
                base: 3,
                stretched: 7
            }
        );
    }
}

// ============================================================================
// DOUBLE BLOCK: two lanes, constants, copy chains
// ============================================================================

mod double_block {
    use super::*;

    const START_ROW: usize = 5;

    fn stretch() -> (Stretcher<F, DoubleBlock, VarAdapter>, Circuit<F>, Assignment<F>, Variable, Variable) {
        let stretcher = Stretcher::new(DoubleBlock, VarAdapter, 4).unwrap();
        let (mut assignment, input) = outer_with_input(2);
        let mut circuit: Circuit<F> = Circuit::new();

        let result = stretcher
            .generate_circuit(&mut circuit, &mut assignment, &input, START_ROW)
            .unwrap();
        stretcher
            .generate_assignments(&mut assignment, &input, START_ROW)
            .unwrap();
        (stretcher, circuit, assignment, input, result)
    }

    #[test]
    fn test_blocks_land_on_disjoint_lanes() {
        let (stretcher, circuit, _, _, _) = stretch();

        let plan = stretcher.plan().unwrap();
        assert_eq!(plan.stretched_rows(), 2);
        assert_ne!(plan.lane_of_row(0), plan.lane_of_row(2));

        // Each gate reads witness columns of exactly one lane.
        let first = gate_witness_columns(&circuit, 0);
        let second = gate_witness_columns(&circuit, 1);
        assert_eq!(first, vec![0, 1]);
        assert_eq!(second, vec![2, 3]);
    }

    #[test]
    fn test_stretched_constraints_hold() {
        let (_, circuit, assignment, _, _) = stretch();
        assert_all_gates_satisfied(&circuit, &assignment);
    }

    #[test]
    fn test_constant_lands_once_at_mapped_row() {
        let (stretcher, _, assignment, _, _) = stretch();
        let plan = stretcher.plan().unwrap();

        // Row 2 carried the constant; its lane slot is 0.
        assert!(plan.zoning().constant_priority(2));
        let destination = START_ROW + plan.constant_destination(2);
        assert_eq!(
            assignment.constant(0, destination),
            F::from_canonical_u32(DoubleBlock::OFFSET)
        );

        // No other region row received a constant.
        for row in START_ROW..START_ROW + plan.stretched_rows() {
            if row != destination {
                assert_eq!(assignment.constant(0, row), F::zero());
            }
        }
    }

    #[test]
    fn test_copy_constraints_preserved() {
        let (_, circuit, assignment, input, _) = stretch();

        // Input copy plus the inter-block chain.
        assert_eq!(circuit.copy_constraints().len(), 2);
        for copy in circuit.copy_constraints() {
            let left = assignment.value_of(&copy.left, 0);
            let right = assignment.value_of(&copy.right, 0);
            assert_eq!(left, right, "copy endpoints diverge: {:?}", copy);
        }

        // The input endpoint is the caller's own variable, not a relocation.
        assert!(circuit
            .copy_constraints()
            .iter()
            .any(|copy| copy.left == input || copy.right == input));
    }

    #[test]
    fn test_result_cell_holds_chain_value() {
        let (_, _, assignment, _, result) = stretch();

        // 2^3 + 7 = 15.
        assert_eq!(result.kind, VariableKind::Witness);
        assert_eq!(
            assignment.value_of(&result, 0),
            F::from_canonical_u32(15)
        );
    }

    #[test]
    fn test_witness_stays_inside_region_rows() {
        let (stretcher, _, assignment, _, _) = stretch();
        let plan = stretcher.plan().unwrap();

        for column in 0..stretcher.layout().stretched_width() {
            for row in 0..assignment.rows_amount() {
                if assignment.witness(column, row) != F::zero() {
                    assert!(row >= START_ROW);
                    assert!(row < START_ROW + plan.stretched_rows());
                }
            }
        }
    }
}

// ============================================================================
// PLAN IDEMPOTENCE
// ============================================================================

mod idempotence {
    use super::*;

    #[test]
    fn test_plan_computed_once_and_reused() {
        let stretcher =
            Stretcher::new(Counting::new(DoubleBlock), VarAdapter, 4).unwrap();
        let (mut assignment, input) = outer_with_input(2);
        let mut circuit: Circuit<F> = Circuit::new();

        assert_eq!(stretcher.component().circuit_calls.get(), 0);

        // First call: one replay for analysis (both generators) plus the
        // entry point's own circuit replay.
        stretcher
            .generate_circuit(&mut circuit, &mut assignment, &input, 0)
            .unwrap();
        assert_eq!(stretcher.component().circuit_calls.get(), 2);
        assert_eq!(stretcher.component().assignment_calls.get(), 1);

        // Later calls replay the component but never re-analyze.
        stretcher
            .generate_assignments(&mut assignment, &input, 0)
            .unwrap();
        assert_eq!(stretcher.component().circuit_calls.get(), 3);
        assert_eq!(stretcher.component().assignment_calls.get(), 2);

        stretcher
            .generate_assignments(&mut assignment, &input, 0)
            .unwrap();
        assert_eq!(stretcher.component().circuit_calls.get(), 4);
        assert_eq!(stretcher.component().assignment_calls.get(), 3);
    }
}
