//! Benchmarks for component stretching

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use p3_field::AbstractField;
use plonk_stretcher::{
    Assignment, Circuit, Component, Expression, Relocator, StretchAdapter, StretchResult,
    Stretcher, Variable, F,
};

/// Synthetic component made of `blocks` independent two-row blocks, one
/// gate each, enforcing `w0[r] * w1[r] = w0[r+1]`.
struct ParallelBlocks {
    blocks: usize,
}

impl ParallelBlocks {
    fn block_constraints() -> Vec<Expression<F>> {
        let a = Expression::from(Variable::relative_witness(0, 0));
        let b = Expression::from(Variable::relative_witness(1, 0));
        let out = Expression::from(Variable::relative_witness(0, 1));
        vec![a * b - out]
    }
}

impl Component<F> for ParallelBlocks {
    type Input = ();
    type Result = ();

    fn rows_amount(&self) -> usize {
        2 * self.blocks
    }

    fn witness_amount(&self) -> usize {
        2
    }

    fn generate_circuit(
        &self,
        circuit: &mut Circuit<F>,
        assignment: &mut Assignment<F>,
        _input: &(),
        start_row: usize,
    ) -> StretchResult<()> {
        for block in 0..self.blocks {
            let selector = circuit.add_gate(Self::block_constraints());
            assignment.set_selector(selector, start_row + 2 * block, F::one());
        }
        Ok(())
    }

    fn generate_assignments(
        &self,
        assignment: &mut Assignment<F>,
        _input: &(),
        start_row: usize,
    ) -> StretchResult<()> {
        for block in 0..self.blocks {
            let row = start_row + 2 * block;
            let a = F::from_canonical_u32(block as u32 + 2);
            assignment.set_witness(0, row, a);
            assignment.set_witness(1, row, a);
            assignment.set_witness(0, row + 1, a * a);
        }
        Ok(())
    }
}

struct UnitAdapter;

impl StretchAdapter<F, ParallelBlocks> for UnitAdapter {
    type OuterInput = ();
    type OuterResult = ();

    fn convert_input(
        &self,
        _outer: &(),
        _outer_assignment: &Assignment<F>,
        _inner_assignment: &mut Assignment<F>,
    ) -> StretchResult<()> {
        Ok(())
    }

    fn deconvert_var(&self, _outer: &(), var: Variable) -> StretchResult<Variable> {
        Ok(var)
    }

    fn convert_result(
        &self,
        _relocator: &Relocator<'_>,
        _inner: (),
        _outer: &(),
    ) -> StretchResult<()> {
        Ok(())
    }
}

fn bench_generate_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_circuit");

    for blocks in [8, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &blocks, |b, &blocks| {
            b.iter(|| {
                // Plan computation is lazy, so each iteration builds a fresh
                // stretcher to measure analysis plus relocation.
                let stretcher =
                    Stretcher::new(ParallelBlocks { blocks }, UnitAdapter, 8).unwrap();
                let mut circuit: Circuit<F> = Circuit::new();
                let mut assignment: Assignment<F> = Assignment::new();
                stretcher
                    .generate_circuit(&mut circuit, &mut assignment, &(), 0)
                    .unwrap();
                black_box(circuit.gates_amount())
            });
        });
    }

    group.finish();
}

fn bench_generate_assignments(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_assignments");

    for lanes in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(lanes), &lanes, |b, &lanes| {
            let stretcher =
                Stretcher::new(ParallelBlocks { blocks: 64 }, UnitAdapter, 2 * lanes).unwrap();
            // Freeze the plan outside the measured loop.
            let mut warmup: Assignment<F> = Assignment::new();
            stretcher.generate_assignments(&mut warmup, &(), 0).unwrap();

            b.iter(|| {
                let mut assignment: Assignment<F> = Assignment::new();
                stretcher
                    .generate_assignments(&mut assignment, &(), 0)
                    .unwrap();
                black_box(assignment.rows_amount())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate_circuit, bench_generate_assignments);
criterion_main!(benches);
