//! Orchestrator: stretch a component occurrence into a wider circuit
//!
//! A [`Stretcher`] wraps one component occurrence. On the first call to
//! either entry point it materializes the component on a throwaway narrow
//! circuit, analyzes it and freezes a [`RemappingPlan`]; every subsequent
//! call reuses the frozen plan. The two entry points mirror the wrapped
//! component's own: `generate_circuit` emits the relocated gates,
//! selectors, constants and copy constraints into the caller's targets,
//! `generate_assignments` copies the relocated witness values.

use std::marker::PhantomData;

use once_cell::unsync::OnceCell;
use p3_field::{Field, AbstractField};
use tracing::debug;

use crate::circuit::Circuit;
use crate::columns::LaneLayout;
use crate::component::{Component, StretchAdapter};
use crate::error::StretchResult;
use crate::packing::{LanePacker, LptPacker};
use crate::remap::{self, Relocator, RemappingPlan};
use crate::types::Variable;
use crate::witness::Assignment;
use crate::zoning;

/// Stretches one wrapped-component occurrence into `k` parallel lanes
///
/// Not safe for concurrent use: the plan is computed then cached through a
/// single-assignment cell. Use one instance per thread or occurrence.
#[derive(Debug)]
pub struct Stretcher<F, C, A, P = LptPacker> {
    component: C,
    adapter: A,
    layout: LaneLayout,
    packer: P,
    plan: OnceCell<RemappingPlan>,
    _field: PhantomData<F>,
}

impl<F, C, A> Stretcher<F, C, A, LptPacker>
where
    F: Field + AbstractField,
    C: Component<F>,
    A: StretchAdapter<F, C>,
{
    /// Wrap `component`, stretching its witness area to `stretched_width`
    /// columns. A width that does not divide into whole lanes is rejected
    /// before any other state exists.
    pub fn new(component: C, adapter: A, stretched_width: usize) -> StretchResult<Self> {
        Self::with_packer(component, adapter, stretched_width, LptPacker)
    }
}

impl<F, C, A, P> Stretcher<F, C, A, P>
where
    F: Field + AbstractField,
    C: Component<F>,
    A: StretchAdapter<F, C>,
    P: LanePacker,
{
    /// Like [`Stretcher::new`] with a caller-supplied lane packer
    pub fn with_packer(
        component: C,
        adapter: A,
        stretched_width: usize,
        packer: P,
    ) -> StretchResult<Self> {
        let layout = LaneLayout::new(component.witness_amount(), stretched_width)?;
        Ok(Self {
            component,
            adapter,
            layout,
            packer,
            plan: OnceCell::new(),
            _field: PhantomData,
        })
    }

    /// Column geometry of the stretch
    #[inline]
    pub fn layout(&self) -> LaneLayout {
        self.layout
    }

    /// The wrapped component
    #[inline]
    pub fn component(&self) -> &C {
        &self.component
    }

    /// The frozen plan, once either entry point has run
    #[inline]
    pub fn plan(&self) -> Option<&RemappingPlan> {
        self.plan.get()
    }

    /// Rows the stretched region occupies, once the plan is frozen
    #[inline]
    pub fn stretched_rows(&self) -> Option<usize> {
        self.plan.get().map(RemappingPlan::stretched_rows)
    }

    fn narrow_instance(
        &self,
        outer: &A::OuterInput,
        outer_assignment: &Assignment<F>,
    ) -> StretchResult<(Circuit<F>, Assignment<F>, C::Input)> {
        let circuit = Circuit::new();
        let mut assignment = Assignment::new();
        let input = self
            .adapter
            .convert_input(outer, outer_assignment, &mut assignment)?;
        Ok((circuit, assignment, input))
    }

    /// Compute the plan on first use; reuse it afterwards. Analysis runs on
    /// a throwaway narrow instance and never touches caller resources.
    fn ensure_plan(
        &self,
        outer: &A::OuterInput,
        outer_assignment: &Assignment<F>,
    ) -> StretchResult<&RemappingPlan> {
        if let Some(plan) = self.plan.get() {
            return Ok(plan);
        }

        let (mut narrow_circuit, mut narrow_assignment, input) =
            self.narrow_instance(outer, outer_assignment)?;
        self.component
            .generate_circuit(&mut narrow_circuit, &mut narrow_assignment, &input, 0)?;
        self.component
            .generate_assignments(&mut narrow_assignment, &input, 0)?;

        let zoning = zoning::analyze(
            &narrow_circuit,
            &narrow_assignment,
            self.component.rows_amount(),
        )?;
        let sizes: Vec<(usize, usize)> = zoning
            .zone_sizes()
            .iter()
            .map(|(&zone, &size)| (zone, size))
            .collect();
        let packed = self.packer.pack(&sizes, self.layout.lanes());
        let plan = RemappingPlan::derive(
            self.layout,
            zoning,
            packed,
            narrow_circuit.copy_constraints(),
        )?;
        Ok(self.plan.get_or_init(|| plan))
    }

    /// Emit the stretched circuit into the caller's targets at `start_row`
    /// and adapt the component's result to the outer world
    pub fn generate_circuit(
        &self,
        target_circuit: &mut Circuit<F>,
        target_assignment: &mut Assignment<F>,
        input: &A::OuterInput,
        start_row: usize,
    ) -> StretchResult<A::OuterResult> {
        let plan = self.ensure_plan(input, target_assignment)?;

        let (mut narrow_circuit, mut narrow_assignment, inner_input) =
            self.narrow_instance(input, target_assignment)?;
        let inner_result = self.component.generate_circuit(
            &mut narrow_circuit,
            &mut narrow_assignment,
            &inner_input,
            0,
        )?;

        let deconvert = |var: Variable| self.adapter.deconvert_var(input, var);
        let relocator = Relocator::new(plan, start_row, &deconvert);
        let gate_mapping = remap::move_circuit(
            &relocator,
            &narrow_circuit,
            &narrow_assignment,
            target_circuit,
            target_assignment,
        )?;
        debug!(gates = gate_mapping.len(), start_row, "stretched circuit emitted");

        self.adapter.convert_result(&relocator, inner_result, input)
    }

    /// Fill the stretched witness values into the caller's assignment at
    /// `start_row` and adapt the component's result to the outer world
    pub fn generate_assignments(
        &self,
        target_assignment: &mut Assignment<F>,
        input: &A::OuterInput,
        start_row: usize,
    ) -> StretchResult<A::OuterResult> {
        let plan = self.ensure_plan(input, target_assignment)?;

        let (mut narrow_circuit, mut narrow_assignment, inner_input) =
            self.narrow_instance(input, target_assignment)?;
        // Selector activations and constants only materialize during
        // circuit generation, and components may read them back while
        // assigning, so both generators replay here.
        self.component.generate_circuit(
            &mut narrow_circuit,
            &mut narrow_assignment,
            &inner_input,
            0,
        )?;
        let inner_result =
            self.component
                .generate_assignments(&mut narrow_assignment, &inner_input, 0)?;

        let deconvert = |var: Variable| self.adapter.deconvert_var(input, var);
        let relocator = Relocator::new(plan, start_row, &deconvert);
        remap::move_assignment(&relocator, &narrow_assignment, target_assignment);

        self.adapter.convert_result(&relocator, inner_result, input)
    }
}
