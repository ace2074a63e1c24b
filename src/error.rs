//! Error taxonomy for the stretcher pipeline.
//!
//! Three families of failure:
//! - **Structural violations** indicate a bug in the wrapped component (a
//!   rotation outside the supported window, a variable kind in a role only
//!   witness/constant may occupy, a relative reference where an absolute one
//!   is required). They are detected during analysis, before anything is
//!   written to the caller's circuit or assignment.
//! - **Configuration violations** are caller errors, rejected at
//!   construction time before any mutable state exists.
//! - **Capacity exhaustion** means the constant column of the stretched
//!   region has no free row left for a relocated constant cell.
//!
//! There is no retry path: the caller must pick a different stretch factor
//! or fix the wrapped component.

use thiserror::Error;

use crate::types::{Variable, VariableKind};

/// Result type for stretcher operations
pub type StretchResult<T> = Result<T, StretchError>;

/// Errors raised while validating, analyzing or relocating a component
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StretchError {
    /// A gate constraint references a rotation outside `-1..=1`
    #[error("gate {selector} uses rotation {rotation}, outside the supported window -1..=1")]
    RotationOutOfWindow { selector: usize, rotation: i32 },

    /// A gate active near the region boundary reaches a row outside it
    #[error("gate {selector} touches row {row}, outside the component region of {rows} rows")]
    RowOutOfRegion {
        selector: usize,
        row: i64,
        rows: usize,
    },

    /// A gate constraint contains a variable kind it may not read
    #[error("{kind} variable may not appear inside a constraint of gate {selector}")]
    ForbiddenGateVariable {
        kind: VariableKind,
        selector: usize,
    },

    /// A gate constraint contains an absolutely-addressed variable
    #[error("variable in gate {selector} must use a relative rotation")]
    AbsoluteGateVariable { selector: usize },

    /// A copy-constraint endpoint uses a relative rotation
    #[error("copy constraint endpoint {variable:?} must use an absolute rotation")]
    RelativeCopyEndpoint { variable: Variable },

    /// A copy-constraint endpoint references a row outside the component region
    #[error("copy constraint endpoint row {row} is outside the component region of {rows} rows")]
    CopyEndpointOutOfRegion { row: i64, rows: usize },

    /// A variable kind with no relocation rule reached the relocator
    #[error("{kind} variable cannot be relocated")]
    UnmovableVariable { kind: VariableKind },

    /// The stretched width does not divide into whole lanes
    #[error("stretched width {stretched} is not a multiple of base width {base}")]
    WidthNotDivisible { base: usize, stretched: usize },

    /// Every constant row of the stretched region is already occupied
    #[error("constant destination rows exhausted: all {capacity} rows of the stretched region are occupied")]
    ConstantRowsExhausted { capacity: usize },

    /// The lane packer left a zone unassigned or used an out-of-range lane
    #[error("lane packer left zone {zone} unassigned or out of range ({lanes} lanes)")]
    IncompletePacking { zone: usize, lanes: usize },
}
