//! PLONK component stretcher
//!
//! Repacks a fixed-width PLONK component (`W` witness columns over `R`
//! rows) into a wider target circuit of `k * W` columns by running `k`
//! logical copies of the component's row-region in parallel lanes,
//! shrinking the row count while preserving every constraint's semantics.
//!
//! # Architecture
//!
//! The transformation runs in three stages:
//! - **Zoning** ([`zoning`]): partition the component's rows into
//!   connectivity classes ("zones") that gate footprints forbid splitting
//!   across lanes.
//! - **Packing** ([`packing`]): assign zones to lanes, balancing per-lane
//!   row load, approximating an NP-hard scheduling problem behind a
//!   pluggable trait.
//! - **Remapping** ([`remap`]): derive relocation tables for every row,
//!   gate, selector and constant cell, then rewrite the component's
//!   circuit and assignment into the target.
//!
//! The [`Stretcher`] orchestrates the stages: it replays the wrapped
//! component on a throwaway narrow instance, freezes a [`RemappingPlan`] on
//! first use, and applies it to the caller's circuit and assignment.
//!
//! # Usage
//!
//! ```ignore
//! use plonk_stretcher::Stretcher;
//!
//! // Double the component's width: two lanes, roughly half the rows.
//! let stretcher = Stretcher::new(component, adapter, 2 * width)?;
//! let result = stretcher.generate_circuit(&mut circuit, &mut assignment, &input, row)?;
//! stretcher.generate_assignments(&mut assignment, &input, row)?;
//! ```
//!
//! Analysis is read-only on the caller's resources; only the apply steps
//! write to the targets, and only after every structural violation has
//! been ruled out.

pub mod circuit;
pub mod columns;
pub mod component;
pub mod constraints;
pub mod error;
pub mod packing;
pub mod remap;
pub mod stretcher;
pub mod types;
pub mod witness;
pub mod zoning;

pub use circuit::{Circuit, CopyConstraint};
pub use columns::LaneLayout;
pub use component::{Component, StretchAdapter};
pub use constraints::{Constraint, Expression, Gate};
pub use error::{StretchError, StretchResult};
pub use packing::{LanePacker, LptPacker};
pub use remap::{Relocator, RemappingPlan};
pub use stretcher::Stretcher;
pub use types::{Variable, VariableKind};
pub use witness::Assignment;
pub use zoning::{ZoneNode, ZoningInfo};

use p3_mersenne_31::Mersenne31;

/// Default field type for tests and examples (Mersenne 31: p = 2^31 - 1)
pub type F = Mersenne31;
