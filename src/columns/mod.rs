//! Stretched-table geometry
//!
//! A [`LaneLayout`] fixes the column arithmetic of a stretch: the wrapped
//! component's base witness width, and the number of parallel lanes the
//! stretched region is divided into. Lane `L` occupies witness columns
//! `[L * base_width, (L + 1) * base_width)`, so lanes never overlap.
//!
//! The stretched width must divide into whole lanes; a width that does not
//! is rejected here, before any other state exists, rather than rounded.

use serde::{Deserialize, Serialize};

use crate::error::{StretchError, StretchResult};

/// Column geometry of a stretched region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLayout {
    base_width: usize,
    lanes: usize,
}

impl LaneLayout {
    /// Validate and build the geometry for stretching `base_width` witness
    /// columns into `stretched_width`
    pub fn new(base_width: usize, stretched_width: usize) -> StretchResult<Self> {
        if base_width == 0 || stretched_width % base_width != 0 {
            return Err(StretchError::WidthNotDivisible {
                base: base_width,
                stretched: stretched_width,
            });
        }
        Ok(Self {
            base_width,
            lanes: stretched_width / base_width,
        })
    }

    /// Witness columns of the wrapped component
    #[inline]
    pub fn base_width(&self) -> usize {
        self.base_width
    }

    /// Number of parallel lanes (the stretch coefficient `k`)
    #[inline]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Witness columns of the stretched region
    #[inline]
    pub fn stretched_width(&self) -> usize {
        self.base_width * self.lanes
    }

    /// Stretched column holding lane `lane`'s copy of base column `column`
    #[inline]
    pub fn lane_column(&self, lane: usize, column: usize) -> usize {
        debug_assert!(lane < self.lanes);
        debug_assert!(column < self.base_width);
        lane * self.base_width + column
    }

    /// Lane owning a stretched witness column
    #[inline]
    pub fn lane_of_column(&self, column: usize) -> usize {
        debug_assert!(column < self.stretched_width());
        column / self.base_width
    }
}
