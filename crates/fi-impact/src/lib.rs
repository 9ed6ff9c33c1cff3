//! Impact matrix: which events are expected to move which indicators.
//!
//! Built from the impact links and events of a [`fi_core::Dataset`]. Magnitude
//! stays ordinal inside the matrix; the only place it becomes a number is
//! [`MagnitudeScale`], an explicit table the caller chooses.

mod matrix;
mod scale;

pub use matrix::{ImpactEntry, ImpactMatrix, MATRIX_COLUMNS, MatrixRow, Pivot};
pub use scale::MagnitudeScale;
