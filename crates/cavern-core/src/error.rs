//! Error types for grid access.

use thiserror::Error;

use crate::coord::Coord;

/// Errors from grid construction and accessors.
///
/// These are programming errors on the caller's side. A structurally
/// broken grid handed over by the level parser is *not* an error at
/// analysis time; the validator reports it as issues instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A coordinate lies outside `[0, width) x [0, height)`.
    #[error("coordinate {coord} out of bounds for {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The cell array length disagrees with the declared dimensions.
    #[error("grid declares {width}x{height} ({expected} cells) but holds {actual} cells")]
    DimensionMismatch {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// `width * height`.
        expected: usize,
        /// Actual cell array length.
        actual: usize,
    },
}
