//! Error types for entity operations
//!
//! Lookup misses are reported as `None` or empty results, never as errors.
//! Spatial index errors live in [`crate::spatial::SpatialIndexError`].

use thiserror::Error;

/// Errors raised by [`crate::ecs::EntityMut::move_by`]
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MoveError {
    /// Both axes were nonzero; movement must be split into two calls
    #[error("can only move along one axis per call (requested {amt_x}, {amt_y})")]
    DiagonalMove {
        /// Requested x delta
        amt_x: f64,
        /// Requested y delta
        amt_y: f64,
    },
}
