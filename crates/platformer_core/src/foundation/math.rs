//! Math utilities and types
//!
//! The simulation works in double precision world units.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f64>;
