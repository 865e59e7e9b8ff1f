//! Spatial partitioning data structures
//!
//! Provides the bounding-box type and the membership index entities are
//! registered in for overlap queries.

mod aabb;
mod quadtree;
pub mod spatial_index;

pub use aabb::Aabb;
pub use quadtree::{Quadtree, QuadtreeConfig, QuadtreeNode};
pub use spatial_index::{SpatialIndex, SpatialIndexError};
