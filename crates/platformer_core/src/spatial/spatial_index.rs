//! Abstract spatial index interface
//!
//! Any structure (grid, quadtree, R-tree) can back a scene as long as it
//! honors this membership contract. The index never owns entities; it maps
//! ids to the box they were registered with.

use crate::ecs::EntityId;
use crate::spatial::Aabb;
use thiserror::Error;

/// Membership violations reported by a [`SpatialIndex`]
///
/// These indicate a broken core invariant. The scene escalates them to a
/// fatal assertion rather than recovering.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialIndexError {
    /// `add` was called for an entity that is already registered
    #[error("entity {0} is already registered in the spatial index")]
    AlreadyPresent(EntityId),

    /// `remove` was called for an entity that is not registered
    #[error("entity {0} is not registered in the spatial index")]
    NotPresent(EntityId),
}

/// Membership structure mapping regions to entities
pub trait SpatialIndex {
    /// Register an entity keyed by its current box.
    ///
    /// Afterwards any range query overlapping `aabb` includes `entity`.
    fn add(&mut self, entity: EntityId, aabb: Aabb) -> Result<(), SpatialIndexError>;

    /// Unregister an entity; no later query returns it until it is re-added
    fn remove(&mut self, entity: EntityId) -> Result<(), SpatialIndexError>;

    /// Every registered entity whose box intersects `region`.
    ///
    /// Order is unspecified; each entity appears at most once.
    fn query_range(&self, region: &Aabb) -> Vec<EntityId>;

    /// Check whether an entity is currently registered
    fn contains(&self, entity: EntityId) -> bool;

    /// Box an entity was registered with
    fn aabb_of(&self, entity: EntityId) -> Option<Aabb>;

    /// Number of registered entities
    fn len(&self) -> usize;

    /// Check whether the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entity
    fn clear(&mut self);
}
