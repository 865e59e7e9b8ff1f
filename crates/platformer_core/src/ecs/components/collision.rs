//! Collision resolution component
//!
//! Clamps a single-axis movement so the mover stops flush against the
//! nearest blocking entity in its direction of travel.

use crate::ecs::{CollisionResolver, Component, ComponentTag, Scene};
use crate::physics::{CollisionFilter, CollisionLayers};
use crate::spatial::Aabb;

/// Component that makes an entity's movement respect blockers
///
/// A blocker stops the mover only when the blocker's layers are in `mask`
/// and the mover's `layer` is in the blocker's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionComponent {
    /// Layers the mover sits on
    pub layer: CollisionLayers,
    /// Layers that stop this entity
    pub mask: CollisionLayers,
}

impl CollisionComponent {
    /// Create a player collider stopped by solid geometry
    pub fn new() -> Self {
        Self::with_mask(CollisionLayers::SOLID)
    }

    /// Create a player collider with a specific mask
    pub const fn with_mask(mask: CollisionLayers) -> Self {
        Self::with_layer(CollisionLayers::PLAYER, mask)
    }

    /// Create a collider on `layer` stopped by `mask`
    pub const fn with_layer(layer: CollisionLayers, mask: CollisionLayers) -> Self {
        Self { layer, mask }
    }

    /// Layer and mask as one filter
    pub const fn filter(&self) -> CollisionFilter {
        CollisionFilter::new(self.layer, self.mask)
    }
}

impl Default for CollisionComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CollisionComponent {
    fn tag(&self) -> ComponentTag {
        ComponentTag::COLLISION
    }

    fn as_collision_resolver(&self) -> Option<&dyn CollisionResolver> {
        Some(self)
    }
}

/// Open-interval overlap: touching spans do not overlap
fn spans_overlap(min_a: f64, max_a: f64, min_b: f64, max_b: f64) -> bool {
    min_a < max_b && max_a > min_b
}

impl CollisionResolver for CollisionComponent {
    fn resolve(&self, scene: &Scene, mover: &Aabb, amt_x: f64, amt_y: f64) -> (f64, f64) {
        if amt_x == 0.0 && amt_y == 0.0 {
            return (0.0, 0.0);
        }

        let swept = mover.union(&mover.moved(amt_x, amt_y));
        let mut resolved_x = amt_x;
        let mut resolved_y = amt_y;

        for id in scene.query_range(&swept) {
            let Some(other) = scene.entity(id) else {
                continue;
            };
            if other.is_removed() {
                continue;
            }
            let blocks = other
                .component(ComponentTag::BLOCKER)
                .and_then(Component::blocking_filter)
                .is_some_and(|blocker| self.filter().collides_with(blocker));
            if !blocks {
                continue;
            }

            // Blockers only stop movement if they are ahead of the mover and
            // overlap it on the other axis; a floor does not stop walking.
            let wall = other.aabb();
            if amt_x != 0.0 {
                if !spans_overlap(mover.min_y(), mover.max_y(), wall.min_y(), wall.max_y()) {
                    continue;
                }
                if amt_x > 0.0 && wall.min_x() >= mover.max_x() {
                    resolved_x = resolved_x.min(wall.min_x() - mover.max_x());
                } else if amt_x < 0.0 && wall.max_x() <= mover.min_x() {
                    resolved_x = resolved_x.max(wall.max_x() - mover.min_x());
                }
            } else {
                if !spans_overlap(mover.min_x(), mover.max_x(), wall.min_x(), wall.max_x()) {
                    continue;
                }
                if amt_y > 0.0 && wall.min_y() >= mover.max_y() {
                    resolved_y = resolved_y.min(wall.min_y() - mover.max_y());
                } else if amt_y < 0.0 && wall.max_y() <= mover.min_y() {
                    resolved_y = resolved_y.max(wall.max_y() - mover.min_y());
                }
            }
        }

        (resolved_x, resolved_y)
    }
}
