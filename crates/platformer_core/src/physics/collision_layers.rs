//! Collision layer system for filtering collision detection
//!
//! Every collidable sits on one or more layers and carries a mask of the
//! layers it collides with. A mover is stopped by a blocker only when each
//! one's layer is in the other's mask.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Static level geometry: floors, walls, ceilings
        const ENVIRONMENT = 1 << 3;
        /// Doors, gates and other blockers that can be unlocked
        const DOOR = 1 << 4;
        /// One-way platforms
        const PLATFORM = 1 << 5;
        /// Pickups and collectibles
        const PICKUP = 1 << 6;
    }
}

impl CollisionLayers {
    /// Layers that stop a walking character by default
    pub const SOLID: Self = Self::ENVIRONMENT.union(Self::DOOR).union(Self::PLATFORM);

    /// Character layers
    pub const CHARACTERS: Self = Self::PLAYER.union(Self::ENEMY);

    /// Check if two entities should collide based on their layers and masks
    ///
    /// A's layer must be in B's mask and B's layer must be in A's mask.
    pub const fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::SOLID
    }
}

/// Layer plus mask of one collidable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Layers this collidable sits on
    pub layer: CollisionLayers,
    /// Layers this collidable collides with
    pub mask: CollisionLayers,
}

impl CollisionFilter {
    /// Create a filter
    pub const fn new(layer: CollisionLayers, mask: CollisionLayers) -> Self {
        Self { layer, mask }
    }

    /// Mutual layer/mask test against another collidable
    pub const fn collides_with(self, other: Self) -> bool {
        CollisionLayers::should_collide(self.layer, self.mask, other.layer, other.mask)
    }
}
