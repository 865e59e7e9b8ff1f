//! Blocking marker component

use crate::ecs::{Component, ComponentTag};
use crate::physics::{CollisionFilter, CollisionLayers};

/// Marks its entity as solid for movers it mutually collides with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockerComponent {
    /// Layers this blocker occupies
    pub layers: CollisionLayers,
    /// Mover layers this blocker stops
    pub stops: CollisionLayers,
}

impl BlockerComponent {
    /// Create a blocker on the given layers that stops every character
    pub const fn new(layers: CollisionLayers) -> Self {
        Self {
            layers,
            stops: CollisionLayers::CHARACTERS,
        }
    }

    /// Static level geometry
    pub const fn environment() -> Self {
        Self::new(CollisionLayers::ENVIRONMENT)
    }

    /// Restrict which mover layers this blocker stops
    #[must_use]
    pub const fn stopping(mut self, stops: CollisionLayers) -> Self {
        self.stops = stops;
        self
    }
}

impl Default for BlockerComponent {
    fn default() -> Self {
        Self::environment()
    }
}

impl Component for BlockerComponent {
    fn tag(&self) -> ComponentTag {
        ComponentTag::BLOCKER
    }

    fn blocking_filter(&self) -> Option<CollisionFilter> {
        Some(CollisionFilter::new(self.layers, self.stops))
    }
}
