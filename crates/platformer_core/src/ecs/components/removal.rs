//! Timed removal animation
//!
//! Keeps a removed entity visible and indexed for a fixed duration, then
//! completes the removal.

use crate::ecs::{Component, ComponentTag, EntityMut, RemovalAnimation};
use log::trace;

/// Delays structural removal by `duration` seconds of simulation time
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalAnimationComponent {
    duration: f64,
    elapsed: f64,
    active: bool,
}

impl RemovalAnimationComponent {
    /// Create an inactive animation lasting `duration` seconds
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            active: false,
        }
    }

    /// Total length in seconds
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Fraction of the animation played, from 0 to 1
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return if self.active { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).min(1.0)
    }
}

impl Component for RemovalAnimationComponent {
    fn tag(&self) -> ComponentTag {
        ComponentTag::REMOVAL_ANIMATION
    }

    fn update(&mut self, entity: &mut EntityMut<'_>, delta: f64) {
        if !self.active {
            return;
        }

        self.elapsed += delta;
        if self.elapsed >= self.duration {
            trace!("Entity {}: removal animation finished", entity.id());
            entity.force_remove();
        }
    }

    fn as_removal_animation(&mut self) -> Option<&mut dyn RemovalAnimation> {
        Some(self)
    }
}

impl RemovalAnimation for RemovalAnimationComponent {
    fn activate(&mut self) {
        self.active = true;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
