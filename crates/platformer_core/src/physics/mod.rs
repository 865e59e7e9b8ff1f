//! Physics module for collision filtering
//!
//! Movement resolution itself lives in
//! [`crate::ecs::components::CollisionComponent`].

pub mod collision_layers;

pub use collision_layers::{CollisionFilter, CollisionLayers};
