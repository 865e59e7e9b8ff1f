//! Entity-Component implementation
//!
//! Entities own ordered component lists; the scene owns entities and links
//! them to the spatial index.

pub mod component;
pub mod components;
pub mod entity;
pub mod scene;

#[cfg(test)]
mod tests;

pub use component::{
    AsAny, AudioEmitter, CollisionResolver, Component, ComponentHandle, ComponentTag,
    RemovalAnimation, TagFilter, TagRegistry,
};
pub use entity::{Entity, EntityId, EntityState, IdAllocator};
pub use scene::{EntityMut, Scene, SceneConfig, REMOVE_EVENT};
