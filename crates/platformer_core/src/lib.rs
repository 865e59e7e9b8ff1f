//! # Platformer Core
//!
//! Runtime core of a 2D platform-game engine: entities that own components,
//! a spatial index kept consistent with every entity's bounding box, and
//! collision-resolved single-axis movement.
//!
//! ## Features
//!
//! - **Entity Lifecycle**: Deferred component removal, soft removal through
//!   removal-animation components
//! - **Spatial Index**: Pluggable `SpatialIndex` trait with a quadtree
//!   reference implementation
//! - **Collision Resolution**: Per-axis movement clamped against blocking
//!   entities, filtered by collision layers
//! - **Range Visitors**: The query mechanism gameplay components build on
//!
//! ## Quick Start
//!
//! ```rust
//! use platformer_core::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let player = scene.spawn_with_aabb(Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0));
//!
//! let mut entity = scene.entity_mut(player).expect("just spawned");
//! let moved = entity.move_by(5.0, 0.0).expect("single axis");
//! assert_eq!(moved, 5.0);
//!
//! scene.update(1.0 / 60.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat},
        ecs::{
            components::{
                AudioComponent, AudioSink, BlockerComponent, CollisionComponent,
                RemovalAnimationComponent,
            },
            AudioEmitter, Component, ComponentHandle, ComponentTag, CollisionResolver, Entity,
            EntityId, EntityMut, EntityState, IdAllocator, RemovalAnimation, Scene, SceneConfig,
            TagFilter, TagRegistry,
        },
        error::MoveError,
        foundation::math::Vec2,
        physics::{CollisionFilter, CollisionLayers},
        render::RenderContext,
        spatial::{Aabb, Quadtree, QuadtreeConfig, SpatialIndex, SpatialIndexError},
    };
}
