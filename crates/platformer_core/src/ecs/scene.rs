//! Scene: entities plus the spatial index they are registered in
//!
//! The scene owns every entity and a boxed [`SpatialIndex`]. The index only
//! records membership; it never owns entities. All structural changes to the
//! index go through the scene, which treats a membership error as a broken
//! invariant and aborts.
//!
//! [`EntityMut`] is the mutable view of one entity that carries the link to
//! the index. Components receive it during their update hook and range
//! visitors receive it for every visited entity.

use crate::config::Config;
use crate::ecs::{Component, ComponentTag, Entity, EntityId, EntityState, IdAllocator, TagFilter};
use crate::error::MoveError;
use crate::render::RenderContext;
use crate::spatial::{Aabb, Quadtree, QuadtreeConfig, SpatialIndex};
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Event name announced to an entity's audio component on removal
pub const REMOVE_EVENT: &str = "remove";

/// Scene construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Region the default quadtree partitions; entities may leave it
    pub world_bounds: Aabb,

    /// Quadtree tuning
    pub quadtree: QuadtreeConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            world_bounds: Aabb::new(-1024.0, -1024.0, 0.0, 1024.0, 1024.0),
            quadtree: QuadtreeConfig::default(),
        }
    }
}

impl Config for SceneConfig {}

/// Owner of entities and of the spatial index they live in
pub struct Scene {
    index: Box<dyn SpatialIndex>,
    entities: BTreeMap<EntityId, Entity>,
    ids: Rc<IdAllocator>,
}

impl Scene {
    /// Create a scene backed by a quadtree and a fresh id allocator
    pub fn new(config: SceneConfig) -> Self {
        Self::with_allocator(config, Rc::new(IdAllocator::new()))
    }

    /// Create a quadtree-backed scene drawing ids from a shared allocator
    pub fn with_allocator(config: SceneConfig, ids: Rc<IdAllocator>) -> Self {
        let index = Quadtree::new(config.world_bounds, config.quadtree);
        Self::with_index(Box::new(index), ids)
    }

    /// Create a scene over any spatial index implementation
    pub fn with_index(index: Box<dyn SpatialIndex>, ids: Rc<IdAllocator>) -> Self {
        Self {
            index,
            entities: BTreeMap::new(),
            ids,
        }
    }

    /// Create an entity with a zero-area box at a point
    pub fn spawn(&mut self, x: f64, y: f64, z: f64) -> EntityId {
        self.spawn_with_aabb(Aabb::point(x, y, z))
    }

    /// Create an entity and register it in the spatial index
    pub fn spawn_with_aabb(&mut self, aabb: Aabb) -> EntityId {
        let id = self.ids.next_id();
        self.entities.insert(id, Entity::new(id, aabb));
        self.index_add(id, aabb);
        debug!("Spawned entity {id} at {aabb:?}");
        id
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable view of an entity, linked to this scene's index
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        if self.entities.contains_key(&id) {
            Some(EntityMut { scene: self, id })
        } else {
            None
        }
    }

    /// Iterate entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Ids of entities that have not reached `Removed`, in id order
    pub fn live_ids(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.state() != EntityState::Removed)
            .map(Entity::id)
            .collect()
    }

    /// Number of entities held, including removed ones not yet purged
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check whether the scene holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Read-only access to the spatial index
    pub fn index(&self) -> &dyn SpatialIndex {
        self.index.as_ref()
    }

    /// Registered entities whose box intersects `region`, in id order
    pub fn query_range(&self, region: &Aabb) -> Vec<EntityId> {
        let mut ids = self.index.query_range(region);
        ids.sort_unstable();
        ids
    }

    /// Run one simulation tick.
    ///
    /// Every entity not yet `Removed` when the tick starts is updated in id
    /// order, unless an earlier entity removes it during the tick. Entities
    /// spawned during the tick first update on the next one. Entities that
    /// end the tick `Removed` are dropped together with their components.
    pub fn update(&mut self, delta: f64) {
        for id in self.live_ids() {
            if let Some(mut entity) = self.entity_mut(id) {
                if entity.state() != EntityState::Removed {
                    entity.update(delta);
                }
            }
        }

        self.purge_removed();
    }

    /// Render every entity not yet `Removed`, in id order
    pub fn render(&self, target: &mut dyn RenderContext, viewport_x: f64, viewport_y: f64) {
        for entity in self.entities.values() {
            if entity.state() != EntityState::Removed {
                entity.render(target, viewport_x, viewport_y);
            }
        }
    }

    fn purge_removed(&mut self) {
        let before = self.entities.len();
        self.entities
            .retain(|_, entity| entity.state() != EntityState::Removed);

        let purged = before - self.entities.len();
        if purged > 0 {
            trace!("Scene: purged {purged} removed entities");
        }
    }

    fn index_add(&mut self, id: EntityId, aabb: Aabb) {
        if let Err(err) = self.index.add(id, aabb) {
            error!("Spatial index invariant violated: {err}");
            panic!("spatial index invariant violated: {err}");
        }
    }

    fn index_remove(&mut self, id: EntityId) {
        if let Err(err) = self.index.remove(id) {
            error!("Spatial index invariant violated: {err}");
            panic!("spatial index invariant violated: {err}");
        }
    }

    /// Ask the mover's collision component, if any, how far it may travel
    fn resolve_movement(&self, id: EntityId, start: &Aabb, amt_x: f64, amt_y: f64) -> (f64, f64) {
        let resolver = self
            .entities
            .get(&id)
            .and_then(|entity| entity.component(ComponentTag::COLLISION))
            .and_then(Component::as_collision_resolver);

        match resolver {
            Some(resolver) => {
                let (x, y) = resolver.resolve(self, start, amt_x, amt_y);
                (clamp_to_request(amt_x, x), clamp_to_request(amt_y, y))
            }
            None => (amt_x, amt_y),
        }
    }
}

/// Keep a resolved delta between zero and the requested delta
fn clamp_to_request(requested: f64, resolved: f64) -> f64 {
    if requested > 0.0 {
        resolved.clamp(0.0, requested)
    } else if requested < 0.0 {
        resolved.clamp(requested, 0.0)
    } else {
        0.0
    }
}

/// Mutable view of one entity, linked to the scene's spatial index
pub struct EntityMut<'a> {
    scene: &'a mut Scene,
    id: EntityId,
}

impl EntityMut<'_> {
    /// Read-only access to the owning scene
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// Mutable view of another entity in the same scene
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        self.scene.entity_mut(id)
    }

    /// Run this entity's update pass.
    ///
    /// Queued component removals are applied first. The surviving
    /// components then update in insertion order. Components added during
    /// the pass first update on the next call; components queued for removal
    /// during the pass still update in it. A nested call for the same entity
    /// is ignored.
    pub fn update(&mut self, delta: f64) {
        if self.updating {
            warn!("Entity {}: ignoring re-entrant update", self.id);
            return;
        }
        self.updating = true;
        self.apply_pending_removals();

        let count = self.component_count();
        for index in 0..count {
            let Some((handle, mut component)) = self.detach_at(index) else {
                continue;
            };
            component.update(self, delta);
            self.reattach(handle, component);
        }

        self.updating = false;
    }

    /// Move along exactly one axis, resolving collisions.
    ///
    /// Returns the signed distance actually travelled along the requested
    /// axis: never larger in magnitude than requested and never of opposite
    /// sign. Without a collision component the full request is applied.
    ///
    /// # Errors
    ///
    /// [`MoveError::DiagonalMove`] when both amounts are nonzero.
    pub fn move_by(&mut self, amt_x: f64, amt_y: f64) -> Result<f64, MoveError> {
        if amt_x != 0.0 && amt_y != 0.0 {
            return Err(MoveError::DiagonalMove { amt_x, amt_y });
        }
        if self.state() == EntityState::Removed {
            trace!("Entity {}: ignoring move after removal", self.id);
            return Ok(0.0);
        }

        let id = self.id;
        let start = self.aabb();

        self.scene.index_remove(id);
        let (dx, dy) = self.scene.resolve_movement(id, &start, amt_x, amt_y);
        let end = start.moved(dx, dy);
        self.set_aabb(end);
        self.scene.index_add(id, end);

        let (requested, travelled) = if amt_x == 0.0 { (amt_y, dy) } else { (amt_x, dx) };
        if travelled != requested {
            trace!("Entity {id}: movement truncated from {requested} to {travelled}");
        }
        Ok(travelled)
    }

    /// Grow the box to fit a local-space box.
    ///
    /// Width and height become at least those of `local`, and the min corner
    /// shifts by `local`'s min corner.
    pub fn fit_aabb(&mut self, local: &Aabb) {
        let current = self.aabb();
        let width = current.width().max(local.width());
        let height = current.height().max(local.height());
        let min_x = current.min_x() + local.min_x();
        let min_y = current.min_y() + local.min_y();
        let fitted = Aabb::new(min_x, min_y, current.min_z(), min_x + width, min_y + height);

        if self.state() == EntityState::Removed {
            self.set_aabb(fitted);
            return;
        }

        let id = self.id;
        self.scene.index_remove(id);
        self.set_aabb(fitted);
        self.scene.index_add(id, fitted);
    }

    /// Remove the entity, letting a removal animation finish first.
    ///
    /// Announces [`REMOVE_EVENT`] to an audio component, then flags the
    /// entity removed. With a removal animation the entity stays indexed
    /// until the animation calls [`Self::force_remove`]; otherwise it is
    /// struck from the index immediately. Calling it again is a no-op.
    pub fn remove(&mut self) {
        if self.is_removed() {
            return;
        }

        if let Some(audio) = self
            .component_mut(ComponentTag::AUDIO)
            .and_then(Component::as_audio_emitter)
        {
            audio.play(REMOVE_EVENT);
        }

        self.set_state(EntityState::PendingRemoval);

        let animated = match self
            .component_mut(ComponentTag::REMOVAL_ANIMATION)
            .and_then(Component::as_removal_animation)
        {
            Some(animation) => {
                animation.activate();
                true
            }
            None => false,
        };

        if animated {
            debug!("Entity {}: removal animation armed", self.id);
        } else {
            self.force_remove();
        }
    }

    /// Strike the entity from the spatial index for good
    pub fn force_remove(&mut self) {
        if self.state() == EntityState::Removed {
            return;
        }

        let id = self.id;
        self.set_state(EntityState::Removed);
        self.scene.index_remove(id);
        debug!("Entity {id}: removed");
    }

    /// Visit entities whose box intersects `region`.
    ///
    /// Entities are visited in id order; an entity flagged removed by the
    /// time its turn comes is skipped. With [`TagFilter::Any`] the visitor
    /// sees every entity and no component. With a tag it sees only entities
    /// exposing that tag, together with that component instance.
    ///
    /// The calling entity is visited too when it lies in `region`.
    pub fn visit_in_range<F>(&mut self, filter: impl Into<TagFilter>, region: &Aabb, mut visitor: F)
    where
        F: FnMut(&mut EntityMut<'_>, Option<&mut dyn Component>),
    {
        let filter = filter.into();

        for id in self.scene.query_range(region) {
            let visible = self
                .scene
                .entity(id)
                .is_some_and(|entity| !entity.is_removed());
            if !visible {
                continue;
            }

            let mut target = EntityMut {
                scene: &mut *self.scene,
                id,
            };
            match filter {
                TagFilter::Any => visitor(&mut target, None),
                TagFilter::Tag(tag) => {
                    let Some((handle, mut component)) = target.detach_tagged(tag) else {
                        continue;
                    };
                    visitor(&mut target, Some(component.as_mut()));
                    target.reattach(handle, component);
                }
            }
        }
    }
}

impl Deref for EntityMut<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        // Entries are only dropped by `Scene::update`, which cannot run while
        // a view borrows the scene.
        &self.scene.entities[&self.id]
    }
}

impl DerefMut for EntityMut<'_> {
    fn deref_mut(&mut self) -> &mut Entity {
        self.scene
            .entities
            .get_mut(&self.id)
            .expect("EntityMut always refers to an entity held by its scene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(x: f64, y: f64) -> Aabb {
        Aabb::new(x, y, 0.0, x + 1.0, y + 1.0)
    }

    #[test]
    fn test_spawn_registers_in_index() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn_with_aabb(unit_box(0.0, 0.0));

        assert!(scene.index().contains(id));
        assert_eq!(scene.query_range(&unit_box(0.0, 0.0)), vec![id]);
    }

    #[test]
    fn test_spawn_point() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn(2.0, 3.0, 1.0);

        let aabb = scene.entity(id).unwrap().aabb();
        assert_eq!(aabb, Aabb::point(2.0, 3.0, 1.0));
        assert_eq!(scene.query_range(&Aabb::point(2.0, 3.0, 0.0)), vec![id]);
    }

    #[test]
    fn test_shared_allocator_across_scenes() {
        let ids = Rc::new(IdAllocator::new());
        let mut first = Scene::with_allocator(SceneConfig::default(), Rc::clone(&ids));
        let mut second = Scene::with_allocator(SceneConfig::default(), Rc::clone(&ids));

        let a = first.spawn(0.0, 0.0, 0.0);
        let b = second.spawn(0.0, 0.0, 0.0);
        assert!(a < b);
    }

    #[test]
    fn test_move_updates_index() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn_with_aabb(unit_box(0.0, 0.0));

        let moved = scene.entity_mut(id).unwrap().move_by(0.0, -4.0).unwrap();
        assert_relative_eq!(moved, -4.0);
        assert!(scene.query_range(&Aabb::point(0.5, 0.5, 0.0)).is_empty());
        assert_eq!(scene.query_range(&Aabb::point(0.5, -3.5, 0.0)), vec![id]);
        assert_eq!(scene.index().aabb_of(id), Some(unit_box(0.0, -4.0)));
    }

    #[test]
    fn test_zero_move_is_allowed() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn_with_aabb(unit_box(0.0, 0.0));

        assert_eq!(scene.entity_mut(id).unwrap().move_by(0.0, 0.0), Ok(0.0));
        assert_eq!(scene.entity(id).unwrap().aabb(), unit_box(0.0, 0.0));
    }

    #[test]
    fn test_diagonal_move_rejected_without_side_effects() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn_with_aabb(unit_box(0.0, 0.0));

        for _ in 0..3 {
            let result = scene.entity_mut(id).unwrap().move_by(1.0, 1.0);
            assert_eq!(result, Err(MoveError::DiagonalMove { amt_x: 1.0, amt_y: 1.0 }));
        }
        assert_eq!(scene.entity(id).unwrap().aabb(), unit_box(0.0, 0.0));
        assert!(scene.index().contains(id));
    }

    #[test]
    fn test_fit_aabb_grows_and_offsets() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn(10.0, 10.0, 2.0);

        scene
            .entity_mut(id)
            .unwrap()
            .fit_aabb(&Aabb::new(-0.5, 0.0, 0.0, 0.5, 2.0));

        let expected = Aabb::new(9.5, 10.0, 2.0, 10.5, 12.0);
        assert_eq!(scene.entity(id).unwrap().aabb(), expected);
        assert_eq!(scene.index().aabb_of(id), Some(expected));
    }

    #[test]
    fn test_force_remove_is_terminal_and_idempotent() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn_with_aabb(unit_box(0.0, 0.0));

        let mut entity = scene.entity_mut(id).unwrap();
        entity.force_remove();
        entity.force_remove();
        entity.remove();
        assert_eq!(entity.state(), EntityState::Removed);
        assert_eq!(entity.move_by(1.0, 0.0), Ok(0.0));

        assert!(scene.query_range(&unit_box(0.0, 0.0)).is_empty());
        scene.update(0.1);
        assert!(scene.entity(id).is_none());
    }

    #[test]
    fn test_clamp_to_request() {
        assert_relative_eq!(clamp_to_request(5.0, 7.0), 5.0);
        assert_relative_eq!(clamp_to_request(5.0, -1.0), 0.0);
        assert_relative_eq!(clamp_to_request(-5.0, -2.0), -2.0);
        assert_relative_eq!(clamp_to_request(-5.0, 3.0), 0.0);
        assert_relative_eq!(clamp_to_request(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_config_defaults_from_partial_toml() {
        let config: SceneConfig = toml::from_str("[quadtree]\nmax_depth = 3\n").unwrap();
        assert_eq!(config.quadtree.max_depth, 3);
        assert_eq!(config.quadtree.max_entries_per_node, 8);
        assert_eq!(config.world_bounds, SceneConfig::default().world_bounds);
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("platformer_core_scene_{}.ron", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let mut config = SceneConfig::default();
        config.world_bounds = Aabb::new(0.0, 0.0, 0.0, 64.0, 32.0);
        config.save_to_file(&path).unwrap();

        let loaded = SceneConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_rejects_unknown_extension() {
        let path = std::env::temp_dir().join(format!("platformer_core_scene_{}.yaml", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        std::fs::write(&path, "world_bounds: []").unwrap();

        let err = SceneConfig::load_from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, crate::config::ConfigError::UnsupportedFormat(_)));
    }

    /// Index that accepts inserts only when told to and never finds anything to remove
    struct BrokenIndex {
        accept_add: bool,
    }

    impl SpatialIndex for BrokenIndex {
        fn add(&mut self, entity: EntityId, _aabb: Aabb) -> Result<(), crate::spatial::SpatialIndexError> {
            if self.accept_add {
                Ok(())
            } else {
                Err(crate::spatial::SpatialIndexError::AlreadyPresent(entity))
            }
        }

        fn remove(&mut self, entity: EntityId) -> Result<(), crate::spatial::SpatialIndexError> {
            Err(crate::spatial::SpatialIndexError::NotPresent(entity))
        }

        fn query_range(&self, _region: &Aabb) -> Vec<EntityId> {
            Vec::new()
        }

        fn contains(&self, _entity: EntityId) -> bool {
            false
        }

        fn aabb_of(&self, _entity: EntityId) -> Option<Aabb> {
            None
        }

        fn len(&self) -> usize {
            0
        }

        fn clear(&mut self) {}
    }

    #[test]
    #[should_panic(expected = "spatial index invariant violated")]
    fn test_failed_index_add_panics() {
        let mut scene = Scene::with_index(
            Box::new(BrokenIndex { accept_add: false }),
            Rc::new(IdAllocator::new()),
        );
        scene.spawn(0.0, 0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "spatial index invariant violated")]
    fn test_failed_index_remove_panics() {
        let mut scene = Scene::with_index(
            Box::new(BrokenIndex { accept_add: true }),
            Rc::new(IdAllocator::new()),
        );
        let id = scene.spawn(0.0, 0.0, 0.0);
        scene.entity_mut(id).unwrap().force_remove();
    }
}
