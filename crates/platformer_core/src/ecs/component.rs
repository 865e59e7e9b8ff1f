//! Component trait, type tags and capability interfaces
//!
//! Components are looked up by a stable numeric [`ComponentTag`] shared by
//! every instance of a kind. The core never inspects concrete component
//! types: the behaviors it needs (collision resolution, blocking, removal
//! animation, audio) are exposed through capability accessors on the
//! [`Component`] trait.

use crate::ecs::{Entity, EntityId, EntityMut, Scene};
use crate::physics::CollisionFilter;
use crate::render::RenderContext;
use crate::spatial::Aabb;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Stable integer identifying a component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTag(u32);

impl ComponentTag {
    /// Collision resolver consulted by `move_by`
    pub const COLLISION: Self = Self(0);
    /// Removal animation consulted by `remove`
    pub const REMOVAL_ANIMATION: Self = Self(1);
    /// Audio announcer consulted by `remove`
    pub const AUDIO: Self = Self(2);
    /// Blocking marker consulted by the collision resolver
    pub const BLOCKER: Self = Self(3);

    /// First tag handed out by a [`TagRegistry`]; lower values are reserved
    pub const FIRST_USER: u32 = 16;

    /// Create a tag from its raw value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw tag value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Tag registered under `name` in the process-wide registry
    ///
    /// Repeated calls with the same name return the same tag.
    pub fn named(name: &str) -> Self {
        static GLOBAL: OnceLock<Mutex<TagRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Mutex::new(TagRegistry::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name)
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag:{}", self.0)
    }
}

/// Selects which entities a range visit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter {
    /// Every entity, with no component attached to the visit
    Any,
    /// Only entities exposing a component of this tag
    Tag(ComponentTag),
}

impl From<ComponentTag> for TagFilter {
    fn from(tag: ComponentTag) -> Self {
        Self::Tag(tag)
    }
}

/// Assigns stable tags to component kinds by name
///
/// Gameplay code registers its kinds once at startup. Tests build their own
/// registries; [`ComponentTag::named`] uses a process-wide one.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    next: u32,
    by_name: HashMap<String, ComponentTag>,
}

impl TagRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next: ComponentTag::FIRST_USER,
            by_name: HashMap::new(),
        }
    }

    /// Tag for `name`, assigning the next free one on first use
    pub fn register(&mut self, name: &str) -> ComponentTag {
        if let Some(&tag) = self.by_name.get(name) {
            return tag;
        }

        let tag = ComponentTag(self.next);
        self.next += 1;
        self.by_name.insert(name.to_string(), tag);
        log::debug!("Registered component kind '{name}' as {tag}");
        tag
    }

    /// Tag previously registered under `name`
    pub fn get(&self, name: &str) -> Option<ComponentTag> {
        self.by_name.get(name).copied()
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of one attached component instance
///
/// Carries the owning entity, so a handle always names exactly one
/// component on exactly one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHandle {
    owner: EntityId,
    seq: u32,
}

impl ComponentHandle {
    pub(crate) const fn new(owner: EntityId, seq: u32) -> Self {
        Self { owner, seq }
    }

    /// Entity the component is attached to
    pub const fn owner(self) -> EntityId {
        self.owner
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.seq)
    }
}

/// Upcast to [`Any`] for gameplay code that knows the concrete type
pub trait AsAny {
    /// Shared access as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutable access as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior unit owned by an entity
pub trait Component: AsAny + 'static {
    /// Tag shared by every instance of this kind
    fn tag(&self) -> ComponentTag;

    /// Per-tick hook. `entity` is the owning entity.
    ///
    /// While this runs the component is detached from its entity, so looking
    /// its own tag up on `entity` does not find it.
    fn update(&mut self, _entity: &mut EntityMut<'_>, _delta: f64) {}

    /// Per-frame hook; read-only with respect to simulation state
    fn render(
        &self,
        _entity: &Entity,
        _target: &mut dyn RenderContext,
        _viewport_x: f64,
        _viewport_y: f64,
    ) {
    }

    /// Movement resolution capability
    fn as_collision_resolver(&self) -> Option<&dyn CollisionResolver> {
        None
    }

    /// Layer and mask this component blocks movement with, if it is a blocker
    fn blocking_filter(&self) -> Option<CollisionFilter> {
        None
    }

    /// Removal animation capability
    fn as_removal_animation(&mut self) -> Option<&mut dyn RemovalAnimation> {
        None
    }

    /// Audio announcement capability
    fn as_audio_emitter(&mut self) -> Option<&mut dyn AudioEmitter> {
        None
    }
}

/// Clamps a requested single-axis movement against colliders
pub trait CollisionResolver {
    /// Resolve a movement of `mover` by `(amt_x, amt_y)`.
    ///
    /// Exactly one of the amounts is nonzero. The mover is not registered in
    /// `scene`'s index while this runs. Returns the permitted delta pair.
    ///
    /// Only blockers lying ahead of the mover stop it. A mover that already
    /// overlaps a blocker is neither stopped by it nor pushed out of it.
    fn resolve(&self, scene: &Scene, mover: &Aabb, amt_x: f64, amt_y: f64) -> (f64, f64);
}

/// Effect that defers an entity's structural removal
///
/// Once activated it must eventually call `EntityMut::force_remove` on its
/// owner to complete the removal.
pub trait RemovalAnimation {
    /// Start the effect
    fn activate(&mut self);

    /// Check whether the effect has been started
    fn is_active(&self) -> bool;
}

/// Plays named audio events
pub trait AudioEmitter {
    /// Play the sound bound to `event`
    fn play(&mut self, event: &str);
}
