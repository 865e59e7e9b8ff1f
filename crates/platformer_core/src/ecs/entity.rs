//! Entity implementation
//!
//! An [`Entity`] owns its bounding box and an ordered list of components.
//! Operations that touch the spatial index (movement, removal, range
//! visits, the update pass) live on [`crate::ecs::EntityMut`], which pairs
//! an entity with the scene it is registered in.

use crate::ecs::{Component, ComponentHandle, ComponentTag};
use crate::render::RenderContext;
use crate::spatial::Aabb;
use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;

/// Entity identifier
///
/// Totally ordered by allocation order; used for deterministic iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Get the raw id
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing entity ids
///
/// One allocator is normally shared by every scene of a process so ids stay
/// unique across level reloads. Tests construct independent allocators.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    /// Create an allocator starting at zero
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose first id is `first`
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: Cell::new(first),
        }
    }

    /// Allocate the next id
    pub fn next_id(&self) -> EntityId {
        let id = self.next.get();
        self.next.set(id + 1);
        EntityId(id)
    }

    /// Id the next call to [`Self::next_id`] will return
    pub fn peek(&self) -> EntityId {
        EntityId(self.next.get())
    }

    /// Restart numbering from zero
    ///
    /// Only safe once every entity allocated so far has been dropped.
    pub fn reset(&self) {
        self.next.set(0);
    }
}

/// Removal lifecycle of an entity
///
/// `Active -> PendingRemoval -> Removed` when a removal animation runs,
/// `Active -> Removed` otherwise. `Removed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Live and registered in the spatial index
    Active,
    /// Flagged removed; still indexed until its removal animation completes
    PendingRemoval,
    /// Struck from the spatial index
    Removed,
}

/// Attached component plus the bookkeeping the entity needs for it
pub(crate) struct ComponentSlot {
    handle: ComponentHandle,
    tag: ComponentTag,
    // None while the component is running its own update or being visited
    component: Option<Box<dyn Component>>,
}

/// Aggregate owning a bounding box and an ordered list of components
pub struct Entity {
    id: EntityId,
    aabb: Aabb,
    components: Vec<ComponentSlot>,
    pending_removal: HashSet<ComponentHandle>,
    state: EntityState,
    next_component: u32,
    pub(crate) updating: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, aabb: Aabb) -> Self {
        Self {
            id,
            aabb,
            components: Vec::new(),
            pending_removal: HashSet::new(),
            state: EntityState::Active,
            next_component: 0,
            updating: false,
        }
    }

    /// Get the entity ID
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Current bounding box
    pub const fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub(crate) fn set_aabb(&mut self, aabb: Aabb) {
        self.aabb = aabb;
    }

    /// Removal lifecycle state
    pub const fn state(&self) -> EntityState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    /// Check whether `remove` or `force_remove` has been called
    pub fn is_removed(&self) -> bool {
        self.state != EntityState::Active
    }

    /// First attached component with `tag`
    pub fn component(&self, tag: ComponentTag) -> Option<&dyn Component> {
        self.components
            .iter()
            .filter(|slot| slot.tag == tag)
            .find_map(|slot| slot.component.as_deref())
    }

    /// Mutable access to the first attached component with `tag`
    pub fn component_mut(&mut self, tag: ComponentTag) -> Option<&mut dyn Component> {
        for slot in &mut self.components {
            if slot.tag != tag {
                continue;
            }
            if let Some(component) = slot.component.as_mut() {
                return Some(&mut **component);
            }
        }
        None
    }

    /// Component with `tag`, downcast to its concrete type
    pub fn component_as<T: Component>(&self, tag: ComponentTag) -> Option<&T> {
        self.component(tag)?.as_any().downcast_ref::<T>()
    }

    /// Mutable component with `tag`, downcast to its concrete type
    pub fn component_as_mut<T: Component>(&mut self, tag: ComponentTag) -> Option<&mut T> {
        self.component_mut(tag)?.as_any_mut().downcast_mut::<T>()
    }

    /// Component attached under `handle`
    pub fn component_by_handle(&self, handle: ComponentHandle) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|slot| slot.handle == handle)
            .and_then(|slot| slot.component.as_deref())
    }

    /// Check whether a component with `tag` is attached
    pub fn has_component(&self, tag: ComponentTag) -> bool {
        self.component(tag).is_some()
    }

    /// Number of owned components, including any queued for removal
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Tags of owned components in insertion order
    pub fn tags(&self) -> impl Iterator<Item = ComponentTag> + '_ {
        self.components.iter().map(|slot| slot.tag)
    }

    /// Number of components queued for removal at the next update
    pub fn pending_removals(&self) -> usize {
        self.pending_removal.len()
    }

    /// Append a component; it joins the update order after existing ones
    pub fn add_component<C: Component>(&mut self, component: C) -> ComponentHandle {
        self.add_boxed(Box::new(component))
    }

    /// Append an already boxed component
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> ComponentHandle {
        let handle = ComponentHandle::new(self.id, self.next_component);
        self.next_component += 1;
        self.components.push(ComponentSlot {
            handle,
            tag: component.tag(),
            component: Some(component),
        });
        handle
    }

    /// Queue a component for removal at the start of the next update
    pub fn remove_component(&mut self, handle: ComponentHandle) {
        if handle.owner() == self.id {
            self.pending_removal.insert(handle);
        }
    }

    /// Queue every current component with `tag` for removal
    ///
    /// Returns how many components were queued.
    pub fn remove_components(&mut self, tag: ComponentTag) -> usize {
        let before = self.pending_removal.len();
        self.pending_removal.extend(
            self.components
                .iter()
                .filter(|slot| slot.tag == tag)
                .map(|slot| slot.handle),
        );
        self.pending_removal.len() - before
    }

    /// Drop every queued component and clear the queue
    pub(crate) fn apply_pending_removals(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }

        let pending = std::mem::take(&mut self.pending_removal);
        self.components.retain(|slot| !pending.contains(&slot.handle));
        log::trace!("Entity {}: dropped {} components", self.id, pending.len());
    }

    /// Take the component at `index` out of its slot
    pub(crate) fn detach_at(&mut self, index: usize) -> Option<(ComponentHandle, Box<dyn Component>)> {
        let slot = self.components.get_mut(index)?;
        let component = slot.component.take()?;
        Some((slot.handle, component))
    }

    /// Take the first attached component with `tag` out of its slot
    pub(crate) fn detach_tagged(
        &mut self,
        tag: ComponentTag,
    ) -> Option<(ComponentHandle, Box<dyn Component>)> {
        let slot = self
            .components
            .iter_mut()
            .find(|slot| slot.tag == tag && slot.component.is_some())?;
        let component = slot.component.take()?;
        Some((slot.handle, component))
    }

    /// Put a detached component back into its slot
    pub(crate) fn reattach(&mut self, handle: ComponentHandle, component: Box<dyn Component>) {
        if let Some(slot) = self.components.iter_mut().find(|slot| slot.handle == handle) {
            slot.component = Some(component);
        }
    }

    /// Forward the render pass to every component in insertion order
    pub fn render(&self, target: &mut dyn RenderContext, viewport_x: f64, viewport_y: f64) {
        for component in self.components.iter().filter_map(|slot| slot.component.as_deref()) {
            component.render(self, target, viewport_x, viewport_y);
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("aabb", &self.aabb)
            .field("state", &self.state)
            .field("tags", &self.tags().collect::<Vec<_>>())
            .field("pending_removal", &self.pending_removal.len())
            .finish()
    }
}
