//! Game-specific components
//!
//! These only talk to the core through component lookup and range visits.

use log::{info, trace, warn};
use platformer_core::prelude::*;
use std::collections::BTreeSet;
use std::sync::OnceLock;

macro_rules! registered_tag {
    ($name:literal) => {{
        static TAG: OnceLock<ComponentTag> = OnceLock::new();
        *TAG.get_or_init(|| ComponentTag::named($name))
    }};
}

/// Something the player can pick up
#[derive(Debug, Clone, Default)]
pub struct Collectable {
    /// Score awarded; negative values are penalties
    pub points: i32,
    /// Health restored
    pub health: i32,
    /// Extra lives awarded
    pub lives: u32,
    /// Checkpoint reached by taking this
    pub checkpoint: u32,
    /// Key item id; zero for plain pickups
    pub item_id: u32,
    /// Level to switch to once taken
    pub next_level: Option<u32>,
}

impl Collectable {
    /// Tag shared by all collectables
    pub fn tag() -> ComponentTag {
        registered_tag!("collectable")
    }

    /// Plain score pickup
    pub fn coin(points: i32) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Key opening every lock with the same id
    pub fn key(item_id: u32) -> Self {
        Self {
            item_id,
            ..Self::default()
        }
    }

    /// Checkpoint marker
    pub fn checkpoint(checkpoint: u32) -> Self {
        Self {
            checkpoint,
            ..Self::default()
        }
    }

    /// Level exit
    pub fn exit(next_level: u32) -> Self {
        Self {
            next_level: Some(next_level),
            ..Self::default()
        }
    }
}

impl Component for Collectable {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }
}

/// Obstacle that an inventory holding the right key removes
#[derive(Debug, Clone, Copy)]
pub struct Unlock {
    /// Key item id required; zero opens for anyone
    pub unlock_id: u32,
}

impl Unlock {
    /// Tag shared by all locks
    pub fn tag() -> ComponentTag {
        registered_tag!("unlock")
    }
}

impl Component for Unlock {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }
}

/// Player stats plus the pickup and unlock behavior
#[derive(Debug, Clone)]
pub struct Inventory {
    items: BTreeSet<u32>,
    points: i32,
    health: i32,
    max_health: i32,
    lives: u32,
    // Extra lives lost to penalties that later points must win back first
    life_deficit: i32,
    checkpoint: u32,
    points_for_extra_life: i32,
    requested_level: Option<u32>,
}

impl Inventory {
    /// Tag of the player inventory
    pub fn tag() -> ComponentTag {
        registered_tag!("inventory")
    }

    /// Create an inventory with starting stats
    pub fn new(health: i32, max_health: i32, lives: u32, points_for_extra_life: i32) -> Self {
        Self {
            items: BTreeSet::new(),
            points: 0,
            health,
            max_health,
            lives,
            life_deficit: 0,
            checkpoint: 0,
            points_for_extra_life,
            requested_level: None,
        }
    }

    /// Score so far
    pub const fn points(&self) -> i32 {
        self.points
    }

    /// Current health
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Remaining lives
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Furthest checkpoint reached
    pub const fn checkpoint(&self) -> u32 {
        self.checkpoint
    }

    /// Level the player asked to switch to by taking an exit
    pub const fn requested_level(&self) -> Option<u32> {
        self.requested_level
    }

    /// Check whether a key item is held
    pub fn has_item(&self, item_id: u32) -> bool {
        self.items.contains(&item_id)
    }

    fn add_points(&mut self, amount: i32) {
        let before = self.points;
        self.points += amount;

        if self.points_for_extra_life > 0 {
            let earned = self.points / self.points_for_extra_life - before / self.points_for_extra_life;
            if earned > 0 {
                self.add_lives(earned);
            } else {
                self.life_deficit += earned;
            }
        }
    }

    fn add_lives(&mut self, amount: i32) {
        self.life_deficit += amount;
        if self.life_deficit > 0 {
            info!("Extra life! ({})", self.life_deficit);
            self.lives += self.life_deficit.unsigned_abs();
            self.life_deficit = 0;
        }
    }

    fn add_health(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Whether `item` is worth picking up right now
    fn wants(&self, item: &Collectable) -> bool {
        if item.item_id != 0 {
            return !self.has_item(item.item_id);
        }
        item.health <= 0 || self.health < self.max_health || item.next_level.is_some()
    }

    fn pick_up(&mut self, item: &Collectable) {
        if item.item_id != 0 {
            self.items.insert(item.item_id);
        }
        self.add_points(item.points);
        self.add_health(item.health);
        self.lives += item.lives;
        self.checkpoint = self.checkpoint.max(item.checkpoint);
        if let Some(level) = item.next_level {
            info!("Level {level} requested");
            self.requested_level = Some(level);
        }
    }

    fn pick_up_in_range(&mut self, entity: &mut EntityMut<'_>) {
        let reach = entity.aabb();
        entity.visit_in_range(Collectable::tag(), &reach, |other, component| {
            let Some(item) = component.and_then(|c| c.as_any_mut().downcast_mut::<Collectable>()) else {
                warn!("Entity {}: collectable tag on a foreign component", other.id());
                return;
            };
            if self.wants(item) {
                trace!("Picked up {item:?} from {}", other.id());
                self.pick_up(item);
                other.remove();
            }
        });
    }

    fn unlock_in_range(&mut self, entity: &mut EntityMut<'_>) {
        let reach = entity.aabb().expand(1.0, 1.0, 0.0);
        entity.visit_in_range(Unlock::tag(), &reach, |other, component| {
            let Some(lock) = component.and_then(|c| c.as_any_mut().downcast_mut::<Unlock>()) else {
                return;
            };
            if lock.unlock_id == 0 || self.items.remove(&lock.unlock_id) {
                info!("Unlocked {} with key {}", other.id(), lock.unlock_id);
                other.remove();
            }
        });
    }
}

impl Component for Inventory {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }

    fn update(&mut self, entity: &mut EntityMut<'_>, _delta: f64) {
        self.pick_up_in_range(entity);
        self.unlock_in_range(entity);
    }
}

/// Walks right at constant speed and falls under constant gravity
#[derive(Debug, Clone, Copy)]
pub struct Walker {
    /// Horizontal speed in units per second
    pub speed: f64,
    /// Fall speed in units per second
    pub fall_speed: f64,
    blocked: bool,
}

impl Walker {
    /// Tag of the walker
    pub fn tag() -> ComponentTag {
        registered_tag!("walker")
    }

    /// Create a walker
    pub const fn new(speed: f64, fall_speed: f64) -> Self {
        Self {
            speed,
            fall_speed,
            blocked: false,
        }
    }

    /// Check whether the last step was cut short by a wall
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }
}

impl Component for Walker {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }

    fn update(&mut self, entity: &mut EntityMut<'_>, delta: f64) {
        // Two single-axis moves: fall first, then walk
        let steps = [(0.0, -self.fall_speed * delta), (self.speed * delta, 0.0)];
        for (dx, dy) in steps {
            match entity.move_by(dx, dy) {
                Ok(moved) if dx != 0.0 => {
                    let blocked = moved < dx;
                    if blocked && !self.blocked {
                        info!("Entity {}: walked into a wall at x={:.2}", entity.id(), entity.aabb().max_x());
                    }
                    self.blocked = blocked;
                }
                Ok(_) => {}
                Err(err) => warn!("Entity {}: {err}", entity.id()),
            }
        }
    }
}

/// Glyph drawn for the entity in the text renderer
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    /// Character drawn
    pub glyph: char,
}

impl Sprite {
    /// Tag of sprites
    pub fn tag() -> ComponentTag {
        registered_tag!("sprite")
    }
}

impl Component for Sprite {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }

    fn render(&self, entity: &Entity, target: &mut dyn RenderContext, viewport_x: f64, viewport_y: f64) {
        if let Some(frame) = target.as_any_mut().downcast_mut::<crate::level::TextFrame>() {
            let aabb = entity.aabb();
            frame.plot(aabb.min_x() - viewport_x, aabb.min_y() - viewport_y, self.glyph);
        }
    }
}

/// Audio sink that writes clip names to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play_clip(&mut self, clip: &str) {
        info!("Playing clip {clip}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_life_every_threshold() {
        let mut inventory = Inventory::new(3, 3, 1, 200);
        inventory.add_points(150);
        assert_eq!(inventory.lives(), 1);
        inventory.add_points(100);
        assert_eq!(inventory.lives(), 2);
        inventory.add_points(400);
        assert_eq!(inventory.lives(), 4);
    }

    #[test]
    fn test_penalty_must_be_won_back_before_extra_life() {
        let mut inventory = Inventory::new(3, 3, 1, 100);
        inventory.add_points(250);
        assert_eq!(inventory.lives(), 3);

        // Drops below two thresholds: the next two earned lives are forfeit
        inventory.add_points(-200);
        assert_eq!(inventory.points(), 50);
        assert_eq!(inventory.lives(), 3);

        inventory.add_points(200);
        assert_eq!(inventory.lives(), 3);
        inventory.add_points(100);
        assert_eq!(inventory.lives(), 4);
    }

    #[test]
    fn test_checkpoint_only_advances() {
        let mut inventory = Inventory::new(3, 3, 1, 0);
        inventory.pick_up(&Collectable::checkpoint(2));
        inventory.pick_up(&Collectable::checkpoint(1));
        assert_eq!(inventory.checkpoint(), 2);
    }

    #[test]
    fn test_exit_taken_at_full_health() {
        let mut inventory = Inventory::new(3, 3, 1, 0);
        let exit = Collectable {
            health: 1,
            ..Collectable::exit(4)
        };
        assert!(inventory.wants(&exit));
        inventory.pick_up(&exit);
        assert_eq!(inventory.requested_level(), Some(4));
    }

    #[test]
    fn test_health_pickup_skipped_at_full_health() {
        let inventory = Inventory::new(3, 3, 1, 0);
        let potion = Collectable {
            health: 1,
            ..Collectable::default()
        };
        assert!(!inventory.wants(&potion));
        assert!(inventory.wants(&Collectable::coin(10)));
    }

    #[test]
    fn test_key_collected_once() {
        let mut inventory = Inventory::new(3, 3, 1, 0);
        let key = Collectable::key(7);
        assert!(inventory.wants(&key));
        inventory.pick_up(&key);
        assert!(inventory.has_item(7));
        assert!(!inventory.wants(&key));
    }

    #[test]
    fn test_player_collects_coins_and_opens_door() {
        let mut scene = Scene::new(SceneConfig::default());
        let player = scene.spawn_with_aabb(Aabb::new(0.0, 0.0, 0.0, 1.0, 1.0));
        let coin = scene.spawn_with_aabb(Aabb::new(0.5, 0.0, 0.0, 1.0, 0.5));
        let key = scene.spawn_with_aabb(Aabb::new(0.0, 0.5, 0.0, 0.5, 1.0));
        let door = scene.spawn_with_aabb(Aabb::new(1.5, 0.0, 0.0, 2.5, 3.0));

        scene.entity_mut(player).unwrap().add_component(Inventory::new(3, 3, 1, 0));
        scene.entity_mut(coin).unwrap().add_component(Collectable::coin(100));
        scene.entity_mut(key).unwrap().add_component(Collectable::key(1));
        scene.entity_mut(door).unwrap().add_component(Unlock { unlock_id: 1 });

        scene.update(0.1);

        let inventory = scene
            .entity(player)
            .unwrap()
            .component_as::<Inventory>(Inventory::tag())
            .unwrap();
        assert_eq!(inventory.points(), 100);
        // The key is spent on the door in the same tick
        assert!(!inventory.has_item(1));
        assert!(scene.entity(coin).is_none());
        assert!(scene.entity(key).is_none());
        assert!(scene.entity(door).is_none());
    }
}
