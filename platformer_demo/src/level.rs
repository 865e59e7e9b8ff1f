//! Demo level construction and a text renderer

use crate::components::{Collectable, Inventory, LogSink, Sprite, Unlock, Walker};
use log::debug;
use platformer_core::ecs::REMOVE_EVENT;
use platformer_core::prelude::*;
use std::fmt;

/// Character grid the sprites draw into
pub struct TextFrame {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl TextFrame {
    /// Create a blank frame
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec!['.'; width * height],
        }
    }

    /// Draw a glyph at a viewport-relative position; off-screen is ignored
    pub fn plot(&mut self, x: f64, y: f64, glyph: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (x.floor() as usize, y.floor() as usize);
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = glyph;
        }
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Row zero is the ground, so print top down
        for row in self.cells.chunks(self.width).rev() {
            writeln!(f, "{}", row.iter().collect::<String>())?;
        }
        Ok(())
    }
}

/// A built level and the id of its player
pub struct Level {
    /// Scene holding every entity of the level
    pub scene: Scene,
    /// The walking player
    pub player: EntityId,
}

impl Level {
    /// Build the demo level: a corridor with coins, a key, a locked door and an exit
    pub fn build(config: SceneConfig) -> Self {
        let mut scene = Scene::new(config);

        spawn_solid(&mut scene, Aabb::new(-2.0, -1.0, 0.0, 30.0, 0.0), '=');
        spawn_solid(&mut scene, Aabb::new(-3.0, 0.0, 0.0, -2.0, 6.0), '#');
        spawn_solid(&mut scene, Aabb::new(25.0, 0.0, 0.0, 26.0, 6.0), '#');

        let player = scene.spawn_with_aabb(Aabb::new(0.0, 2.0, 0.0, 1.0, 4.0));
        if let Some(mut entity) = scene.entity_mut(player) {
            entity.add_component(CollisionComponent::with_mask(CollisionLayers::SOLID));
            entity.add_component(Inventory::new(2, 3, 1, 300));
            entity.add_component(Walker::new(4.0, 8.0));
            entity.add_component(Sprite { glyph: '@' });
        }

        for x in [3.0, 5.0, 7.0, 11.0] {
            spawn_pickup(&mut scene, x, Collectable::coin(100), 'o');
        }
        spawn_pickup(
            &mut scene,
            9.0,
            Collectable {
                health: 1,
                ..Collectable::default()
            },
            '+',
        );
        spawn_pickup(&mut scene, 12.0, Collectable::key(1), 'k');
        spawn_pickup(&mut scene, 14.0, Collectable::checkpoint(1), 'c');
        spawn_pickup(&mut scene, 22.0, Collectable::exit(2), 'E');

        let door = scene.spawn_with_aabb(Aabb::new(16.0, 0.0, 0.0, 17.0, 4.0));
        if let Some(mut entity) = scene.entity_mut(door) {
            entity.add_component(BlockerComponent::new(CollisionLayers::DOOR));
            entity.add_component(Unlock { unlock_id: 1 });
            entity.add_component(RemovalAnimationComponent::new(0.5));
            entity.add_component(
                AudioComponent::new(Box::new(LogSink)).with_sound(REMOVE_EVENT, "door_open.wav"),
            );
            entity.add_component(Sprite { glyph: '|' });
        }

        debug!("Level built with {} entities", scene.len());
        Self { scene, player }
    }

    /// Draw the level into a fresh frame
    pub fn render(&self, width: usize, height: usize) -> TextFrame {
        let mut frame = TextFrame::new(width, height);
        self.scene.render(&mut frame, -3.0, 0.0);
        frame
    }
}

fn spawn_solid(scene: &mut Scene, aabb: Aabb, glyph: char) -> EntityId {
    let id = scene.spawn_with_aabb(aabb);
    if let Some(mut entity) = scene.entity_mut(id) {
        entity.add_component(BlockerComponent::environment());
        entity.add_component(Sprite { glyph });
    }
    id
}

fn spawn_pickup(scene: &mut Scene, x: f64, item: Collectable, glyph: char) -> EntityId {
    let id = scene.spawn_with_aabb(Aabb::new(x, 0.0, 0.0, x + 0.5, 0.5));
    if let Some(mut entity) = scene.entity_mut(id) {
        entity.add_component(item);
        entity.add_component(RemovalAnimationComponent::new(0.1));
        entity.add_component(
            AudioComponent::new(Box::new(LogSink)).with_sound(REMOVE_EVENT, "pickup.wav"),
        );
        entity.add_component(Sprite { glyph });
    }
    id
}
