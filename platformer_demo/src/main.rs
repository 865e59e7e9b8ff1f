//! Headless platformer demo
//!
//! Builds a small corridor level and steps it at a fixed rate, logging
//! pickups, unlocks and collisions. Run with `RUST_LOG=debug` for more
//! detail. An optional argument names a `.toml` or `.ron` scene config.

mod components;
mod level;

use components::{Inventory, Walker};
use level::Level;
use log::{debug, info};
use platformer_core::prelude::*;
use thiserror::Error;

const TICK_RATE: f64 = 60.0;
const TICKS: u32 = 60 * 8;
const FRAME_EVERY: u32 = 60;

/// Errors that end the demo early
#[derive(Error, Debug)]
enum DemoError {
    #[error("failed to load scene config: {0}")]
    Config(#[from] ConfigError),

    #[error("player entity {0} left the scene")]
    PlayerMissing(EntityId),
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading scene config from {path}");
            SceneConfig::load_from_file(&path)?
        }
        None => SceneConfig::default(),
    };

    let mut level = Level::build(config);
    info!("Running {TICKS} ticks at {TICK_RATE} Hz");

    for tick in 1..=TICKS {
        level.scene.update(1.0 / TICK_RATE);

        if tick % FRAME_EVERY == 0 {
            debug!("Tick {tick}:\n{}", level.render(32, 6));
        }
    }

    let player = level
        .scene
        .entity(level.player)
        .ok_or(DemoError::PlayerMissing(level.player))?;
    let aabb = player.aabb();
    info!("Player finished at ({:.2}, {:.2})", aabb.min_x(), aabb.min_y());

    if let Some(inventory) = player.component_as::<Inventory>(Inventory::tag()) {
        info!(
            "Score {} | health {} | lives {}",
            inventory.points(),
            inventory.health(),
            inventory.lives()
        );
        if let Some(next) = inventory.requested_level() {
            info!("Reached checkpoint {} and the exit to level {next}", inventory.checkpoint());
        }
    }
    if player
        .component_as::<Walker>(Walker::tag())
        .is_some_and(Walker::is_blocked)
    {
        info!("Player is standing against a wall");
    }
    info!("{} entities remain", level.scene.len());

    Ok(())
}
