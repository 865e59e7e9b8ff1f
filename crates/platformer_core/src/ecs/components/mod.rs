//! ECS Components module
//!
//! Reference components the core itself consults through reserved tags

pub mod audio;
pub mod blocker;
pub mod collision;
pub mod removal;

pub use audio::{AudioComponent, AudioSink};
pub use blocker::BlockerComponent;
pub use collision::CollisionComponent;
pub use removal::RemovalAnimationComponent;
