//! Tick handlers and per-advance systems.
//!
//! Systems are plain functions over `&mut SimContext`. They own no state; all
//! state lives in components, the coordinator and the mission list.

pub mod activity;
pub mod cleanup;
pub mod clock;
pub mod combat;
pub mod craft;
pub mod detection;
pub mod dogfight;
pub mod hunting;
pub mod missions;
pub mod snapshot;
pub mod ufo;
