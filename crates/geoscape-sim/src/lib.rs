//! Geoscape simulation engine.
//!
//! Owns the hecs ECS world, advances the calendar in 5-second steps, cascades
//! trigger handlers, runs interceptions and alien missions, and produces
//! `GeoscapeSnapshot`s for the screen layer.

pub mod context;
pub mod dogfight;
pub mod engine;
pub mod mission;
pub mod notifications;
pub mod registry;
pub mod systems;

pub use engine::{AdvanceReport, GeoscapeEngine, SimConfig};
pub use geoscape_core as core;

#[cfg(test)]
mod tests;
