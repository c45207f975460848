//! Core types and definitions for the Geoscape simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! globe and calendar types, components, the target sum type, commands,
//! notifications, snapshots, the data-driven ruleset and the error taxonomy.
//! It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod dice;
pub mod enums;
pub mod error;
pub mod events;
pub mod geo;
pub mod ruleset;
pub mod state;
pub mod target;
pub mod types;
pub mod weights;

pub use error::GeoscapeError;
pub use target::Target;

#[cfg(test)]
mod tests;
