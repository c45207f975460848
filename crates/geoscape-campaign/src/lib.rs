//! Monthly alien strategy for the Geoscape.
//!
//! Holds the strategy tables the aliens draw missions from and evaluates the
//! authored mission script once per simulated month.

pub mod script;
pub mod strategy;

pub use geoscape_core as core;
pub use script::{MissionRequest, ScriptContext, SiteChoice};
pub use strategy::AlienStrategy;
