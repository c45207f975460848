//! UFO decision logic for the Geoscape.
//!
//! Implements the UFO status machine, arrival decisions, shield regeneration
//! and hunter-killer target selection as pure functions over plain data.

pub mod fsm;
pub mod hunting;
pub mod profiles;
pub mod shield;

pub use geoscape_core as core;
