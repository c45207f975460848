//! Read-only snapshot of the strategic layer for the screen layer.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::QueuedNotification;
use crate::target::Target;
use crate::types::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoscapeSnapshot {
    pub time: GameTime,
    pub suspension: Suspension,
    pub ufos: Vec<UfoView>,
    pub crafts: Vec<CraftView>,
    pub dogfights: Vec<DogfightView>,
    pub missions: Vec<MissionView>,
    pub pending_notifications: Vec<QueuedNotification>,
    pub funds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfoView {
    pub id: UfoId,
    pub rule_id: String,
    pub status: UfoStatus,
    pub position: Position,
    pub altitude: Altitude,
    pub detected: bool,
    pub hyper_detected: bool,
    pub shield: i32,
    pub shield_capacity: i32,
    pub damage: i32,
    pub hull: i32,
    pub hunter_killer: bool,
    pub hunting: Option<CraftId>,
    pub escorting: Option<UfoId>,
    pub mission: Option<MissionId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftView {
    pub id: CraftId,
    pub base: BaseId,
    pub status: CraftStatus,
    pub position: Position,
    pub fuel: i32,
    pub fuel_max: i32,
    pub damage: i32,
    pub hull: i32,
    pub destination: Option<Target>,
    pub returning: bool,
    pub in_dogfight: bool,
}

/// Interception session as seen by its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogfightView {
    pub craft: CraftId,
    pub ufo: UfoId,
    /// Zero while still pending.
    pub slot: u32,
    pub interception_count: u32,
    pub hunter_killer: bool,
    pub minimized: bool,
    pub waiting: Option<DogfightWait>,
    pub active: bool,
    pub rounds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionView {
    pub id: MissionId,
    pub rule_id: String,
    pub region: String,
    pub race: String,
    pub objective: MissionObjective,
    pub waves_spawned: usize,
    pub waves_total: usize,
    pub spawn_countdown_minutes: u32,
    pub alien_base: Option<AlienBaseId>,
}
