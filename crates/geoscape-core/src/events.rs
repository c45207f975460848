//! Notifications emitted by the simulation for the screen layer.

use serde::{Deserialize, Serialize};

use crate::enums::CraftStatus;
use crate::target::Target;
use crate::types::*;

/// Typed pop-up request. The simulation stops stepping while any is queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    UfoDetected { ufo: UfoId, hyper: bool },
    UfoLost { ufo: UfoId },
    LowFuel { craft: CraftId },
    BaseUnderAttack { base: BaseId, ufo: UfoId },
    /// A hunter-killer picked a new craft to chase.
    HunterKillerTarget { ufo: UfoId, craft: CraftId },
    CraftReachedWaypoint { craft: CraftId, waypoint: WaypointId },
    /// Craft is over a landed UFO, crash site, mission site or alien base.
    CraftReadyToLand { craft: CraftId, target: Target },
    CraftDestroyed { craft: CraftId },
    NotEnoughItem {
        craft: CraftId,
        base: BaseId,
        item: String,
        status: CraftStatus,
    },
    MissionSiteDetected { site: SiteId },
    AlienBaseDetected { base: AlienBaseId },
    ProductionComplete { base: BaseId, item: String },
    ResearchComplete { topic: String },
    Error { message: String },
}

/// A notification stamped with its enqueue order and game time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedNotification {
    pub seq: u64,
    pub time: GameTime,
    pub notification: Notification,
}
