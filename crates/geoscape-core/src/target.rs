//! Anything with a globe position that can serve as a destination.

use serde::{Deserialize, Serialize};

use crate::enums::TargetKind;
use crate::types::{AlienBaseId, CraftId, SiteId, UfoId, WaypointId};

/// Closed set of destinations. Behaviour that differs per kind is written as an
/// exhaustive `match`, so a new kind fails to compile until every site handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum Target {
    Ufo(UfoId),
    Waypoint(WaypointId),
    MissionSite(SiteId),
    AlienBase(AlienBaseId),
    Craft(CraftId),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Ufo(_) => TargetKind::Ufo,
            Target::Waypoint(_) => TargetKind::Waypoint,
            Target::MissionSite(_) => TargetKind::MissionSite,
            Target::AlienBase(_) => TargetKind::AlienBase,
            Target::Craft(_) => TargetKind::Craft,
        }
    }

    pub fn raw_id(&self) -> u32 {
        match *self {
            Target::Ufo(id) => id.0,
            Target::Waypoint(id) => id.0,
            Target::MissionSite(id) => id.0,
            Target::AlienBase(id) => id.0,
            Target::Craft(id) => id.0,
        }
    }

    pub fn as_ufo(&self) -> Option<UfoId> {
        match *self {
            Target::Ufo(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_craft(&self) -> Option<CraftId> {
        match *self {
            Target::Craft(id) => Some(id),
            _ => None,
        }
    }
}
