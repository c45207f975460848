//! UFO status machine and arrival decisions.
//!
//! Pure functions over plain data. No ECS dependency.

use geoscape_core::enums::UfoStatus;
use geoscape_core::error::GeoscapeError;
use geoscape_core::types::{CraftId, UfoId};
use geoscape_core::Target;

/// Whether `from -> to` is a legal status change. Staying put is always legal.
pub fn can_transition(from: UfoStatus, to: UfoStatus) -> bool {
    use UfoStatus::*;
    if from == to {
        return true;
    }
    match from {
        Flying => matches!(to, Landed | Crashed | Destroyed),
        Landed => matches!(to, Flying | Destroyed),
        Crashed => to == Destroyed,
        Destroyed => false,
    }
}

/// Checked status change.
pub fn transition(from: UfoStatus, to: UfoStatus) -> Result<UfoStatus, GeoscapeError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(GeoscapeError::InvalidTransition { from, to })
    }
}

/// Situation of one UFO that just reached its destination.
pub struct ArrivalContext {
    pub status: UfoStatus,
    pub destination: Option<Target>,
    pub hunting: Option<CraftId>,
    /// The hunted craft is out on the globe and not already fighting.
    pub quarry_airborne: bool,
    pub escorting: Option<UfoId>,
    /// A hunter-killer fight already exists somewhere.
    pub hunter_killer_engaged: bool,
    /// The UFO is on its final approach to a player base.
    pub assaulting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalDecision {
    /// Nothing to do this tick.
    Hold,
    /// Open a hunter-killer interception against the craft.
    AttackCraft(CraftId),
    /// Land at a mission site or alien base.
    ArriveAt(Target),
    /// Land on a player base and start the assault.
    AssaultBase,
    /// Ask the mission for the next trajectory point.
    NextTrajectoryPoint,
    /// Drop a stale chase and fall back onto the trajectory.
    ResumeTrajectory,
}

/// Decide what a UFO does on arrival.
pub fn evaluate_arrival(ctx: &ArrivalContext) -> ArrivalDecision {
    if ctx.status != UfoStatus::Flying || ctx.escorting.is_some() {
        return ArrivalDecision::Hold;
    }

    match ctx.destination {
        Some(Target::Craft(craft)) => {
            if ctx.hunting != Some(craft) || !ctx.quarry_airborne {
                ArrivalDecision::ResumeTrajectory
            } else if ctx.hunter_killer_engaged {
                ArrivalDecision::Hold
            } else {
                ArrivalDecision::AttackCraft(craft)
            }
        }
        Some(target @ Target::MissionSite(_)) | Some(target @ Target::AlienBase(_)) => {
            ArrivalDecision::ArriveAt(target)
        }
        Some(Target::Ufo(_)) => ArrivalDecision::Hold,
        Some(Target::Waypoint(_)) | None => {
            if ctx.assaulting {
                ArrivalDecision::AssaultBase
            } else {
                ArrivalDecision::NextTrajectoryPoint
            }
        }
    }
}

/// An escort keeps following while its leader is still on the globe and airborne
/// or landed.
pub fn escort_holds(leader: Option<UfoStatus>) -> bool {
    matches!(leader, Some(UfoStatus::Flying) | Some(UfoStatus::Landed))
}
