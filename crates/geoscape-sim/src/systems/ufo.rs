//! UFO lifecycle system: shields, movement, arrival decisions, landed and
//! crash timers.
//!
//! Calls the pure decision functions from geoscape-ufo-ai, then applies the
//! result to ECS components.

use std::sync::Arc;

use hecs::Entity;

use geoscape_core::components::{Craft, Ufo, Waypoint};
use geoscape_core::constants::SECONDS_PER_STEP;
use geoscape_core::enums::{CraftStatus, UfoStatus};
use geoscape_core::error::GeoscapeError;
use geoscape_core::events::Notification;
use geoscape_core::types::{CraftId, Position, UfoId};
use geoscape_core::Target;

use geoscape_ufo_ai::fsm::{self, escort_holds, evaluate_arrival, ArrivalContext, ArrivalDecision};
use geoscape_ufo_ai::shield;

use crate::context::SimContext;
use crate::systems;

/// Seconds in one 30-minute tick.
const THIRTY_MINUTES_SECS: u32 = 30 * 60;

/// Per 5 seconds: every flying UFO recharges, moves and decides; landed UFOs
/// count down to liftoff.
pub fn run(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let mut ufos: Vec<(Entity, UfoId, UfoStatus)> = ctx
        .world
        .query::<&Ufo>()
        .iter()
        .map(|(entity, ufo)| (entity, ufo.id, ufo.status))
        .collect();
    ufos.sort_by_key(|&(_, id, _)| id);

    for (entity, id, status) in ufos {
        if !ctx.world.contains(entity) {
            continue;
        }
        match status {
            UfoStatus::Flying => fly(ctx, entity, id)?,
            UfoStatus::Landed => landed_tick(ctx, entity)?,
            UfoStatus::Crashed | UfoStatus::Destroyed => {}
        }
    }
    Ok(())
}

fn fly(ctx: &mut SimContext, entity: Entity, id: UfoId) -> Result<(), GeoscapeError> {
    let (destination, speed, escorting, hunting, assaulting) = {
        let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) else {
            return Ok(());
        };
        ufo.shield = shield::recharge(
            ufo.shield,
            ufo.stats.shield_capacity,
            ufo.stats.shield_recharge,
            &mut ctx.rng,
        );
        // A status change earlier in this step (crash, escape) ends the turn.
        if ufo.status != UfoStatus::Flying {
            return Ok(());
        }
        (
            ufo.destination,
            ufo.speed,
            ufo.escorting,
            ufo.hunting,
            ufo.assault_base.is_some(),
        )
    };

    if ctx.attacking.contains(&Target::Ufo(id)) {
        return Ok(());
    }

    if let Some(leader) = escorting {
        let leader_status = ctx
            .registry
            .ufo(leader)
            .and_then(|e| ctx.world.get::<&Ufo>(e).ok().map(|u| u.status));
        if !escort_holds(leader_status) {
            if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                ufo.escorting = None;
            }
            set_destination(ctx, entity, None);
            tracing::debug!(target: "geoscape::ufo", ufo = %id, "ufo.escort_released");
            return systems::missions::resume_trajectory(ctx, entity);
        }
    }

    // A fight this UFO is already part of keeps its quarry in the air.
    let quarry_airborne = match destination {
        Some(Target::Craft(craft)) => {
            ctx.dogfights.has_session_for_ufo(id) || craft_airborne(ctx, craft)
        }
        _ => true,
    };

    let dest_pos = match destination {
        Some(Target::Craft(_)) if !quarry_airborne => {
            // The hunted craft docked or got pulled into another fight.
            if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                ufo.destination = None;
                ufo.hunting = None;
            }
            tracing::debug!(target: "geoscape::ufo", ufo = %id, "ufo.hunt_dropped");
            return systems::missions::resume_trajectory(ctx, entity);
        }
        Some(target) => match ctx.registry.position(&ctx.world, target) {
            Some(pos) => Some(pos),
            None => {
                // Stale destination: the target vanished this tick.
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                    ufo.destination = None;
                    if matches!(target, Target::Craft(_)) {
                        ufo.hunting = None;
                    }
                }
                return systems::missions::resume_trajectory(ctx, entity);
            }
        },
        None => None,
    };

    let mut reached = dest_pos.is_none();
    if let Some(dest) = dest_pos {
        if let Ok(mut pos) = ctx.world.get::<&mut Position>(entity) {
            let (next, arrived) = pos.step_toward(&dest, Position::step_angle(speed));
            *pos = next;
            reached = arrived;
        }
    }
    if !reached {
        return Ok(());
    }

    let decision = evaluate_arrival(&ArrivalContext {
        status: UfoStatus::Flying,
        destination,
        hunting,
        quarry_airborne,
        escorting,
        hunter_killer_engaged: ctx.dogfights.has_hunter_killer(),
        assaulting,
    });

    match decision {
        ArrivalDecision::Hold => Ok(()),
        ArrivalDecision::AttackCraft(craft) => {
            systems::dogfight::start_hunter_killer(ctx, id, craft);
            Ok(())
        }
        ArrivalDecision::ArriveAt(_) | ArrivalDecision::NextTrajectoryPoint => {
            systems::missions::ufo_arrived(ctx, entity)
        }
        ArrivalDecision::AssaultBase => assault_base(ctx, entity),
        ArrivalDecision::ResumeTrajectory => {
            if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                ufo.hunting = None;
            }
            systems::missions::resume_trajectory(ctx, entity)
        }
    }
}

/// A craft a hunter-killer may still close on: out and not in a dogfight.
fn craft_airborne(ctx: &SimContext, craft: CraftId) -> bool {
    ctx.registry
        .entity(Target::Craft(craft))
        .and_then(|e| ctx.world.get::<&Craft>(e).ok())
        .map(|c| c.status == CraftStatus::Out && !c.in_dogfight)
        .unwrap_or(false)
}

fn landed_tick(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    let lift_off = {
        let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) else {
            return Ok(());
        };
        ufo.seconds_remaining = ufo.seconds_remaining.saturating_sub(SECONDS_PER_STEP);
        ufo.seconds_remaining == 0
    };
    if lift_off {
        set_status(ctx, entity, UfoStatus::Flying)?;
        systems::missions::advance_trajectory(ctx, entity)?;
    }
    Ok(())
}

fn assault_base(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    let (id, base, trajectory) = {
        let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) else {
            return Ok(());
        };
        (ufo.id, ufo.assault_base.take(), ufo.trajectory.clone())
    };
    let Some(base) = base else {
        return Ok(());
    };
    let ground_secs = ruleset.trajectory(&trajectory)?.ground_timer_secs;
    set_status(ctx, entity, UfoStatus::Landed)?;
    if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
        ufo.seconds_remaining = ground_secs;
    }
    set_destination(ctx, entity, None);
    tracing::warn!(target: "geoscape::ufo", ufo = %id, base = %base, "ufo.base_assault");
    ctx.notify(Notification::BaseUnderAttack { base, ufo: id });
    Ok(())
}

/// Per 30 minutes: crash sites count down and disappear.
pub fn crash_expiry(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let mut expired = Vec::new();
    for (entity, ufo) in ctx.world.query_mut::<&mut Ufo>() {
        if ufo.status != UfoStatus::Crashed {
            continue;
        }
        ufo.seconds_remaining = ufo.seconds_remaining.saturating_sub(THIRTY_MINUTES_SECS);
        if ufo.seconds_remaining == 0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        set_status(ctx, entity, UfoStatus::Destroyed)?;
    }
    Ok(())
}

/// Checked status change through the lifecycle machine.
pub fn set_status(ctx: &mut SimContext, entity: Entity, to: UfoStatus) -> Result<(), GeoscapeError> {
    let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) else {
        return Ok(());
    };
    let from = ufo.status;
    ufo.status = fsm::transition(from, to)?;
    if from != to {
        if to != UfoStatus::Flying {
            ufo.hunting = None;
            ufo.escorting = None;
        }
        tracing::debug!(
            target: "geoscape::ufo",
            ufo = %ufo.id,
            ?from,
            ?to,
            "ufo.status"
        );
    }
    Ok(())
}

/// Replace a UFO's destination, dropping the private waypoint it leaves behind.
pub fn set_destination(ctx: &mut SimContext, entity: Entity, destination: Option<Target>) {
    let old = match ctx.world.get::<&mut Ufo>(entity) {
        Ok(mut ufo) => std::mem::replace(&mut ufo.destination, destination),
        Err(_) => return,
    };
    if old == destination {
        return;
    }
    if let Some(target @ Target::Waypoint(_)) = old {
        let owned = ctx
            .registry
            .entity(target)
            .and_then(|e| ctx.world.get::<&Waypoint>(e).ok().map(|w| w.owner.is_some()))
            .unwrap_or(false);
        if owned {
            ctx.despawn_target(target);
        }
    }
}
