//! Interception bookkeeping on the world side: gating sessions on altitude
//! and terrain, starting hunter-killer attacks and releasing craft when a
//! session ends.

use std::sync::Arc;

use geoscape_core::components::{Craft, Ufo};
use geoscape_core::constants::{ESCORT_JOIN_RANGE_NM, MAX_ESCORT_JOINERS};
use geoscape_core::enums::{CraftStatus, CraftTerrain, DogfightEnd, DogfightWait, UfoStatus};
use geoscape_core::events::Notification;
use geoscape_core::types::{CraftId, Position, UfoId};
use geoscape_core::Target;

use crate::context::SimContext;
use crate::dogfight::{Admission, DogfightSession};

/// Per step: craft in a session shadow their UFO; sessions the craft cannot
/// fight are held minimized until the UFO comes within reach again.
pub fn gate(ctx: &mut SimContext) {
    let ruleset = Arc::clone(&ctx.ruleset);
    let sessions: Vec<(CraftId, UfoId)> = ctx
        .dogfights
        .active()
        .iter()
        .map(|s| (s.craft, s.ufo))
        .collect();

    let mut ended = Vec::new();
    for (craft, ufo) in sessions {
        let Some(craft_entity) = ctx.registry.craft(craft) else {
            ended.push((craft, DogfightEnd::Cancelled));
            continue;
        };
        let ufo_state = ctx
            .registry
            .ufo(ufo)
            .and_then(|e| ctx.world.get::<&Ufo>(e).ok().map(|u| (u.status, u.altitude)));
        // Cleanup ends these at the close of the step.
        if matches!(ufo_state, Some((UfoStatus::Destroyed, _))) {
            continue;
        }
        let ufo_pos = ctx.registry.position(&ctx.world, Target::Ufo(ufo));
        let (Some((UfoStatus::Flying, altitude)), Some(pos)) = (ufo_state, ufo_pos) else {
            ended.push((craft, DogfightEnd::Cancelled));
            continue;
        };

        let Ok((max_altitude, terrain)) = ctx
            .world
            .get::<&Craft>(craft_entity)
            .map(|c| (c.max_altitude, c.terrain))
        else {
            ended.push((craft, DogfightEnd::Cancelled));
            continue;
        };
        if let Ok(mut craft_pos) = ctx.world.get::<&mut Position>(craft_entity) {
            *craft_pos = pos;
        }

        let over_land = ruleset.is_land(&pos);
        let waiting = if altitude > max_altitude {
            Some(DogfightWait::Altitude)
        } else {
            match terrain {
                CraftTerrain::WaterOnly if over_land => Some(DogfightWait::Terrain),
                CraftTerrain::LandOnly if !over_land => Some(DogfightWait::Terrain),
                _ => None,
            }
        };

        if let Some(session) = ctx
            .dogfights
            .active_mut()
            .iter_mut()
            .find(|s| s.craft == craft)
        {
            match (session.waiting, waiting) {
                (None, Some(reason)) => {
                    session.minimized = true;
                    tracing::debug!(target: "geoscape::dogfight", craft = %craft, ?reason, "dogfight.waiting");
                }
                (Some(_), None) => {
                    session.minimized = false;
                    tracing::debug!(target: "geoscape::dogfight", craft = %craft, "dogfight.resumed");
                }
                _ => {}
            }
            session.waiting = waiting;
        }
    }

    for (craft, end) in ended {
        if let Some(session) = ctx.dogfights.end_sessions_for_craft(craft) {
            finish_session(ctx, &session, end);
        }
    }
}

/// Player breaks off an interception; the craft heads home.
pub fn disengage(ctx: &mut SimContext, craft: CraftId) {
    if let Some(session) = ctx.dogfights.disengage(craft) {
        finish_session(ctx, &session, DogfightEnd::Disengaged);
    }
}

/// A hunter-killer UFO caught its craft.
pub fn start_hunter_killer(ctx: &mut SimContext, ufo: UfoId, craft: CraftId) {
    let escorts = if ctx.config.escorts_join_fight {
        nearby_escorts(ctx, craft)
    } else {
        Vec::new()
    };
    let (admission, cancelled) = ctx.dogfights.request_hunter_killer(craft, ufo, &escorts);
    for session in &cancelled {
        finish_session(ctx, session, DogfightEnd::Cancelled);
    }
    if admission != Admission::Admitted {
        tracing::debug!(target: "geoscape::dogfight", ufo = %ufo, craft = %craft, ?admission, "dogfight.hunter_killer_refused");
        return;
    }

    for id in std::iter::once(craft).chain(escorts.iter().copied()) {
        if let Some(entity) = ctx.registry.craft(id) {
            if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
                c.in_dogfight = true;
            }
        }
    }
    ctx.attacking.insert(Target::Ufo(ufo));
    ctx.attacking.insert(Target::Craft(craft));
}

/// Armed craft out on patrol close enough to join a fight beside `main`.
fn nearby_escorts(ctx: &SimContext, main: CraftId) -> Vec<CraftId> {
    let Some(origin) = ctx.registry.position(&ctx.world, Target::Craft(main)) else {
        return Vec::new();
    };
    ctx.registry
        .targets_within(&ctx.world, &origin, ESCORT_JOIN_RANGE_NM, |target| {
            matches!(target, Target::Craft(id) if id != main)
        })
        .into_iter()
        .filter_map(|(target, _)| target.as_craft())
        .filter(|&id| {
            ctx.registry
                .craft(id)
                .and_then(|e| ctx.world.get::<&Craft>(e).ok().map(|c| {
                    c.status == CraftStatus::Out && !c.in_dogfight && c.has_loaded_weapon()
                }))
                .unwrap_or(false)
        })
        .take(MAX_ESCORT_JOINERS)
        .collect()
}

/// Release the craft of a session that the coordinator already removed.
pub fn finish_session(ctx: &mut SimContext, session: &DogfightSession, end: DogfightEnd) {
    tracing::info!(
        target: "geoscape::dogfight",
        craft = %session.craft,
        ufo = %session.ufo,
        rounds = session.rounds,
        ?end,
        "dogfight.ended"
    );
    if end == DogfightEnd::CraftDestroyed {
        ctx.despawn_target(Target::Craft(session.craft));
        ctx.notify(Notification::CraftDestroyed {
            craft: session.craft,
        });
        return;
    }
    let Some(entity) = ctx.registry.craft(session.craft) else {
        return;
    };
    if let Ok(mut craft) = ctx.world.get::<&mut Craft>(entity) {
        craft.in_dogfight = false;
        if end != DogfightEnd::Cancelled && craft.status == CraftStatus::Out {
            craft.returning = true;
            craft.destination = None;
        }
    }
}
