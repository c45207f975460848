//! Hunter-killer target selection, every 10 minutes.

use hecs::Entity;

use geoscape_core::components::{Craft, Ufo};
use geoscape_core::enums::{HuntMode, UfoStatus};
use geoscape_core::error::GeoscapeError;
use geoscape_core::events::Notification;
use geoscape_core::types::{CraftId, Position, UfoId};
use geoscape_core::Target;

use geoscape_ufo_ai::hunting::{select_target, HuntCandidate, HuntDecision};

use crate::context::SimContext;
use crate::systems;

struct Hunter {
    entity: Entity,
    id: UfoId,
    pos: Position,
    mode: HuntMode,
    radius_nm: f64,
    current: Option<CraftId>,
    detected: bool,
}

pub fn run(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let mut hunters: Vec<Hunter> = ctx
        .world
        .query::<(&Ufo, &Position)>()
        .iter()
        .filter(|(_, (u, _))| {
            u.stats.hunter_killer && u.status == UfoStatus::Flying && u.escorting.is_none()
        })
        .map(|(entity, (u, pos))| Hunter {
            entity,
            id: u.id,
            pos: *pos,
            mode: u.stats.hunt_mode,
            radius_nm: u.stats.hunt_radius_nm,
            current: u.hunting,
            detected: u.detected,
        })
        .collect();
    hunters.sort_by_key(|h| h.id);

    for hunter in hunters {
        // Already fighting: leave the target alone until the session ends.
        if ctx.dogfights.has_session_for_ufo(hunter.id) {
            continue;
        }
        let candidates = candidates_around(ctx, &hunter.pos);
        let decision = select_target(hunter.mode, hunter.radius_nm, hunter.current, &candidates);
        match decision {
            HuntDecision::Idle | HuntDecision::Keep(_) => {}
            HuntDecision::Switch(craft) => {
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(hunter.entity) {
                    ufo.hunting = Some(craft);
                }
                systems::ufo::set_destination(ctx, hunter.entity, Some(Target::Craft(craft)));
                tracing::info!(target: "geoscape::ufo", ufo = %hunter.id, craft = %craft, "ufo.hunting");
                if hunter.detected {
                    ctx.notify(Notification::HunterKillerTarget {
                        ufo: hunter.id,
                        craft,
                    });
                }
            }
            HuntDecision::Disengage => {
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(hunter.entity) {
                    ufo.hunting = None;
                }
                tracing::debug!(target: "geoscape::ufo", ufo = %hunter.id, "ufo.hunt_abandoned");
                systems::missions::resume_trajectory(ctx, hunter.entity)?;
            }
        }
    }
    Ok(())
}

fn candidates_around(ctx: &SimContext, origin: &Position) -> Vec<HuntCandidate> {
    let mut candidates: Vec<HuntCandidate> = ctx
        .world
        .query::<(&Craft, &Position)>()
        .iter()
        .map(|(_, (c, pos))| HuntCandidate {
            craft: c.id,
            role: c.role,
            status: c.status,
            distance_nm: origin.distance_nm(pos),
            hk_attraction: c.hk_attraction,
            in_dogfight: c.in_dogfight,
        })
        .collect();
    candidates.sort_by_key(|c| c.craft);
    candidates
}
