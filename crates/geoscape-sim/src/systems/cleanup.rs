//! End-of-step removal of destroyed UFOs.
//!
//! Nothing else despawns a UFO, so every reference to it (sessions, escorts,
//! craft destinations, its private waypoint) is settled here.

use hecs::Entity;

use geoscape_core::components::{Craft, Ufo, Waypoint};
use geoscape_core::enums::{DogfightEnd, UfoStatus};
use geoscape_core::types::{Position, UfoId};
use geoscape_core::Target;

use crate::context::SimContext;
use crate::systems::dogfight::finish_session;

pub fn run(ctx: &mut SimContext) {
    let destroyed: Vec<UfoId> = ctx
        .world
        .query::<&Ufo>()
        .iter()
        .filter(|(_, u)| u.status == UfoStatus::Destroyed)
        .map(|(_, u)| u.id)
        .collect();

    for ufo in destroyed {
        for session in ctx.dogfights.end_sessions_for_ufo(ufo) {
            finish_session(ctx, &session, DogfightEnd::UfoDestroyed);
        }

        // Escorts of a lost leader pick their own trajectory back up when
        // they next move.
        for (_, other) in ctx.world.query_mut::<&mut Ufo>() {
            if other.escorting == Some(ufo) {
                other.escorting = None;
                other.destination = None;
            }
        }

        // Craft chasing it fly home.
        for (_, craft) in ctx.world.query_mut::<&mut Craft>() {
            if craft.destination == Some(Target::Ufo(ufo)) {
                craft.destination = None;
                craft.returning = true;
            }
        }

        let waypoints: Vec<Entity> = ctx
            .world
            .query::<&Waypoint>()
            .iter()
            .filter(|(_, w)| w.owner == Some(ufo))
            .map(|(entity, _)| entity)
            .collect();
        for entity in waypoints {
            let id = ctx.world.get::<&Waypoint>(entity).map(|w| w.id);
            if let Ok(id) = id {
                ctx.despawn_target(Target::Waypoint(id));
            }
        }

        if let Some(entity) = ctx.registry.unregister(Target::Ufo(ufo)) {
            let pos = ctx.world.get::<&Position>(entity).map(|p| *p).ok();
            let _ = ctx.world.despawn(entity);
            tracing::debug!(target: "geoscape::ufo", ufo = %ufo, ?pos, "ufo.removed");
        }
    }
}
