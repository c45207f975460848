//! One exchange of fire per on-screen interception.
//!
//! Runs once per `advance` while the engine is intercepting. Craft weapons
//! fire first; a UFO that survives fires back.

use std::sync::Arc;

use geoscape_core::components::{Craft, Ufo};
use geoscape_core::constants::{CRASH_SITE_HOURS_MAX, CRASH_SITE_HOURS_MIN};
use geoscape_core::dice::Dice;
use geoscape_core::enums::{DogfightEnd, UfoStatus};
use geoscape_core::ruleset::Ruleset;
use geoscape_core::types::{CraftId, Position, UfoId};

use crate::context::SimContext;
use crate::systems::dogfight::finish_session;
use crate::systems::ufo::set_status;

/// Fight one round in every foreground session. Returns the rounds fought.
pub fn run_round(ctx: &mut SimContext) -> u32 {
    let ruleset = Arc::clone(&ctx.ruleset);
    let fighting: Vec<(CraftId, UfoId)> = ctx
        .dogfights
        .active()
        .iter()
        .filter(|s| s.is_fighting())
        .map(|s| (s.craft, s.ufo))
        .collect();

    let mut rounds = 0;
    for (craft, ufo) in fighting {
        // An earlier exchange this round may have ended the session.
        if ctx.dogfights.session_for_craft(craft).map(|s| s.ufo) != Some(ufo) {
            continue;
        }
        rounds += 1;
        let Some(end) = exchange(ctx, &ruleset, craft, ufo) else {
            continue;
        };
        match end {
            DogfightEnd::UfoDestroyed | DogfightEnd::UfoCrashed => {
                for session in ctx.dogfights.end_sessions_for_ufo(ufo) {
                    finish_session(ctx, &session, end);
                }
            }
            _ => {
                if let Some(session) = ctx.dogfights.end_sessions_for_craft(craft) {
                    finish_session(ctx, &session, end);
                }
            }
        }
    }
    rounds
}

fn exchange(
    ctx: &mut SimContext,
    ruleset: &Ruleset,
    craft: CraftId,
    ufo: UfoId,
) -> Option<DogfightEnd> {
    let (Some(craft_entity), Some(ufo_entity)) = (ctx.registry.craft(craft), ctx.registry.ufo(ufo))
    else {
        return Some(DogfightEnd::Cancelled);
    };

    let (round, hunter_killer) = {
        let session = ctx
            .dogfights
            .active_mut()
            .iter_mut()
            .find(|s| s.craft == craft)?;
        session.rounds += 1;
        (session.rounds, session.hunter_killer)
    };

    let volley: Vec<(i32, u32)> = match ctx.world.get::<&mut Craft>(craft_entity) {
        Ok(mut c) => c
            .weapons
            .iter_mut()
            .filter(|w| w.ammo > 0)
            .map(|w| {
                w.ammo -= 1;
                (w.damage, w.accuracy)
            })
            .collect(),
        Err(_) => return Some(DogfightEnd::Cancelled),
    };
    let out_of_ammo = volley.is_empty();
    let hits: i32 = volley
        .into_iter()
        .filter(|&(_, accuracy)| ctx.rng.percent(accuracy))
        .map(|(damage, _)| damage)
        .sum();

    let (damage, hull, weapon_damage, weapon_accuracy, escape_rounds) = {
        let Ok(mut u) = ctx.world.get::<&mut Ufo>(ufo_entity) else {
            return Some(DogfightEnd::Cancelled);
        };
        let absorbed = hits.min(u.shield.max(0));
        u.shield -= absorbed;
        u.damage += hits - absorbed;
        (
            u.damage,
            u.stats.hull,
            u.stats.weapon_damage,
            u.stats.weapon_accuracy,
            u.stats.escape_rounds,
        )
    };

    if damage >= hull {
        change_status(ctx, ufo_entity, UfoStatus::Destroyed);
        return Some(DogfightEnd::UfoDestroyed);
    }
    if damage * 2 >= hull {
        let pos = ctx
            .world
            .get::<&Position>(ufo_entity)
            .map(|p| *p)
            .unwrap_or_default();
        if !ruleset.is_land(&pos) {
            // Crashed into the sea: nothing left to recover.
            change_status(ctx, ufo_entity, UfoStatus::Destroyed);
            return Some(DogfightEnd::UfoDestroyed);
        }
        change_status(ctx, ufo_entity, UfoStatus::Crashed);
        let hours = ctx.rng.between(CRASH_SITE_HOURS_MIN, CRASH_SITE_HOURS_MAX);
        if let Ok(mut u) = ctx.world.get::<&mut Ufo>(ufo_entity) {
            u.seconds_remaining = hours * 3600;
            u.detected = true;
        }
        return Some(DogfightEnd::UfoCrashed);
    }

    if weapon_damage > 0 && ctx.rng.percent(weapon_accuracy) {
        if let Ok(mut c) = ctx.world.get::<&mut Craft>(craft_entity) {
            let absorbed = weapon_damage.min(c.shield.max(0));
            c.shield -= absorbed;
            c.damage += weapon_damage - absorbed;
            if c.damage >= c.hull {
                return Some(DogfightEnd::CraftDestroyed);
            }
        }
    }

    if out_of_ammo {
        return Some(DogfightEnd::CraftReturned);
    }
    if !hunter_killer && round >= escape_rounds {
        return Some(DogfightEnd::UfoEscaped);
    }
    None
}

fn change_status(ctx: &mut SimContext, entity: hecs::Entity, to: UfoStatus) {
    if let Err(err) = set_status(ctx, entity, to) {
        tracing::warn!(target: "geoscape::dogfight", %err, "dogfight.status_rejected");
    }
}
