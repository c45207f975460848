//! Player craft: launch orders, flight, fuel and base maintenance.

use hecs::Entity;

use geoscape_core::components::{Craft, PlayerBase, Ufo};
use geoscape_core::enums::{CraftStatus, DogfightEnd, UfoStatus};
use geoscape_core::events::Notification;
use geoscape_core::types::{BaseId, CraftId, Position};
use geoscape_core::Target;

use crate::context::SimContext;
use crate::dogfight::Admission;
use crate::systems::dogfight::finish_session;

// --- Orders ---

/// Send a craft sitting ready at its base after a target.
pub fn launch(ctx: &mut SimContext, craft: CraftId, target: Target) {
    let Some(entity) = ctx.registry.craft(craft) else {
        tracing::warn!(target: "geoscape::craft", craft = %craft, "craft.unknown");
        return;
    };
    if !ctx.registry.is_alive(&ctx.world, target) || target == Target::Craft(craft) {
        tracing::warn!(target: "geoscape::craft", craft = %craft, ?target, "craft.launch_rejected");
        return;
    }
    let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) else {
        return;
    };
    if c.status != CraftStatus::Ready {
        tracing::debug!(target: "geoscape::craft", craft = %craft, status = c.status.as_str(), "craft.not_ready");
        return;
    }
    c.status = CraftStatus::Out;
    c.destination = Some(target);
    c.returning = false;
    c.low_fuel = false;
    tracing::info!(target: "geoscape::craft", craft = %craft, ?target, "craft.launched");
}

/// Point a craft already out at a new target.
pub fn redirect(ctx: &mut SimContext, craft: CraftId, target: Target) {
    let Some(entity) = ctx.registry.craft(craft) else {
        return;
    };
    if !ctx.registry.is_alive(&ctx.world, target) || target == Target::Craft(craft) {
        tracing::warn!(target: "geoscape::craft", craft = %craft, ?target, "craft.redirect_rejected");
        return;
    }
    let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) else {
        return;
    };
    if c.status != CraftStatus::Out || c.in_dogfight || c.low_fuel {
        return;
    }
    c.destination = Some(target);
    c.returning = false;
    tracing::info!(target: "geoscape::craft", craft = %craft, ?target, "craft.redirected");
}

pub fn return_to_base(ctx: &mut SimContext, craft: CraftId) {
    if let Some(session) = ctx.dogfights.end_sessions_for_craft(craft) {
        finish_session(ctx, &session, DogfightEnd::Disengaged);
    }
    let Some(entity) = ctx.registry.craft(craft) else {
        return;
    };
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        if c.status == CraftStatus::Out {
            c.returning = true;
            c.destination = None;
            tracing::info!(target: "geoscape::craft", craft = %craft, "craft.returning");
        }
    }
}

// --- Flight ---

/// Per step: craft fly toward their destination or home.
pub fn movement(ctx: &mut SimContext) {
    let mut crafts: Vec<(Entity, CraftId)> = ctx
        .world
        .query::<&Craft>()
        .iter()
        .filter(|(_, c)| c.status == CraftStatus::Out && !c.in_dogfight)
        .map(|(entity, c)| (entity, c.id))
        .collect();
    crafts.sort_by_key(|&(_, id)| id);

    for (entity, id) in crafts {
        if ctx.attacking.contains(&Target::Craft(id)) {
            continue;
        }
        let Ok((returning, destination, speed, base)) = ctx
            .world
            .get::<&Craft>(entity)
            .map(|c| (c.returning, c.destination, c.speed, c.base))
        else {
            continue;
        };

        if returning {
            let Some(home) = ctx.registry.base_position(&ctx.world, base) else {
                continue;
            };
            if fly_toward(ctx, entity, &home, speed) {
                dock(ctx, entity);
            }
            continue;
        }

        // No destination: patrol in place.
        let Some(target) = destination else {
            continue;
        };
        let Some(dest) = ctx.registry.position(&ctx.world, target) else {
            if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
                c.destination = None;
                c.returning = true;
            }
            tracing::debug!(target: "geoscape::craft", craft = %id, ?target, "craft.target_lost");
            continue;
        };
        if fly_toward(ctx, entity, &dest, speed) {
            arrive(ctx, entity, id, target);
        }
    }
}

fn fly_toward(ctx: &mut SimContext, entity: Entity, dest: &Position, speed: f64) -> bool {
    match ctx.world.get::<&mut Position>(entity) {
        Ok(mut pos) => {
            let (next, arrived) = pos.step_toward(dest, Position::step_angle(speed));
            *pos = next;
            arrived
        }
        Err(_) => false,
    }
}

fn arrive(ctx: &mut SimContext, entity: Entity, id: CraftId, target: Target) {
    match target {
        Target::Ufo(ufo) => {
            let status = ctx
                .registry
                .ufo(ufo)
                .and_then(|e| ctx.world.get::<&Ufo>(e).ok().map(|u| u.status));
            match status {
                Some(UfoStatus::Flying) => match ctx.dogfights.request(id, ufo) {
                    Admission::Admitted => {
                        if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
                            c.in_dogfight = true;
                        }
                    }
                    refused => {
                        tracing::debug!(target: "geoscape::craft", craft = %id, ufo = %ufo, ?refused, "craft.interception_refused");
                    }
                },
                Some(UfoStatus::Landed | UfoStatus::Crashed) => {
                    clear_destination(ctx, entity);
                    ctx.notify(Notification::CraftReadyToLand { craft: id, target });
                }
                _ => {}
            }
        }
        Target::Waypoint(waypoint) => {
            clear_destination(ctx, entity);
            ctx.notify(Notification::CraftReachedWaypoint { craft: id, waypoint });
        }
        Target::MissionSite(_) | Target::AlienBase(_) => {
            clear_destination(ctx, entity);
            ctx.notify(Notification::CraftReadyToLand { craft: id, target });
        }
        // Escorting another craft: keep following.
        Target::Craft(_) => {}
    }
}

fn clear_destination(ctx: &mut SimContext, entity: Entity) {
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        c.destination = None;
    }
}

fn dock(ctx: &mut SimContext, entity: Entity) {
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        c.status = CraftStatus::Repairs;
        c.returning = false;
        c.destination = None;
        c.low_fuel = false;
        c.shortage_warned = false;
        tracing::info!(target: "geoscape::craft", craft = %c.id, "craft.docked");
    }
}

// --- Fuel ---

/// Per 10 minutes: burn fuel and turn back craft that can only just make it
/// home.
pub fn fuel(ctx: &mut SimContext) {
    let crafts: Vec<(Entity, BaseId, Position)> = ctx
        .world
        .query::<(&Craft, &Position)>()
        .iter()
        .filter(|(_, (c, _))| c.status == CraftStatus::Out)
        .map(|(entity, (c, pos))| (entity, c.base, *pos))
        .collect();

    let mut low = Vec::new();
    for (entity, base, pos) in crafts {
        let home_nm = ctx
            .registry
            .base_position(&ctx.world, base)
            .map(|home| pos.distance_nm(&home))
            .unwrap_or(0.0);
        let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) else {
            continue;
        };
        c.fuel = (c.fuel - c.fuel_use).max(0);
        if c.low_fuel || c.returning {
            continue;
        }
        let minutes_home = if c.speed > 0.0 {
            home_nm / c.speed * 60.0
        } else {
            0.0
        };
        let needed = (minutes_home / 10.0).ceil() as i32 * c.fuel_use;
        if c.fuel <= needed {
            c.low_fuel = true;
            c.returning = true;
            c.destination = None;
            low.push(c.id);
        }
    }

    for craft in low {
        tracing::warn!(target: "geoscape::craft", craft = %craft, "craft.low_fuel");
        if let Some(session) = ctx.dogfights.end_sessions_for_craft(craft) {
            finish_session(ctx, &session, DogfightEnd::CraftReturned);
        }
        ctx.notify(Notification::LowFuel { craft });
    }
}

// --- Maintenance ---

/// Per hour: docked craft repair, then rearm, then refuel.
pub fn maintenance(ctx: &mut SimContext) {
    let mut crafts: Vec<(Entity, CraftId, BaseId, CraftStatus)> = ctx
        .world
        .query::<&Craft>()
        .iter()
        .filter(|(_, c)| {
            matches!(
                c.status,
                CraftStatus::Repairs | CraftStatus::Rearming | CraftStatus::Refuelling
            )
        })
        .map(|(entity, c)| (entity, c.id, c.base, c.status))
        .collect();
    crafts.sort_by_key(|&(_, id, _, _)| id);

    for (entity, id, base, status) in crafts {
        match status {
            CraftStatus::Repairs => repair(ctx, entity),
            CraftStatus::Rearming => rearm(ctx, entity, id, base),
            CraftStatus::Refuelling => refuel(ctx, entity, id, base),
            CraftStatus::Ready | CraftStatus::Out => {}
        }
    }
}

fn repair(ctx: &mut SimContext, entity: Entity) {
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        c.damage = (c.damage - c.repair_rate).max(0);
        if c.damage == 0 {
            c.shield = c.shield_capacity;
            c.status = CraftStatus::Rearming;
        }
    }
}

fn rearm(ctx: &mut SimContext, entity: Entity, id: CraftId, base: BaseId) {
    let Ok(next) = ctx.world.get::<&Craft>(entity).map(|c| {
        c.weapons
            .iter()
            .position(|w| w.ammo < w.ammo_max)
            .map(|idx| (idx, c.weapons[idx].clip_item.clone()))
    }) else {
        return;
    };
    let Some((idx, clip)) = next else {
        advance_maintenance(ctx, entity, CraftStatus::Refuelling);
        return;
    };
    if let Some(item) = clip {
        if !take_item(ctx, base, &item) {
            warn_shortage(ctx, entity, id, base, item, CraftStatus::Rearming);
            return;
        }
    }
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        let weapon = &mut c.weapons[idx];
        weapon.ammo = (weapon.ammo + weapon.rearm_rate.max(1)).min(weapon.ammo_max);
    }
}

fn refuel(ctx: &mut SimContext, entity: Entity, id: CraftId, base: BaseId) {
    let Ok((full, item)) = ctx
        .world
        .get::<&Craft>(entity)
        .map(|c| (c.fuel >= c.fuel_max, c.refuel_item.clone()))
    else {
        return;
    };
    if full {
        advance_maintenance(ctx, entity, CraftStatus::Ready);
        return;
    }
    if let Some(item) = item {
        if !take_item(ctx, base, &item) {
            warn_shortage(ctx, entity, id, base, item, CraftStatus::Refuelling);
            return;
        }
    }
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        c.fuel = (c.fuel + c.refuel_rate.max(1)).min(c.fuel_max);
        if c.fuel >= c.fuel_max {
            c.status = CraftStatus::Ready;
            c.shortage_warned = false;
            tracing::info!(target: "geoscape::craft", craft = %c.id, "craft.ready");
        }
    }
}

fn advance_maintenance(ctx: &mut SimContext, entity: Entity, next: CraftStatus) {
    if let Ok(mut c) = ctx.world.get::<&mut Craft>(entity) {
        c.status = next;
        c.shortage_warned = false;
        if next == CraftStatus::Ready {
            tracing::info!(target: "geoscape::craft", craft = %c.id, "craft.ready");
        }
    }
}

/// Consume one unit from base storage.
fn take_item(ctx: &mut SimContext, base: BaseId, item: &str) -> bool {
    let Some(entity) = ctx.registry.base(base) else {
        return false;
    };
    let Ok(mut player_base) = ctx.world.get::<&mut PlayerBase>(entity) else {
        return false;
    };
    match player_base.storage.get_mut(item) {
        Some(count) if *count > 0 => {
            *count -= 1;
            true
        }
        _ => false,
    }
}

fn warn_shortage(
    ctx: &mut SimContext,
    entity: Entity,
    craft: CraftId,
    base: BaseId,
    item: String,
    status: CraftStatus,
) {
    let first = match ctx.world.get::<&mut Craft>(entity) {
        Ok(mut c) => !std::mem::replace(&mut c.shortage_warned, true),
        Err(_) => false,
    };
    if first {
        tracing::info!(target: "geoscape::craft", craft = %craft, item = %item, "craft.item_shortage");
        ctx.notify(Notification::NotEnoughItem {
            craft,
            base,
            item,
            status,
        });
    }
}
