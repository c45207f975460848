//! Read-only view of the strategic layer for the screen layer.

use geoscape_core::components::{Craft, Ufo};
use geoscape_core::enums::Suspension;
use geoscape_core::state::*;
use geoscape_core::types::Position;

use crate::context::SimContext;

pub fn build_snapshot(ctx: &SimContext, suspension: Suspension) -> GeoscapeSnapshot {
    let mut ufos: Vec<UfoView> = ctx
        .world
        .query::<(&Ufo, &Position)>()
        .iter()
        .map(|(_, (u, pos))| UfoView {
            id: u.id,
            rule_id: u.rule_id.clone(),
            status: u.status,
            position: *pos,
            altitude: u.altitude,
            detected: u.detected,
            hyper_detected: u.hyper_detected,
            shield: u.shield,
            shield_capacity: u.stats.shield_capacity,
            damage: u.damage,
            hull: u.stats.hull,
            hunter_killer: u.stats.hunter_killer,
            hunting: u.hunting,
            escorting: u.escorting,
            mission: u.mission,
        })
        .collect();
    ufos.sort_by_key(|u| u.id);

    let mut crafts: Vec<CraftView> = ctx
        .world
        .query::<(&Craft, &Position)>()
        .iter()
        .map(|(_, (c, pos))| CraftView {
            id: c.id,
            base: c.base,
            status: c.status,
            position: *pos,
            fuel: c.fuel,
            fuel_max: c.fuel_max,
            damage: c.damage,
            hull: c.hull,
            destination: c.destination,
            returning: c.returning,
            in_dogfight: c.in_dogfight,
        })
        .collect();
    crafts.sort_by_key(|c| c.id);

    GeoscapeSnapshot {
        time: ctx.clock,
        suspension,
        ufos,
        crafts,
        dogfights: ctx.dogfights.views(),
        missions: ctx.missions.iter().map(|m| m.view()).collect(),
        pending_notifications: ctx.notifications.iter().cloned().collect(),
        funds: ctx.campaign.funds,
    }
}
