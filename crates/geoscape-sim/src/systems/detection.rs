//! Radar sweeps and retaliation base discovery.

use std::sync::Arc;

use hecs::Entity;

use geoscape_core::components::{AlienBase, Craft, MissionSite, PlayerBase, Ufo};
use geoscape_core::constants::{RETALIATION_DETECTION_RANGE_NM, RETALIATION_EXCLUDED_ZONE};
use geoscape_core::dice::Dice;
use geoscape_core::enums::{CraftStatus, MissionObjective, UfoStatus};
use geoscape_core::events::Notification;
use geoscape_core::types::{BaseId, MissionId, Position, UfoId};

use crate::context::SimContext;

/// One radar source: a player base or a craft out on patrol.
struct Radar {
    pos: Position,
    range_nm: f64,
    chance: u32,
    hyper: bool,
}

impl Radar {
    fn covers(&self, pos: &Position) -> bool {
        self.pos.distance_nm(pos) <= self.range_nm
    }
}

fn radars(ctx: &SimContext) -> Vec<Radar> {
    let mut radars: Vec<Radar> = ctx
        .world
        .query::<(&PlayerBase, &Position)>()
        .iter()
        .map(|(_, (base, pos))| Radar {
            pos: *pos,
            range_nm: base.radar_range_nm,
            chance: base.detection_chance,
            hyper: base.hyper_detection,
        })
        .collect();
    radars.extend(
        ctx.world
            .query::<(&Craft, &Position)>()
            .iter()
            .filter(|(_, (c, _))| c.status == CraftStatus::Out)
            .map(|(_, (c, pos))| Radar {
                pos: *pos,
                range_nm: c.radar_range_nm,
                chance: c.radar_chance,
                hyper: false,
            }),
    );
    radars
}

/// Per 30 minutes: roll detection for everything under radar cover and drop
/// contact with UFOs that left it.
pub fn run(ctx: &mut SimContext) {
    let radars = radars(ctx);

    let mut ufos: Vec<(Entity, UfoId, Position, bool)> = ctx
        .world
        .query::<(&Ufo, &Position)>()
        .iter()
        .filter(|(_, (u, _))| matches!(u.status, UfoStatus::Flying | UfoStatus::Landed))
        .map(|(entity, (u, pos))| (entity, u.id, *pos, u.detected))
        .collect();
    ufos.sort_by_key(|&(_, id, _, _)| id);

    for (entity, id, pos, detected) in ufos {
        let covering: Vec<&Radar> = radars.iter().filter(|r| r.covers(&pos)).collect();
        if detected {
            if covering.is_empty() {
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                    ufo.detected = false;
                    ufo.hyper_detected = false;
                }
                tracing::info!(target: "geoscape::ufo", ufo = %id, "ufo.lost");
                ctx.notify(Notification::UfoLost { ufo: id });
            }
            continue;
        }
        let hyper = covering.iter().any(|r| r.hyper);
        let spotted = hyper || covering.iter().any(|r| ctx.rng.percent(r.chance));
        if !spotted {
            continue;
        }
        if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
            ufo.detected = true;
            ufo.hyper_detected = hyper;
        }
        tracing::info!(target: "geoscape::ufo", ufo = %id, hyper, "ufo.detected");
        ctx.notify(Notification::UfoDetected { ufo: id, hyper });
    }

    let mut sites: Vec<(Entity, Position)> = ctx
        .world
        .query::<(&MissionSite, &Position)>()
        .iter()
        .filter(|(_, (site, _))| !site.detected)
        .map(|(entity, (_, pos))| (entity, *pos))
        .collect();
    sites.sort_by_key(|&(entity, _)| entity.id());
    for (entity, pos) in sites {
        if !sweep(ctx, &radars, &pos) {
            continue;
        }
        let site = match ctx.world.get::<&mut MissionSite>(entity) {
            Ok(mut site) => {
                site.detected = true;
                site.id
            }
            Err(_) => continue,
        };
        ctx.notify(Notification::MissionSiteDetected { site });
    }

    let mut bases: Vec<(Entity, Position)> = ctx
        .world
        .query::<(&AlienBase, &Position)>()
        .iter()
        .filter(|(_, (base, _))| !base.detected)
        .map(|(entity, (_, pos))| (entity, *pos))
        .collect();
    bases.sort_by_key(|&(entity, _)| entity.id());
    for (entity, pos) in bases {
        if !sweep(ctx, &radars, &pos) {
            continue;
        }
        let base = match ctx.world.get::<&mut AlienBase>(entity) {
            Ok(mut base) => {
                base.detected = true;
                base.id
            }
            Err(_) => continue,
        };
        ctx.notify(Notification::AlienBaseDetected { base });
    }
}

fn sweep(ctx: &mut SimContext, radars: &[Radar], pos: &Position) -> bool {
    radars
        .iter()
        .filter(|r| r.covers(pos))
        .any(|r| r.hyper || ctx.rng.percent(r.chance))
}

/// Per 10 minutes: retaliation UFOs look for player bases below them.
pub fn retaliation(ctx: &mut SimContext) {
    let ruleset = Arc::clone(&ctx.ruleset);
    let scouts: Vec<(UfoId, Position, usize, String, MissionId)> = ctx
        .world
        .query::<(&Ufo, &Position)>()
        .iter()
        .filter(|(_, (u, _))| u.status == UfoStatus::Flying)
        .filter_map(|(_, (u, pos))| {
            u.mission
                .map(|m| (u.id, *pos, u.trajectory_point, u.trajectory.clone(), m))
        })
        .collect();

    for (ufo, pos, point, trajectory, mission_id) in scouts {
        let Some(idx) = ctx.missions.iter().position(|m| m.id == mission_id) else {
            continue;
        };
        let mission = &ctx.missions[idx];
        if mission.objective != MissionObjective::Retaliation || mission.retaliation_base.is_some() {
            continue;
        }
        // Only once the UFO is past its approach legs and not leaving.
        let zone = ruleset
            .trajectory(&trajectory)
            .ok()
            .and_then(|t| t.points.get(point))
            .map(|p| p.zone);
        if point < 2 || zone.map_or(true, |z| z == RETALIATION_EXCLUDED_ZONE) {
            continue;
        }

        let mut nearby: Vec<(BaseId, f64, u32)> = ctx
            .registry
            .bases()
            .filter_map(|(id, entity)| {
                let base_pos = *ctx.world.get::<&Position>(entity).ok()?;
                let visibility = ctx.world.get::<&PlayerBase>(entity).ok()?.visibility;
                let distance = pos.distance_nm(&base_pos);
                (distance <= RETALIATION_DETECTION_RANGE_NM).then_some((id, distance, visibility))
            })
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (base, _, visibility) in nearby {
            if ctx.rng.percent(visibility) {
                ctx.missions[idx].retaliation_base = Some(base);
                tracing::warn!(
                    target: "geoscape::mission",
                    mission = %mission_id,
                    ufo = %ufo,
                    base = %base,
                    "mission.base_found"
                );
                break;
            }
        }
    }
}
