//! Alien mission system: the monthly script, wave spawning, trajectories,
//! landings, sites and alien base supply.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use hecs::Entity;

use geoscape_campaign::{script, MissionRequest, ScriptContext};
use geoscape_core::components::{AlienBase, MissionSite, Ufo};
use geoscape_core::constants::{ALIEN_BASE_SUPPLY_DAYS, MISSION_THINK_MINUTES};
use geoscape_core::dice::Dice;
use geoscape_core::enums::{Altitude, MissionObjective, UfoStatus};
use geoscape_core::error::GeoscapeError;
use geoscape_core::ruleset::{Ruleset, TrajectoryRule};
use geoscape_core::types::{AlienBaseId, MissionId, Position};
use geoscape_core::Target;

use crate::context::SimContext;
use crate::mission::AlienMission;
use crate::systems::ufo::{set_destination, set_status};

/// Run the mission script and create every mission it requests.
pub fn run_script(ctx: &mut SimContext) -> Result<usize, GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);

    let base_positions: Vec<Position> = ctx
        .registry
        .bases()
        .filter_map(|(_, entity)| ctx.world.get::<&Position>(entity).ok().map(|p| *p))
        .collect();
    let base_regions: BTreeSet<String> = base_positions
        .iter()
        .filter_map(|pos| ruleset.region_at(pos).map(|r| r.id.clone()))
        .collect();
    let running: BTreeSet<(String, String)> = ctx
        .missions
        .iter()
        .map(|m| (m.rule_id.clone(), m.region.clone()))
        .collect();

    let requests = {
        let script_ctx = ScriptContext {
            month: ctx.campaign.months_passed,
            difficulty: ctx.config.difficulty,
            researched: &ctx.campaign.researched,
            base_regions: &base_regions,
            running: &running,
        };
        script::run(
            &ruleset.mission_script,
            &ruleset,
            &mut ctx.strategy,
            &script_ctx,
            &mut ctx.rng,
        )?
    };

    for request in &requests {
        create_mission(ctx, request, None)?;
    }
    tracing::info!(
        target: "geoscape::script",
        month = ctx.campaign.months_passed,
        created = requests.len(),
        "script.pass"
    );
    Ok(requests.len())
}

/// Month boundary: close the activity ledger, age site memory, run the script.
pub fn monthly(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    ctx.campaign.months_passed += 1;
    ctx.strategy.age_site_memory();
    let activity = std::mem::take(&mut ctx.campaign.activity);
    tracing::info!(
        target: "geoscape::mission",
        month = ctx.campaign.months_passed,
        regions = activity.regions.len(),
        total = activity.regions.values().sum::<i64>(),
        "mission.month_closed"
    );
    run_script(ctx)?;
    Ok(())
}

/// Day boundary: alien bases count down to their next supply run.
pub fn daily(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    let mut due = Vec::new();
    for (_, base) in ctx.world.query_mut::<&mut AlienBase>() {
        base.supply_days_remaining = base.supply_days_remaining.saturating_sub(1);
        if base.supply_days_remaining == 0 {
            base.supply_days_remaining = ALIEN_BASE_SUPPLY_DAYS;
            due.push((base.id, base.region.clone(), base.race.clone()));
        }
    }
    due.sort_by_key(|(id, _, _)| *id);

    for (base, region, race) in due {
        let Some(supply) = &ruleset.race(&race)?.supply_mission else {
            continue;
        };
        let rule = ruleset.mission(supply)?;
        let request = MissionRequest {
            command: format!("supply {base}"),
            mission: supply.clone(),
            region,
            race,
            objective: rule.objective,
            delay_minutes: 0,
            site: None,
        };
        create_mission(ctx, &request, Some(base))?;
    }
    Ok(())
}

pub fn create_mission(
    ctx: &mut SimContext,
    request: &MissionRequest,
    alien_base: Option<AlienBaseId>,
) -> Result<MissionId, GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    let rule = ruleset.mission(&request.mission)?;
    ruleset.region(&request.region)?;
    ruleset.race(&request.race)?;

    let id = MissionId(ctx.allocate_id());
    let first_wave = rule
        .waves
        .first()
        .map(|w| w.spawn_timer_minutes)
        .unwrap_or(0);
    ctx.missions.push(AlienMission {
        id,
        rule_id: rule.id.clone(),
        region: request.region.clone(),
        race: request.race.clone(),
        objective: rule.objective,
        next_wave: 0,
        waves_total: rule.waves.len(),
        spawn_countdown_minutes: request.delay_minutes + first_wave,
        alien_base,
        site: request.site,
        retaliation_base: None,
    });
    tracing::info!(
        target: "geoscape::mission",
        mission = %id,
        rule = %rule.id,
        region = %request.region,
        race = %request.race,
        "mission.created"
    );
    Ok(id)
}

/// 30-minute think: spawn due waves, then retire finished missions.
pub fn think(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    for idx in 0..ctx.missions.len() {
        let mission = &mut ctx.missions[idx];
        if !mission.waves_remaining() {
            continue;
        }
        if mission.spawn_countdown_minutes > MISSION_THINK_MINUTES {
            mission.spawn_countdown_minutes -= MISSION_THINK_MINUTES;
            continue;
        }
        spawn_wave(ctx, &ruleset, idx)?;
    }

    let mut live: HashMap<MissionId, usize> = HashMap::new();
    for (_, ufo) in ctx.world.query::<&Ufo>().iter() {
        if let Some(mission) = ufo.mission {
            if ufo.status != UfoStatus::Destroyed {
                *live.entry(mission).or_default() += 1;
            }
        }
    }
    ctx.missions.retain(|mission| {
        let over = mission.is_over(live.get(&mission.id).copied().unwrap_or(0));
        if over {
            tracing::info!(target: "geoscape::mission", mission = %mission.id, "mission.finished");
        }
        !over
    });
    Ok(())
}

fn spawn_wave(ctx: &mut SimContext, ruleset: &Ruleset, idx: usize) -> Result<(), GeoscapeError> {
    let mission = ctx.missions[idx].clone();
    let rule = ruleset.mission(&mission.rule_id)?;
    let Some(wave) = rule.waves.get(mission.next_wave) else {
        ctx.missions[idx].next_wave = mission.waves_total;
        return Ok(());
    };
    let trajectory = ruleset.trajectory(&wave.trajectory)?;
    let first_point = trajectory.points.first().cloned().unwrap_or_default();
    let assault_target = mission
        .retaliation_base
        .filter(|_| mission.objective == MissionObjective::Retaliation)
        .and_then(|base| {
            ctx.registry
                .base_position(&ctx.world, base)
                .map(|pos| (base, pos))
        });

    for _ in 0..wave.count.max(1) {
        let start = zone_point(ruleset, &mission, first_point.zone, &mut ctx.rng)?;
        let (leader, entity) = ctx.spawn_ufo(&wave.ufo, start)?;
        if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
            ufo.mission = Some(mission.id);
            ufo.trajectory = wave.trajectory.clone();
            ufo.trajectory_point = 0;
            ufo.altitude = first_point.altitude;
        }

        match assault_target {
            Some((base, base_pos)) => {
                // Straight at the base; the trajectory resumes from its last
                // point once the assault is over.
                let waypoint = ctx.spawn_waypoint(base_pos, Some(leader));
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                    ufo.assault_base = Some(base);
                    ufo.trajectory_point = trajectory.points.len().saturating_sub(1);
                }
                set_destination(ctx, entity, Some(Target::Waypoint(waypoint)));
            }
            None => advance_trajectory(ctx, entity)?,
        }

        if let Some(escort_rule) = &wave.escort_ufo {
            for _ in 0..wave.escort_count {
                let (_, escort) = ctx.spawn_ufo(escort_rule, start)?;
                if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(escort) {
                    ufo.mission = Some(mission.id);
                    ufo.trajectory = wave.trajectory.clone();
                    ufo.altitude = first_point.altitude;
                    ufo.escorting = Some(leader);
                    ufo.destination = Some(Target::Ufo(leader));
                }
            }
        }
    }

    tracing::info!(
        target: "geoscape::mission",
        mission = %mission.id,
        wave = mission.next_wave,
        ufo = %wave.ufo,
        count = wave.count.max(1),
        "mission.wave_spawned"
    );

    let next = mission.next_wave + 1;
    let entry = &mut ctx.missions[idx];
    entry.next_wave = next;
    entry.spawn_countdown_minutes = rule
        .waves
        .get(next)
        .map(|w| w.spawn_timer_minutes)
        .unwrap_or(0);
    Ok(())
}

/// Location for a trajectory zone of the mission's region.
fn zone_point(
    ruleset: &Ruleset,
    mission: &AlienMission,
    zone: usize,
    dice: &mut impl Dice,
) -> Result<Position, GeoscapeError> {
    let region = ruleset.region(&mission.region)?;
    if let Some(site) = mission.site.filter(|site| site.zone == zone) {
        if let Some(area) = region
            .zones
            .get(zone)
            .and_then(|z| z.areas.get(site.area))
        {
            return Ok(area.center());
        }
    }
    if let Some(areas) = region.zones.get(zone).map(|z| &z.areas) {
        if !areas.is_empty() {
            let area = &areas[dice.roll(areas.len() as u32) as usize];
            return Ok(area.random_point(dice));
        }
    }
    if !region.areas.is_empty() {
        let area = &region.areas[dice.roll(region.areas.len() as u32) as usize];
        return Ok(area.random_point(dice));
    }
    Ok(Position::default())
}

/// The UFO reached the trajectory point it was flying to.
pub fn ufo_arrived(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    let Some((mission_id, trajectory_id, point_idx)) = ctx
        .world
        .get::<&Ufo>(entity)
        .ok()
        .map(|u| (u.mission, u.trajectory.clone(), u.trajectory_point))
    else {
        return Ok(());
    };
    let Some(mission_id) = mission_id else {
        // Free-flying UFOs hover at their last destination.
        set_destination(ctx, entity, None);
        return Ok(());
    };
    let trajectory = ruleset.trajectory(&trajectory_id)?;
    let Some(point) = trajectory.points.get(point_idx) else {
        return escape(ctx, entity);
    };
    if point.altitude == Altitude::Ground {
        land(ctx, &ruleset, entity, mission_id, trajectory)
    } else {
        advance_trajectory(ctx, entity)
    }
}

fn land(
    ctx: &mut SimContext,
    ruleset: &Ruleset,
    entity: Entity,
    mission_id: MissionId,
    trajectory: &TrajectoryRule,
) -> Result<(), GeoscapeError> {
    let Some(idx) = ctx.missions.iter().position(|m| m.id == mission_id) else {
        return escape(ctx, entity);
    };
    let mission = ctx.missions[idx].clone();
    let pos = ctx
        .world
        .get::<&Position>(entity)
        .map(|p| *p)
        .unwrap_or_default();

    match mission.objective {
        MissionObjective::Site => {
            let minutes = ruleset.mission(&mission.rule_id)?.site_minutes;
            let site = ctx.spawn_site(&mission.rule_id, &mission.region, &mission.race, minutes, pos);
            tracing::info!(target: "geoscape::mission", mission = %mission.id, site = %site, "mission.site_created");
            set_destination(ctx, entity, None);
            set_status(ctx, entity, UfoStatus::Destroyed)
        }
        MissionObjective::Base if mission.alien_base.is_none() => {
            let base = ctx.spawn_alien_base(&mission.region, &mission.race, pos);
            ctx.missions[idx].alien_base = Some(base);
            tracing::info!(target: "geoscape::mission", mission = %mission.id, base = %base, "mission.base_built");
            set_destination(ctx, entity, None);
            set_status(ctx, entity, UfoStatus::Destroyed)
        }
        _ => {
            set_status(ctx, entity, UfoStatus::Landed)?;
            if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
                ufo.seconds_remaining = trajectory.ground_timer_secs;
            }
            tracing::debug!(target: "geoscape::ufo", mission = %mission.id, "ufo.landed");
            Ok(())
        }
    }
}

/// Move on to the next trajectory point, or leave Earth after the last.
pub fn advance_trajectory(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    let Some(next) = ctx
        .world
        .get::<&mut Ufo>(entity)
        .ok()
        .map(|mut u| {
            u.trajectory_point += 1;
            u.trajectory_point
        })
    else {
        return Ok(());
    };
    head_for_point(ctx, entity, next)
}

/// Head back to the current trajectory point after a detour.
pub fn resume_trajectory(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    let Some(current) = ctx.world.get::<&Ufo>(entity).ok().map(|u| u.trajectory_point) else {
        return Ok(());
    };
    head_for_point(ctx, entity, current)
}

fn head_for_point(ctx: &mut SimContext, entity: Entity, idx: usize) -> Result<(), GeoscapeError> {
    let ruleset = Arc::clone(&ctx.ruleset);
    let Some((id, mission_id, trajectory_id, max_speed)) = ctx
        .world
        .get::<&Ufo>(entity)
        .ok()
        .map(|u| (u.id, u.mission, u.trajectory.clone(), u.stats.max_speed))
    else {
        return Ok(());
    };
    let Some(mission_id) = mission_id else {
        set_destination(ctx, entity, None);
        return Ok(());
    };
    let trajectory = ruleset.trajectory(&trajectory_id)?;
    let Some(point) = trajectory.points.get(idx) else {
        return escape(ctx, entity);
    };
    let Some(mission) = ctx.missions.iter().find(|m| m.id == mission_id).cloned() else {
        return escape(ctx, entity);
    };

    let supply_base = mission
        .alien_base
        .filter(|_| mission.objective == MissionObjective::Supply && point.altitude == Altitude::Ground)
        .map(Target::AlienBase)
        .filter(|&target| ctx.registry.is_alive(&ctx.world, target));
    let target = match supply_base {
        Some(target) => target,
        None => {
            let pos = zone_point(&ruleset, &mission, point.zone, &mut ctx.rng)?;
            Target::Waypoint(ctx.spawn_waypoint(pos, Some(id)))
        }
    };

    if let Ok(mut ufo) = ctx.world.get::<&mut Ufo>(entity) {
        ufo.trajectory_point = idx;
        ufo.altitude = point.altitude;
        ufo.speed = max_speed * f64::from(point.speed_percent) / 100.0;
    }
    set_destination(ctx, entity, Some(target));
    Ok(())
}

/// The UFO leaves Earth; cleanup removes it on the next step.
fn escape(ctx: &mut SimContext, entity: Entity) -> Result<(), GeoscapeError> {
    if let Ok(ufo) = ctx.world.get::<&Ufo>(entity) {
        tracing::debug!(target: "geoscape::ufo", ufo = %ufo.id, "ufo.left_earth");
    }
    set_destination(ctx, entity, None);
    set_status(ctx, entity, UfoStatus::Destroyed)
}

/// 30-minute countdown on mission sites.
pub fn site_expiry(ctx: &mut SimContext) {
    let mut expired = Vec::new();
    for (_, site) in ctx.world.query_mut::<&mut MissionSite>() {
        site.minutes_remaining = site.minutes_remaining.saturating_sub(MISSION_THINK_MINUTES);
        if site.minutes_remaining == 0 {
            expired.push(site.id);
        }
    }
    for site in expired {
        tracing::info!(target: "geoscape::mission", site = %site, "mission.site_expired");
        ctx.despawn_target(Target::MissionSite(site));
    }
}
