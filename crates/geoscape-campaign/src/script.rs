//! Monthly mission script evaluation.
//!
//! Pass one filters commands by month window, run count, difficulty and
//! research. Pass two walks the survivors in authored order, checks each
//! command's signed label references against what already ran this pass,
//! rolls its odds and resolves region, mission and race. Labels only look
//! backwards: a command can depend on earlier commands, never later ones.

use std::collections::{BTreeSet, HashMap};

use geoscape_core::dice::Dice;
use geoscape_core::enums::MissionObjective;
use geoscape_core::error::GeoscapeError;
use geoscape_core::ruleset::{validate_labels, MissionScriptCommand, RegionRule, Ruleset};
use geoscape_core::weights::WeightedOptions;

use crate::strategy::AlienStrategy;

/// Campaign state the script reads.
pub struct ScriptContext<'a> {
    /// Months since the campaign started, 0-based.
    pub month: u32,
    pub difficulty: u32,
    pub researched: &'a BTreeSet<String>,
    /// Regions currently hosting a player base.
    pub base_regions: &'a BTreeSet<String>,
    /// `(mission, region)` pairs already running.
    pub running: &'a BTreeSet<(String, String)>,
}

/// Zone area picked for a site objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteChoice {
    pub zone: usize,
    pub area: usize,
}

/// A mission the script decided to launch.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionRequest {
    pub command: String,
    pub mission: String,
    pub region: String,
    pub race: String,
    pub objective: MissionObjective,
    pub delay_minutes: u32,
    pub site: Option<SiteChoice>,
}

/// Evaluate the whole script for the current month.
///
/// Any reference to a mission, region or race missing from the ruleset aborts
/// the pass with an error and no requests. A month with no eligible region
/// just produces nothing for that command.
pub fn run(
    commands: &[MissionScriptCommand],
    ruleset: &Ruleset,
    strategy: &mut AlienStrategy,
    ctx: &ScriptContext<'_>,
    dice: &mut impl Dice,
) -> Result<Vec<MissionRequest>, GeoscapeError> {
    validate_labels(commands)?;
    for command in commands {
        resolve_weight_ids(command, ruleset)?;
    }

    let eligible: Vec<&MissionScriptCommand> = commands
        .iter()
        .filter(|command| is_eligible(command, strategy, ctx))
        .collect();

    let mut outcomes: HashMap<u32, bool> = HashMap::new();
    let mut requests = Vec::new();

    for command in eligible {
        let mut succeeded = false;
        if !conditionals_met(&command.conditionals, &outcomes) {
            tracing::debug!(
                target: "geoscape::script",
                command = %command.name,
                "script.command.blocked"
            );
        } else if dice.percent(command.execution_odds) {
            match process_command(command, ruleset, strategy, ctx, dice)? {
                Some(request) => {
                    tracing::info!(
                        target: "geoscape::script",
                        command = %command.name,
                        mission = %request.mission,
                        region = %request.region,
                        race = %request.race,
                        "script.command.executed"
                    );
                    requests.push(request);
                    succeeded = true;
                }
                None => {
                    tracing::info!(
                        target: "geoscape::script",
                        command = %command.name,
                        "script.command.no_location"
                    );
                }
            }
        }
        if command.label > 0 {
            outcomes.insert(command.label, succeeded);
        }
    }

    Ok(requests)
}

/// Every id a command could roll must exist, not only the one the dice pick.
fn resolve_weight_ids(
    command: &MissionScriptCommand,
    ruleset: &Ruleset,
) -> Result<(), GeoscapeError> {
    for id in command.region_weights.all_ids() {
        ruleset.region(id)?;
    }
    for id in command.mission_weights.all_ids() {
        ruleset.mission(id)?;
    }
    for id in command.race_weights.all_ids() {
        ruleset.race(id)?;
    }
    Ok(())
}

fn is_eligible(
    command: &MissionScriptCommand,
    strategy: &AlienStrategy,
    ctx: &ScriptContext<'_>,
) -> bool {
    if ctx.month < command.first_month {
        return false;
    }
    if command.last_month >= 0 && i64::from(ctx.month) > i64::from(command.last_month) {
        return false;
    }
    let runs = i64::from(strategy.runs(command.run_key()));
    if command.max_runs >= 0 && runs >= i64::from(command.max_runs) {
        return false;
    }
    if ctx.difficulty < command.min_difficulty {
        return false;
    }
    command
        .research_triggers
        .iter()
        .all(|(topic, expected)| ctx.researched.contains(topic) == *expected)
}

/// `+n` needs label `n` recorded as a success; `-n` needs it absent or failed.
/// Label 0 can never be satisfied.
pub fn conditionals_met(conditionals: &[i32], outcomes: &HashMap<u32, bool>) -> bool {
    conditionals.iter().all(|&reference| {
        if reference == 0 {
            return false;
        }
        let ran = outcomes
            .get(&reference.unsigned_abs())
            .copied()
            .unwrap_or(false);
        if reference > 0 {
            ran
        } else {
            !ran
        }
    })
}

fn process_command(
    command: &MissionScriptCommand,
    ruleset: &Ruleset,
    strategy: &mut AlienStrategy,
    ctx: &ScriptContext<'_>,
    dice: &mut impl Dice,
) -> Result<Option<MissionRequest>, GeoscapeError> {
    let month = ctx.month;

    // A mission picked up front decides the objective used to filter regions.
    let mission = match command.mission_weights.choose(month, dice) {
        Some(id) => Some(ruleset.mission(&id)?),
        None => None,
    };

    let mut regions: Vec<(String, u32)> = match command.region_weights.for_month(month) {
        Some(table) if !table.is_empty() => weighted_ids(table),
        _ => weighted_ids(strategy.region_weights()),
    };
    for (id, _) in &regions {
        ruleset.region(id)?;
    }

    if command.target_base_odds > 0 && dice.percent(command.target_base_odds) {
        regions.retain(|(id, _)| ctx.base_regions.contains(id));
        if let Some(mission) = mission {
            regions.retain(|(id, _)| !ctx.running.contains(&(mission.id.clone(), id.clone())));
        }
    }

    // Without a mission up front, a region needs a strategy mission that is
    // not already running there.
    if mission.is_none() {
        regions.retain(|(id, _)| !idle_missions(strategy, ctx, id).is_empty());
    }

    if let Some(mission) = mission.filter(|m| m.objective == MissionObjective::Site) {
        regions.retain(|(id, _)| {
            ruleset
                .region(id)
                .map(|rule| {
                    let zone = mission.spawn_zone;
                    !free_areas(rule, zone, command.run_key(), id, strategy).is_empty()
                })
                .unwrap_or(false)
        });
    }

    let Some(region) = choose_weighted(&regions, dice) else {
        return Ok(None);
    };

    let rule = match mission {
        Some(rule) => rule,
        None => {
            let candidates = idle_missions(strategy, ctx, &region);
            let Some(id) = choose_weighted(&candidates, dice) else {
                return Ok(None);
            };
            ruleset.mission(&id)?
        }
    };
    let mission_id = rule.id.clone();

    let race = match command.race_weights.choose(month, dice) {
        Some(race) => race,
        None => match rule.race_weights.choose(month, dice) {
            Some(race) => race,
            None => return Ok(None),
        },
    };
    ruleset.race(&race)?;

    let site = if rule.objective == MissionObjective::Site {
        let region_rule = ruleset.region(&region)?;
        let var_name = command.run_key();
        let free = free_areas(region_rule, rule.spawn_zone, var_name, &region, strategy);
        if free.is_empty() {
            return Ok(None);
        }
        let area = free[dice.roll(free.len() as u32) as usize];
        strategy.remember_site(
            command.run_key(),
            &region,
            rule.spawn_zone,
            area,
            command.repeat_avoidance,
        );
        Some(SiteChoice {
            zone: rule.spawn_zone,
            area,
        })
    } else {
        None
    };

    if command.use_table {
        strategy.remove_mission(&region, &mission_id);
    }
    strategy.increment_runs(command.run_key());

    Ok(Some(MissionRequest {
        command: command.name.clone(),
        mission: mission_id,
        region,
        race,
        objective: rule.objective,
        delay_minutes: command.delay_minutes,
        site,
    }))
}

/// Areas of `zone` in `region` not used recently under `var_name`.
fn free_areas(
    region: &RegionRule,
    zone: usize,
    var_name: &str,
    region_id: &str,
    strategy: &AlienStrategy,
) -> Vec<usize> {
    region
        .zones
        .get(zone)
        .map(|z| {
            (0..z.areas.len())
                .filter(|&area| !strategy.is_recent(var_name, region_id, zone, area))
                .collect()
        })
        .unwrap_or_default()
}

/// Strategy missions for `region` minus those already running there.
fn idle_missions(
    strategy: &AlienStrategy,
    ctx: &ScriptContext<'_>,
    region: &str,
) -> Vec<(String, u32)> {
    strategy
        .missions_in(region)
        .map(|table| {
            weighted_ids(table)
                .into_iter()
                .filter(|(id, _)| !ctx.running.contains(&(id.clone(), region.to_owned())))
                .collect()
        })
        .unwrap_or_default()
}

fn weighted_ids(table: &WeightedOptions) -> Vec<(String, u32)> {
    table
        .ids()
        .map(|id| (id.to_owned(), table.weight(id)))
        .collect()
}

fn choose_weighted(options: &[(String, u32)], dice: &mut impl Dice) -> Option<String> {
    let total: u32 = options.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = dice.roll(total);
    for (id, weight) in options {
        if roll < *weight {
            return Some(id.clone());
        }
        roll -= weight;
    }
    None
}
