//! Data-driven content: UFOs, craft, trajectories, missions, regions, races and
//! the monthly mission script.
//!
//! Loaded from JSON. Lookups by id return `GeoscapeError` when the id is not in
//! the active ruleset; callers propagate that as a fatal configuration error.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MISSION_SITE_MINUTES, UFO_ESCAPE_ROUNDS};
use crate::enums::*;
use crate::error::GeoscapeError;
use crate::geo::{GeoArea, LandPolygon};
use crate::types::Position;
use crate::weights::{MonthlyWeights, WeightedOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub ufos: Vec<UfoRule>,
    pub crafts: Vec<CraftRule>,
    pub trajectories: Vec<TrajectoryRule>,
    pub missions: Vec<MissionRule>,
    pub regions: Vec<RegionRule>,
    pub countries: Vec<CountryRule>,
    pub races: Vec<RaceRule>,
    pub mission_script: Vec<MissionScriptCommand>,
    pub land: Vec<LandPolygon>,
}

impl Ruleset {
    pub fn from_json_str(json: &str) -> Result<Self, GeoscapeError> {
        let ruleset: Ruleset = serde_json::from_str(json)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn from_file(path: &Path) -> Result<Self, GeoscapeError> {
        let contents = fs::read_to_string(path).map_err(|source| GeoscapeError::RulesetRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load-time checks: unique script labels, and every region, mission and
    /// race id named by a weight table must exist.
    pub fn validate(&self) -> Result<(), GeoscapeError> {
        validate_labels(&self.mission_script)?;
        for command in &self.mission_script {
            for id in command.region_weights.all_ids() {
                self.region(id)?;
            }
            for id in command.mission_weights.all_ids() {
                self.mission(id)?;
            }
            for id in command.race_weights.all_ids() {
                self.race(id)?;
            }
        }
        for region in &self.regions {
            for id in region.mission_weights.ids() {
                self.mission(id)?;
            }
        }
        for mission in &self.missions {
            for id in mission.race_weights.all_ids() {
                self.race(id)?;
            }
        }
        for race in &self.races {
            if let Some(id) = &race.supply_mission {
                self.mission(id)?;
            }
        }
        Ok(())
    }

    pub fn ufo(&self, id: &str) -> Result<&UfoRule, GeoscapeError> {
        self.ufos
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownUfo(id.to_owned()))
    }

    pub fn craft(&self, id: &str) -> Result<&CraftRule, GeoscapeError> {
        self.crafts
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownCraft(id.to_owned()))
    }

    pub fn trajectory(&self, id: &str) -> Result<&TrajectoryRule, GeoscapeError> {
        self.trajectories
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownTrajectory(id.to_owned()))
    }

    pub fn mission(&self, id: &str) -> Result<&MissionRule, GeoscapeError> {
        self.missions
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownMission(id.to_owned()))
    }

    pub fn region(&self, id: &str) -> Result<&RegionRule, GeoscapeError> {
        self.regions
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownRegion(id.to_owned()))
    }

    pub fn race(&self, id: &str) -> Result<&RaceRule, GeoscapeError> {
        self.races
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| GeoscapeError::UnknownRace(id.to_owned()))
    }

    pub fn region_at(&self, pos: &Position) -> Option<&RegionRule> {
        self.regions.iter().find(|region| region.contains(pos))
    }

    pub fn country_at(&self, pos: &Position) -> Option<&CountryRule> {
        self.countries
            .iter()
            .find(|country| country.areas.iter().any(|area| area.contains(pos)))
    }

    pub fn is_land(&self, pos: &Position) -> bool {
        self.land.iter().any(|polygon| polygon.contains(pos))
    }
}

/// Reject two script commands sharing the same nonzero label.
pub fn validate_labels(commands: &[MissionScriptCommand]) -> Result<(), GeoscapeError> {
    let mut seen: HashMap<u32, &str> = HashMap::new();
    for command in commands.iter().filter(|c| c.label > 0) {
        if let Some(first) = seen.insert(command.label, &command.name) {
            return Err(GeoscapeError::DuplicateLabel {
                label: command.label,
                first: first.to_owned(),
                second: command.name.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoRule {
    pub id: String,
    /// Knots.
    pub max_speed: f64,
    pub hull: i32,
    pub weapon_damage: i32,
    /// Percent.
    pub weapon_accuracy: u32,
    pub shield_capacity: i32,
    /// Hundredths of a point per 5 seconds; `-1` refills instantly.
    pub shield_recharge: i32,
    pub hunter_killer: bool,
    pub hunt_mode: HuntMode,
    pub hunt_radius_nm: f64,
    /// Activity points per 30 minutes in flight.
    pub activity_score: i32,
    /// Activity points per 30 minutes on the ground.
    pub landed_score: i32,
    /// Interception rounds before an ordinary UFO breaks off.
    pub escape_rounds: u32,
}

impl Default for UfoRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            max_speed: 1000.0,
            hull: 100,
            weapon_damage: 0,
            weapon_accuracy: 50,
            shield_capacity: 0,
            shield_recharge: 0,
            hunter_killer: false,
            hunt_mode: HuntMode::default(),
            hunt_radius_nm: 0.0,
            activity_score: 5,
            landed_score: 10,
            escape_rounds: UFO_ESCAPE_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftWeaponRule {
    pub id: String,
    pub damage: i32,
    pub accuracy: u32,
    pub range_nm: f64,
    pub ammo_max: i32,
    /// Storage item consumed per rearm step; `None` rearms for free.
    pub clip_item: Option<String>,
    pub rearm_rate: i32,
}

impl Default for CraftWeaponRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            damage: 10,
            accuracy: 50,
            range_nm: 20.0,
            ammo_max: 6,
            clip_item: None,
            rearm_rate: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftRule {
    pub id: String,
    pub role: CraftRole,
    /// Knots.
    pub speed: f64,
    pub fuel_max: i32,
    /// Fuel burnt per 10 minutes out.
    pub fuel_use: i32,
    pub hull: i32,
    pub shield_capacity: i32,
    pub max_altitude: Altitude,
    pub terrain: CraftTerrain,
    pub refuel_item: Option<String>,
    /// Fuel restored per hour.
    pub refuel_rate: i32,
    /// Hull restored per hour.
    pub repair_rate: i32,
    pub radar_range_nm: f64,
    pub radar_chance: u32,
    /// Lower is more attractive to hunter-killers.
    pub hk_attraction: i32,
    pub weapons: Vec<CraftWeaponRule>,
}

impl Default for CraftRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            role: CraftRole::default(),
            speed: 2000.0,
            fuel_max: 100,
            fuel_use: 1,
            hull: 100,
            shield_capacity: 0,
            max_altitude: Altitude::VeryHigh,
            terrain: CraftTerrain::default(),
            refuel_item: None,
            refuel_rate: 50,
            repair_rate: 25,
            radar_range_nm: 600.0,
            radar_chance: 100,
            hk_attraction: 100,
            weapons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryPoint {
    /// Index into the region's mission zones.
    pub zone: usize,
    pub altitude: Altitude,
    pub speed_percent: u32,
}

impl Default for TrajectoryPoint {
    fn default() -> Self {
        Self {
            zone: 0,
            altitude: Altitude::VeryLow,
            speed_percent: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryRule {
    pub id: String,
    /// Seconds a UFO stays landed at a ground point.
    pub ground_timer_secs: u32,
    pub points: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionWave {
    pub ufo: String,
    pub count: u32,
    pub trajectory: String,
    /// Minutes after the previous wave.
    pub spawn_timer_minutes: u32,
    /// UFO type flying escort beside each wave UFO.
    pub escort_ufo: Option<String>,
    pub escort_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionRule {
    pub id: String,
    pub objective: MissionObjective,
    pub waves: Vec<MissionWave>,
    pub race_weights: MonthlyWeights,
    /// Zone used by site objectives.
    pub spawn_zone: usize,
    /// Lifetime of a site created by this mission.
    pub site_minutes: u32,
}

impl Default for MissionRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            objective: MissionObjective::default(),
            waves: Vec::new(),
            race_weights: MonthlyWeights::default(),
            spawn_zone: 0,
            site_minutes: MISSION_SITE_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionZone {
    pub areas: Vec<GeoArea>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionRule {
    pub id: String,
    /// Weight in the alien strategy's region table.
    pub weight: u32,
    /// Initial mission table for this region.
    pub mission_weights: WeightedOptions,
    pub areas: Vec<GeoArea>,
    pub zones: Vec<MissionZone>,
}

impl RegionRule {
    pub fn contains(&self, pos: &Position) -> bool {
        self.areas.iter().any(|area| area.contains(pos))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryRule {
    pub id: String,
    pub areas: Vec<GeoArea>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceRule {
    pub id: String,
    /// Mission launched periodically to resupply this race's bases.
    pub supply_mission: Option<String>,
}

/// One authored rule of the monthly mission script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionScriptCommand {
    pub name: String,
    /// Run counter key; commands sharing it share `max_runs`.
    pub var_name: String,
    pub first_month: u32,
    /// `-1` means no upper bound.
    pub last_month: i32,
    pub execution_odds: u32,
    /// `-1` means unlimited.
    pub max_runs: i32,
    pub min_difficulty: u32,
    /// Unique nonzero label, `0` for none.
    pub label: u32,
    /// Signed label references: `+n` needs `n` to have succeeded this pass,
    /// `-n` needs it to have failed or not run.
    pub conditionals: Vec<i32>,
    pub research_triggers: BTreeMap<String, bool>,
    pub region_weights: MonthlyWeights,
    pub mission_weights: MonthlyWeights,
    pub race_weights: MonthlyWeights,
    /// Percent chance to aim at a region hosting a player base.
    pub target_base_odds: u32,
    /// Remove the chosen mission from the strategy table.
    pub use_table: bool,
    /// Months a chosen site location is avoided.
    pub repeat_avoidance: u32,
    /// Minutes before the first wave.
    pub delay_minutes: u32,
}

impl Default for MissionScriptCommand {
    fn default() -> Self {
        Self {
            name: String::new(),
            var_name: String::new(),
            first_month: 0,
            last_month: -1,
            execution_odds: 100,
            max_runs: -1,
            min_difficulty: 0,
            label: 0,
            conditionals: Vec::new(),
            research_triggers: BTreeMap::new(),
            region_weights: MonthlyWeights::default(),
            mission_weights: MonthlyWeights::default(),
            race_weights: MonthlyWeights::default(),
            target_base_odds: 0,
            use_table: true,
            repeat_avoidance: 0,
            delay_minutes: 0,
        }
    }
}

impl MissionScriptCommand {
    /// Run counter key, falling back to the command name.
    pub fn run_key(&self) -> &str {
        if self.var_name.is_empty() {
            &self.name
        } else {
            &self.var_name
        }
    }
}
