//! ECS components for hecs entities.
//!
//! Components are plain data structs. The only behaviour here is building a
//! component from its ruleset entry; game logic lives in systems.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::SHIELD_UNINITIALIZED;
use crate::enums::*;
use crate::ruleset::{CraftRule, CraftWeaponRule, UfoRule};
use crate::target::Target;
use crate::types::*;

/// Per-type UFO numbers copied from the ruleset at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfoStats {
    pub max_speed: f64,
    pub hull: i32,
    pub weapon_damage: i32,
    pub weapon_accuracy: u32,
    pub shield_capacity: i32,
    pub shield_recharge: i32,
    pub hunter_killer: bool,
    pub hunt_mode: HuntMode,
    pub hunt_radius_nm: f64,
    pub activity_score: i32,
    pub landed_score: i32,
    pub escape_rounds: u32,
}

impl From<&UfoRule> for UfoStats {
    fn from(rule: &UfoRule) -> Self {
        Self {
            max_speed: rule.max_speed,
            hull: rule.hull,
            weapon_damage: rule.weapon_damage,
            weapon_accuracy: rule.weapon_accuracy,
            shield_capacity: rule.shield_capacity,
            shield_recharge: rule.shield_recharge,
            hunter_killer: rule.hunter_killer,
            hunt_mode: rule.hunt_mode,
            hunt_radius_nm: rule.hunt_radius_nm,
            activity_score: rule.activity_score,
            landed_score: rule.landed_score,
            escape_rounds: rule.escape_rounds,
        }
    }
}

/// Hostile craft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub id: UfoId,
    pub rule_id: String,
    pub stats: UfoStats,
    pub status: UfoStatus,
    pub mission: Option<MissionId>,
    pub trajectory: String,
    /// Index of the trajectory point currently flown toward.
    pub trajectory_point: usize,
    pub altitude: Altitude,
    /// Current speed in knots.
    pub speed: f64,
    pub destination: Option<Target>,
    pub detected: bool,
    pub hyper_detected: bool,
    /// `SHIELD_UNINITIALIZED` until the first tick.
    pub shield: i32,
    pub damage: i32,
    pub hunting: Option<CraftId>,
    pub escorting: Option<UfoId>,
    /// Landed ground timer or crash-site expiry, in seconds.
    pub seconds_remaining: u32,
    /// Player base this UFO is assaulting on arrival.
    pub assault_base: Option<BaseId>,
}

impl Ufo {
    pub fn from_rule(id: UfoId, rule: &UfoRule) -> Self {
        let stats = UfoStats::from(rule);
        Self {
            id,
            rule_id: rule.id.clone(),
            speed: stats.max_speed,
            stats,
            status: UfoStatus::Flying,
            mission: None,
            trajectory: String::new(),
            trajectory_point: 0,
            altitude: Altitude::default(),
            destination: None,
            detected: false,
            hyper_detected: false,
            shield: SHIELD_UNINITIALIZED,
            damage: 0,
            hunting: None,
            escorting: None,
            seconds_remaining: 0,
            assault_base: None,
        }
    }
}

/// Weapon slot on a player craft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftWeapon {
    pub id: String,
    pub damage: i32,
    pub accuracy: u32,
    pub range_nm: f64,
    pub ammo: i32,
    pub ammo_max: i32,
    pub clip_item: Option<String>,
    pub rearm_rate: i32,
}

impl From<&CraftWeaponRule> for CraftWeapon {
    fn from(rule: &CraftWeaponRule) -> Self {
        Self {
            id: rule.id.clone(),
            damage: rule.damage,
            accuracy: rule.accuracy,
            range_nm: rule.range_nm,
            ammo: rule.ammo_max,
            ammo_max: rule.ammo_max,
            clip_item: rule.clip_item.clone(),
            rearm_rate: rule.rearm_rate,
        }
    }
}

/// Player craft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub id: CraftId,
    pub rule_id: String,
    pub base: BaseId,
    pub role: CraftRole,
    pub status: CraftStatus,
    /// Knots.
    pub speed: f64,
    pub fuel: i32,
    pub fuel_max: i32,
    pub fuel_use: i32,
    pub hull: i32,
    pub damage: i32,
    pub shield: i32,
    pub shield_capacity: i32,
    pub max_altitude: Altitude,
    pub terrain: CraftTerrain,
    pub refuel_item: Option<String>,
    pub refuel_rate: i32,
    pub repair_rate: i32,
    pub radar_range_nm: f64,
    pub radar_chance: u32,
    pub hk_attraction: i32,
    pub weapons: Vec<CraftWeapon>,
    pub destination: Option<Target>,
    /// Heading home; takes precedence over `destination`.
    pub returning: bool,
    pub in_dogfight: bool,
    pub low_fuel: bool,
    /// A missing-item notification was already raised for the current
    /// maintenance step.
    pub shortage_warned: bool,
}

impl Craft {
    pub fn from_rule(id: CraftId, base: BaseId, rule: &CraftRule) -> Self {
        Self {
            id,
            rule_id: rule.id.clone(),
            base,
            role: rule.role,
            status: CraftStatus::Ready,
            speed: rule.speed,
            fuel: rule.fuel_max,
            fuel_max: rule.fuel_max,
            fuel_use: rule.fuel_use,
            hull: rule.hull,
            damage: 0,
            shield: rule.shield_capacity,
            shield_capacity: rule.shield_capacity,
            max_altitude: rule.max_altitude,
            terrain: rule.terrain,
            refuel_item: rule.refuel_item.clone(),
            refuel_rate: rule.refuel_rate,
            repair_rate: rule.repair_rate,
            radar_range_nm: rule.radar_range_nm,
            radar_chance: rule.radar_chance,
            hk_attraction: rule.hk_attraction,
            weapons: rule.weapons.iter().map(CraftWeapon::from).collect(),
            destination: None,
            returning: false,
            in_dogfight: false,
            low_fuel: false,
            shortage_warned: false,
        }
    }

    pub fn has_loaded_weapon(&self) -> bool {
        self.weapons.iter().any(|w| w.ammo > 0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    /// UFO flying to this point; player waypoints have none.
    pub owner: Option<UfoId>,
}

/// Ground objective created when a site mission lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSite {
    pub id: SiteId,
    pub mission_rule: String,
    pub region: String,
    pub race: String,
    pub minutes_remaining: u32,
    pub detected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienBase {
    pub id: AlienBaseId,
    pub region: String,
    pub race: String,
    pub detected: bool,
    /// Days until the next supply mission leaves for this base.
    pub supply_days_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBase {
    pub id: BaseId,
    pub name: String,
    pub radar_range_nm: f64,
    /// Percent per 30-minute sweep.
    pub detection_chance: u32,
    pub hyper_detection: bool,
    /// Percent chance a retaliation UFO spots this base.
    pub visibility: u32,
    pub storage: BTreeMap<String, i32>,
}

impl PlayerBase {
    pub fn new(id: BaseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            radar_range_nm: 1500.0,
            detection_chance: 30,
            hyper_detection: false,
            visibility: 20,
            storage: BTreeMap::new(),
        }
    }
}
