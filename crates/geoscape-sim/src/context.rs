//! Simulation context: everything a tick handler may read or mutate.
//!
//! Handlers receive `&mut SimContext` explicitly; nothing is global. The
//! ruleset sits behind an `Arc` so a handler can hold it while mutating the
//! rest of the context.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use geoscape_campaign::AlienStrategy;
use geoscape_core::components::*;
use geoscape_core::constants::ALIEN_BASE_SUPPLY_DAYS;
use geoscape_core::enums::TimeTrigger;
use geoscape_core::error::GeoscapeError;
use geoscape_core::events::Notification;
use geoscape_core::ruleset::Ruleset;
use geoscape_core::types::*;
use geoscape_core::Target;

use crate::dogfight::InterceptionCoordinator;
use crate::engine::SimConfig;
use crate::mission::AlienMission;
use crate::notifications::NotificationQueue;
use crate::registry::TargetRegistry;

/// Alien activity points per region and country for the current month.
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    pub regions: BTreeMap<String, i64>,
    pub countries: BTreeMap<String, i64>,
}

/// Savegame-side state the Geoscape reads and mutates.
#[derive(Debug, Clone, Default)]
pub struct CampaignState {
    pub funds: i64,
    pub researched: BTreeSet<String>,
    /// Months since the campaign started.
    pub months_passed: u32,
    pub activity: ActivityLedger,
}

pub struct SimContext {
    pub world: World,
    pub clock: GameTime,
    pub registry: TargetRegistry,
    pub notifications: NotificationQueue,
    pub dogfights: InterceptionCoordinator,
    pub missions: Vec<AlienMission>,
    pub strategy: AlienStrategy,
    pub ruleset: Arc<Ruleset>,
    pub rng: ChaCha8Rng,
    pub config: SimConfig,
    pub campaign: CampaignState,
    /// Craft and UFO locked into a hunter-killer attack for the rest of the
    /// current step.
    pub attacking: HashSet<Target>,
    /// Handler invocations per trigger level, indexed by `TimeTrigger::index`.
    pub trigger_counts: [u64; 6],
    /// Handlers run by the most recent step, in order.
    pub last_cascade: Vec<TimeTrigger>,
    next_id: u32,
}

impl SimContext {
    pub fn new(config: SimConfig, ruleset: Arc<Ruleset>) -> Self {
        Self {
            world: World::new(),
            clock: config.start_time,
            registry: TargetRegistry::new(),
            notifications: NotificationQueue::new(),
            dogfights: InterceptionCoordinator::new(config.zoom_transition_frames),
            missions: Vec::new(),
            strategy: AlienStrategy::from_ruleset(&ruleset),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            ruleset,
            config,
            campaign: CampaignState::default(),
            attacking: HashSet::new(),
            trigger_counts: [0; 6],
            last_cascade: Vec::new(),
            next_id: 1,
        }
    }

    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue a notification stamped with the current game time.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(self.clock, notification);
    }

    // --- Entity creation ---

    pub fn spawn_base(&mut self, name: &str, pos: Position) -> BaseId {
        let id = BaseId(self.allocate_id());
        let entity = self.world.spawn((PlayerBase::new(id, name), pos));
        self.registry.register_base(id, entity);
        id
    }

    pub fn spawn_craft(&mut self, rule_id: &str, base: BaseId) -> Result<CraftId, GeoscapeError> {
        let ruleset = Arc::clone(&self.ruleset);
        let rule = ruleset.craft(rule_id)?;
        let pos = self
            .registry
            .base_position(&self.world, base)
            .unwrap_or_default();
        let id = CraftId(self.allocate_id());
        let entity = self.world.spawn((Craft::from_rule(id, base, rule), pos));
        self.registry.register(Target::Craft(id), entity);
        Ok(id)
    }

    pub fn spawn_ufo(
        &mut self,
        rule_id: &str,
        pos: Position,
    ) -> Result<(UfoId, Entity), GeoscapeError> {
        let ruleset = Arc::clone(&self.ruleset);
        let rule = ruleset.ufo(rule_id)?;
        let id = UfoId(self.allocate_id());
        let entity = self.world.spawn((Ufo::from_rule(id, rule), pos));
        self.registry.register(Target::Ufo(id), entity);
        tracing::debug!(target: "geoscape::ufo", ufo = %id, rule = rule_id, "ufo.spawned");
        Ok((id, entity))
    }

    pub fn spawn_waypoint(&mut self, pos: Position, owner: Option<UfoId>) -> WaypointId {
        let id = WaypointId(self.allocate_id());
        let entity = self.world.spawn((Waypoint { id, owner }, pos));
        self.registry.register(Target::Waypoint(id), entity);
        id
    }

    pub fn spawn_site(
        &mut self,
        mission_rule: &str,
        region: &str,
        race: &str,
        minutes: u32,
        pos: Position,
    ) -> SiteId {
        let id = SiteId(self.allocate_id());
        let site = MissionSite {
            id,
            mission_rule: mission_rule.to_owned(),
            region: region.to_owned(),
            race: race.to_owned(),
            minutes_remaining: minutes,
            detected: false,
        };
        let entity = self.world.spawn((site, pos));
        self.registry.register(Target::MissionSite(id), entity);
        id
    }

    pub fn spawn_alien_base(&mut self, region: &str, race: &str, pos: Position) -> AlienBaseId {
        let id = AlienBaseId(self.allocate_id());
        let base = AlienBase {
            id,
            region: region.to_owned(),
            race: race.to_owned(),
            detected: false,
            supply_days_remaining: ALIEN_BASE_SUPPLY_DAYS,
        };
        let entity = self.world.spawn((base, pos));
        self.registry.register(Target::AlienBase(id), entity);
        id
    }

    /// Remove a target from both the registry and the world.
    pub fn despawn_target(&mut self, target: Target) {
        if let Some(entity) = self.registry.unregister(target) {
            let _ = self.world.despawn(entity);
        }
    }
}
