//! Target registry: maps every `Target` (and every player base) to its hecs
//! entity and answers position and distance queries.
//!
//! A reference whose entity is gone, or whose UFO is destroyed, reads as
//! absent. Callers drop such references without complaint.

use std::collections::HashMap;

use hecs::{Entity, World};

use geoscape_core::components::Ufo;
use geoscape_core::enums::UfoStatus;
use geoscape_core::types::{BaseId, CraftId, Position, UfoId};
use geoscape_core::Target;

#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: HashMap<Target, Entity>,
    bases: HashMap<BaseId, Entity>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: Target, entity: Entity) {
        self.targets.insert(target, entity);
    }

    pub fn unregister(&mut self, target: Target) -> Option<Entity> {
        self.targets.remove(&target)
    }

    pub fn register_base(&mut self, base: BaseId, entity: Entity) {
        self.bases.insert(base, entity);
    }

    pub fn entity(&self, target: Target) -> Option<Entity> {
        self.targets.get(&target).copied()
    }

    pub fn ufo(&self, id: UfoId) -> Option<Entity> {
        self.entity(Target::Ufo(id))
    }

    pub fn craft(&self, id: CraftId) -> Option<Entity> {
        self.entity(Target::Craft(id))
    }

    pub fn base(&self, id: BaseId) -> Option<Entity> {
        self.bases.get(&id).copied()
    }

    pub fn bases(&self) -> impl Iterator<Item = (BaseId, Entity)> + '_ {
        self.bases.iter().map(|(&id, &entity)| (id, entity))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_alive(&self, world: &World, target: Target) -> bool {
        let Some(entity) = self.entity(target) else {
            return false;
        };
        if !world.contains(entity) {
            return false;
        }
        match target {
            Target::Ufo(_) => world
                .get::<&Ufo>(entity)
                .map(|ufo| ufo.status != UfoStatus::Destroyed)
                .unwrap_or(false),
            Target::Waypoint(_)
            | Target::MissionSite(_)
            | Target::AlienBase(_)
            | Target::Craft(_) => true,
        }
    }

    /// Position of a live target.
    pub fn position(&self, world: &World, target: Target) -> Option<Position> {
        if !self.is_alive(world, target) {
            return None;
        }
        let entity = self.entity(target)?;
        world.get::<&Position>(entity).ok().map(|pos| *pos)
    }

    pub fn base_position(&self, world: &World, base: BaseId) -> Option<Position> {
        let entity = self.base(base)?;
        world.get::<&Position>(entity).ok().map(|pos| *pos)
    }

    /// Great-circle distance between two live targets, in nautical miles.
    pub fn distance(&self, world: &World, a: Target, b: Target) -> Option<f64> {
        let pa = self.position(world, a)?;
        let pb = self.position(world, b)?;
        Some(pa.distance_nm(&pb))
    }

    /// Live targets within `radius_nm` of `origin`, nearest first.
    pub fn targets_within(
        &self,
        world: &World,
        origin: &Position,
        radius_nm: f64,
        filter: impl Fn(Target) -> bool,
    ) -> Vec<(Target, f64)> {
        let mut found: Vec<(Target, f64)> = self
            .targets
            .keys()
            .copied()
            .filter(|&target| filter(target))
            .filter_map(|target| {
                let pos = self.position(world, target)?;
                let distance = origin.distance_nm(&pos);
                (distance <= radius_nm).then_some((target, distance))
            })
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }
}
