//! Alien strategy state: weighted region and mission tables, run counters,
//! and the memory of recently used site locations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use geoscape_core::ruleset::Ruleset;
use geoscape_core::weights::WeightedOptions;

/// A site location used recently by one script variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMemory {
    pub region: String,
    pub zone: usize,
    pub area: usize,
    pub months_left: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlienStrategy {
    region_weights: WeightedOptions,
    region_missions: BTreeMap<String, WeightedOptions>,
    run_counts: BTreeMap<String, u32>,
    recent_sites: BTreeMap<String, Vec<SiteMemory>>,
}

impl AlienStrategy {
    /// Seed the tables from the regions' authored weights.
    pub fn from_ruleset(ruleset: &Ruleset) -> Self {
        let mut strategy = Self::default();
        for region in &ruleset.regions {
            strategy.region_weights.set(region.id.clone(), region.weight);
            if !region.mission_weights.is_empty() {
                strategy
                    .region_missions
                    .insert(region.id.clone(), region.mission_weights.clone());
            }
        }
        strategy
    }

    pub fn region_weights(&self) -> &WeightedOptions {
        &self.region_weights
    }

    pub fn missions_in(&self, region: &str) -> Option<&WeightedOptions> {
        self.region_missions.get(region)
    }

    pub fn has_mission(&self, region: &str, mission: &str) -> bool {
        self.region_missions
            .get(region)
            .is_some_and(|table| table.weight(mission) > 0)
    }

    /// Drop a mission from a region's table. A region left with no missions
    /// also leaves the region table.
    pub fn remove_mission(&mut self, region: &str, mission: &str) -> bool {
        let Some(table) = self.region_missions.get_mut(region) else {
            return false;
        };
        let removed = table.remove(mission);
        if table.is_empty() {
            self.region_missions.remove(region);
            self.region_weights.remove(region);
        }
        removed
    }

    pub fn runs(&self, key: &str) -> u32 {
        self.run_counts.get(key).copied().unwrap_or(0)
    }

    pub fn increment_runs(&mut self, key: &str) {
        *self.run_counts.entry(key.to_owned()).or_insert(0) += 1;
    }

    pub fn is_recent(&self, var_name: &str, region: &str, zone: usize, area: usize) -> bool {
        self.recent_sites.get(var_name).is_some_and(|memory| {
            memory
                .iter()
                .any(|m| m.region == region && m.zone == zone && m.area == area)
        })
    }

    pub fn remember_site(
        &mut self,
        var_name: &str,
        region: &str,
        zone: usize,
        area: usize,
        months: u32,
    ) {
        if months == 0 {
            return;
        }
        self.recent_sites
            .entry(var_name.to_owned())
            .or_default()
            .push(SiteMemory {
                region: region.to_owned(),
                zone,
                area,
                months_left: months,
            });
    }

    /// Called once per month: forget locations whose avoidance window ran out.
    pub fn age_site_memory(&mut self) {
        for memory in self.recent_sites.values_mut() {
            memory.retain_mut(|m| {
                m.months_left = m.months_left.saturating_sub(1);
                m.months_left > 0
            });
        }
        self.recent_sites.retain(|_, memory| !memory.is_empty());
    }
}
