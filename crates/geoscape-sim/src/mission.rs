//! Alien mission data model.
//!
//! Stored in the simulation context's mission list, NOT as ECS entities. UFOs
//! point back at their mission by id.

use geoscape_campaign::SiteChoice;
use geoscape_core::enums::MissionObjective;
use geoscape_core::state::MissionView;
use geoscape_core::types::{AlienBaseId, BaseId, MissionId};

#[derive(Debug, Clone)]
pub struct AlienMission {
    pub id: MissionId,
    pub rule_id: String,
    pub region: String,
    pub race: String,
    pub objective: MissionObjective,
    /// Index of the next wave to spawn.
    pub next_wave: usize,
    pub waves_total: usize,
    /// Minutes until the next wave, counted down on the 30-minute boundary.
    pub spawn_countdown_minutes: u32,
    /// Alien base this mission was launched from or supplies.
    pub alien_base: Option<AlienBaseId>,
    /// Site location chosen by the script.
    pub site: Option<SiteChoice>,
    /// Player base found by one of this mission's UFOs.
    pub retaliation_base: Option<BaseId>,
}

impl AlienMission {
    pub fn waves_remaining(&self) -> bool {
        self.next_wave < self.waves_total
    }

    /// All waves are out and none of their UFOs is still around.
    pub fn is_over(&self, live_ufos: usize) -> bool {
        !self.waves_remaining() && live_ufos == 0
    }

    pub fn view(&self) -> MissionView {
        MissionView {
            id: self.id,
            rule_id: self.rule_id.clone(),
            region: self.region.clone(),
            race: self.race.clone(),
            objective: self.objective,
            waves_spawned: self.next_wave,
            waves_total: self.waves_total,
            spawn_countdown_minutes: self.spawn_countdown_minutes,
            alien_base: self.alien_base,
        }
    }
}
