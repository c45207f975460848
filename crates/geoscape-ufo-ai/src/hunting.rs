//! Hunter-killer target selection.
//!
//! Every 10 minutes a flying hunter-killer re-scores the craft around it. Lower
//! attraction is better. The current target is kept while it stays in range
//! and is still best or tied for best.

use geoscape_core::enums::{CraftRole, CraftStatus, HuntMode};
use geoscape_core::types::CraftId;

use crate::profiles::get_profile;

/// A player craft as seen by a hunting UFO.
#[derive(Debug, Clone)]
pub struct HuntCandidate {
    pub craft: CraftId,
    pub role: CraftRole,
    pub status: CraftStatus,
    pub distance_nm: f64,
    pub hk_attraction: i32,
    pub in_dogfight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntDecision {
    /// Nothing to chase and nothing was being chased.
    Idle,
    Keep(CraftId),
    Switch(CraftId),
    /// The current target is gone or out of range and nothing replaces it.
    Disengage,
}

/// Attraction score of one candidate, or `None` when it cannot be hunted.
pub fn attraction(mode: HuntMode, candidate: &HuntCandidate) -> Option<i32> {
    if candidate.status != CraftStatus::Out || candidate.in_dogfight {
        return None;
    }
    let bias = get_profile(mode).bias(candidate.role)?;
    Some(candidate.hk_attraction.saturating_add(bias))
}

pub fn select_target(
    mode: HuntMode,
    radius_nm: f64,
    current: Option<CraftId>,
    candidates: &[HuntCandidate],
) -> HuntDecision {
    let scored: Vec<(i32, &HuntCandidate)> = candidates
        .iter()
        .filter(|c| c.distance_nm <= radius_nm)
        .filter_map(|c| attraction(mode, c).map(|score| (score, c)))
        .collect();

    let best = scored.iter().min_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.distance_nm.total_cmp(&b.1.distance_nm))
    });

    let Some(&(best_score, best)) = best else {
        return match current {
            Some(_) => HuntDecision::Disengage,
            None => HuntDecision::Idle,
        };
    };

    if let Some(current) = current {
        let kept = scored
            .iter()
            .find(|(_, c)| c.craft == current)
            .is_some_and(|&(score, _)| score <= best_score);
        if kept {
            return HuntDecision::Keep(current);
        }
    }
    HuntDecision::Switch(best.craft)
}
