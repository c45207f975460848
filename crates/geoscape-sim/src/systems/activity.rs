use std::sync::Arc;

use geoscape_core::components::Ufo;
use geoscape_core::enums::UfoStatus;
use geoscape_core::types::Position;

use crate::context::SimContext;

/// Per 30 minutes: UFOs in the air or on the ground score alien activity for
/// the region and country below them.
pub fn run(ctx: &mut SimContext) {
    let ruleset = Arc::clone(&ctx.ruleset);
    let scores: Vec<(Position, i64)> = ctx
        .world
        .query::<(&Ufo, &Position)>()
        .iter()
        .filter_map(|(_, (u, pos))| {
            let points = match u.status {
                UfoStatus::Flying => u.stats.activity_score,
                UfoStatus::Landed => u.stats.landed_score,
                UfoStatus::Crashed | UfoStatus::Destroyed => return None,
            };
            Some((*pos, i64::from(points)))
        })
        .collect();

    let ledger = &mut ctx.campaign.activity;
    for (pos, points) in scores {
        if let Some(region) = ruleset.region_at(&pos) {
            *ledger.regions.entry(region.id.clone()).or_default() += points;
        }
        if let Some(country) = ruleset.country_at(&pos) {
            *ledger.countries.entry(country.id.clone()).or_default() += points;
        }
    }
}
