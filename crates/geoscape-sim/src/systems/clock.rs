//! One 5-second step and the cascade of trigger handlers it fires.
//!
//! The clock reports the coarsest boundary crossed. Every handler at or below
//! that level runs once, coarsest first: a month boundary also runs the daily,
//! hourly, 30-minute, 10-minute and 5-second handlers.

use geoscape_core::enums::TimeTrigger;
use geoscape_core::error::GeoscapeError;

use crate::context::SimContext;
use crate::systems;

/// Handler levels fired for a crossed boundary, in execution order.
pub fn cascade(crossed: TimeTrigger) -> impl Iterator<Item = TimeTrigger> {
    TimeTrigger::DESCENDING
        .into_iter()
        .filter(move |&level| level <= crossed)
}

/// Run one step. A failing handler does not stop the rest of the cascade:
/// every handler runs, then the first error is returned.
pub fn run_step(ctx: &mut SimContext) -> Result<(), GeoscapeError> {
    let crossed = ctx.clock.advance();
    ctx.last_cascade.clear();
    if crossed > TimeTrigger::FiveSeconds {
        tracing::trace!(target: "geoscape::clock", time = %ctx.clock, ?crossed, "clock.boundary");
    }
    let mut first_error = None;
    for level in cascade(crossed) {
        ctx.trigger_counts[level.index()] += 1;
        ctx.last_cascade.push(level);
        run_handler(ctx, level, &mut first_error);
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn keep_first(
    first: &mut Option<GeoscapeError>,
    level: TimeTrigger,
    result: Result<(), GeoscapeError>,
) {
    if let Err(err) = result {
        tracing::error!(target: "geoscape::clock", ?level, error = %err, "clock.handler_failed");
        if first.is_none() {
            *first = Some(err);
        }
    }
}

fn run_handler(ctx: &mut SimContext, level: TimeTrigger, first: &mut Option<GeoscapeError>) {
    match level {
        TimeTrigger::OneMonth => {
            keep_first(first, level, systems::missions::monthly(ctx));
        }
        TimeTrigger::OneDay => {
            keep_first(first, level, systems::missions::daily(ctx));
        }
        TimeTrigger::OneHour => {
            systems::craft::maintenance(ctx);
        }
        TimeTrigger::ThirtyMinutes => {
            keep_first(first, level, systems::missions::think(ctx));
            keep_first(first, level, systems::ufo::crash_expiry(ctx));
            systems::missions::site_expiry(ctx);
            systems::detection::run(ctx);
            systems::activity::run(ctx);
        }
        TimeTrigger::TenMinutes => {
            keep_first(first, level, systems::hunting::run(ctx));
            systems::detection::retaliation(ctx);
            systems::craft::fuel(ctx);
        }
        TimeTrigger::FiveSeconds => {
            ctx.attacking.clear();
            keep_first(first, level, systems::ufo::run(ctx));
            systems::craft::movement(ctx);
            systems::dogfight::gate(ctx);
            systems::cleanup::run(ctx);
        }
    }
}
