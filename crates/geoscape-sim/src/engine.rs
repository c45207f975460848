//! Geoscape engine: the outer time loop.
//!
//! `GeoscapeEngine` owns the simulation context, applies queued player
//! commands, drives the zoom transitions and decides on every `advance` call
//! whether the clock steps, a dogfight round runs, or nothing moves until the
//! screen layer catches up. Completely headless, enabling deterministic
//! testing.

use std::collections::VecDeque;
use std::sync::Arc;

use hecs::World;

use geoscape_campaign::MissionRequest;
use geoscape_core::commands::PlayerCommand;
use geoscape_core::enums::{Suspension, TimeSpeed};
use geoscape_core::error::GeoscapeError;
use geoscape_core::events::{Notification, QueuedNotification};
use geoscape_core::ruleset::Ruleset;
use geoscape_core::state::GeoscapeSnapshot;
use geoscape_core::types::*;

use crate::context::SimContext;
use crate::dogfight::InterceptionCoordinator;
use crate::systems;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same campaign.
    pub seed: u64,
    pub difficulty: u32,
    pub start_time: GameTime,
    /// Nearby armed craft join a hunter-killer fight.
    pub escorts_join_fight: bool,
    /// Length of the zoom in/out animation, in `advance` calls.
    pub zoom_transition_frames: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: 0,
            start_time: GameTime::default(),
            escorts_join_fight: false,
            zoom_transition_frames: geoscape_core::constants::ZOOM_TRANSITION_FRAMES,
        }
    }
}

/// What one `advance` call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    /// 5-second steps taken.
    pub steps: u32,
    /// Dogfight rounds fought.
    pub rounds: u32,
    /// Handler invocations per trigger level during this call.
    pub triggers: [u64; 6],
    pub suspension: Suspension,
    pub time: GameTime,
}

pub struct GeoscapeEngine {
    ctx: SimContext,
    command_queue: VecDeque<PlayerCommand>,
    suspension: Suspension,
}

impl GeoscapeEngine {
    pub fn new(config: SimConfig, ruleset: Ruleset) -> Self {
        Self {
            ctx: SimContext::new(config, Arc::new(ruleset)),
            command_queue: VecDeque::new(),
            suspension: Suspension::Running,
        }
    }

    /// Run the mission script for the opening month.
    pub fn start_campaign(&mut self) -> Result<usize, GeoscapeError> {
        systems::missions::run_script(&mut self.ctx)
    }

    /// Queue a player command for processing at the next `advance`.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the strategic layer by up to one speed setting's worth of time.
    ///
    /// Returns early without stepping while a notification waits, a zoom
    /// transition runs or a dogfight is pending or on screen. Configuration
    /// errors raised by a handler abort the call; everything already stepped
    /// stays committed.
    pub fn advance(&mut self, speed: TimeSpeed) -> Result<AdvanceReport, GeoscapeError> {
        let counts_before = self.ctx.trigger_counts;
        let mut report = AdvanceReport::default();

        self.process_commands();

        let promoted = self.ctx.dogfights.update_transitions();
        if !promoted.is_empty() {
            systems::dogfight::gate(&mut self.ctx);
        }

        match self.compute_suspension() {
            Suspension::AwaitingNotification | Suspension::AwaitingTransition => {}
            Suspension::Intercepting => {
                report.rounds = systems::combat::run_round(&mut self.ctx);
            }
            Suspension::Running => {
                // Minimized fights keep the clock at its finest step.
                let steps = if self.ctx.dogfights.active().is_empty() {
                    speed.steps()
                } else {
                    1
                };
                report.steps = self.run_steps(steps)?;
            }
        }

        self.suspension = self.compute_suspension();
        for (i, count) in report.triggers.iter_mut().enumerate() {
            *count = self.ctx.trigger_counts[i] - counts_before[i];
        }
        report.suspension = self.suspension;
        report.time = self.ctx.clock;
        Ok(report)
    }

    fn run_steps(&mut self, steps: u32) -> Result<u32, GeoscapeError> {
        let mut taken = 0;
        for _ in 0..steps {
            if self.must_stop() {
                break;
            }
            systems::clock::run_step(&mut self.ctx)?;
            taken += 1;
        }
        Ok(taken)
    }

    fn must_stop(&self) -> bool {
        !self.ctx.notifications.is_empty()
            || self.ctx.dogfights.has_pending()
            || self.ctx.dogfights.transition_running()
            || self.ctx.dogfights.has_foreground()
    }

    fn compute_suspension(&self) -> Suspension {
        if !self.ctx.notifications.is_empty() {
            Suspension::AwaitingNotification
        } else if self.ctx.dogfights.has_pending() || self.ctx.dogfights.transition_running() {
            Suspension::AwaitingTransition
        } else if self.ctx.dogfights.has_foreground() {
            Suspension::Intercepting
        } else {
            Suspension::Running
        }
    }

    /// Pop the oldest notification once the screen layer has shown it.
    pub fn dismiss_notification(&mut self) -> Option<QueuedNotification> {
        let popped = self.ctx.notifications.pop();
        self.suspension = self.compute_suspension();
        popped
    }

    /// Queue a notification on behalf of a collaborator (production, research).
    pub fn notify(&mut self, notification: Notification) {
        self.ctx.notify(notification);
        self.suspension = self.compute_suspension();
    }

    pub fn snapshot(&self) -> GeoscapeSnapshot {
        systems::snapshot::build_snapshot(&self.ctx, self.suspension)
    }

    // --- Accessors ---

    pub fn time(&self) -> GameTime {
        self.ctx.clock
    }

    pub fn suspension(&self) -> Suspension {
        self.suspension
    }

    pub fn world(&self) -> &World {
        &self.ctx.world
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn dogfights(&self) -> &InterceptionCoordinator {
        &self.ctx.dogfights
    }

    pub fn trigger_counts(&self) -> [u64; 6] {
        self.ctx.trigger_counts
    }

    // --- Collaborator entry points ---

    pub fn add_base(&mut self, name: &str, pos: Position) -> BaseId {
        self.ctx.spawn_base(name, pos)
    }

    pub fn add_craft(&mut self, rule_id: &str, base: BaseId) -> Result<CraftId, GeoscapeError> {
        self.ctx.spawn_craft(rule_id, base)
    }

    pub fn add_waypoint(&mut self, pos: Position) -> WaypointId {
        self.ctx.spawn_waypoint(pos, None)
    }

    /// Place a free-flying UFO with no mission behind it.
    pub fn spawn_ufo(&mut self, rule_id: &str, pos: Position) -> Result<UfoId, GeoscapeError> {
        self.ctx.spawn_ufo(rule_id, pos).map(|(id, _)| id)
    }

    pub fn create_mission(&mut self, request: &MissionRequest) -> Result<MissionId, GeoscapeError> {
        systems::missions::create_mission(&mut self.ctx, request, None)
    }

    pub fn complete_research(&mut self, topic: &str) {
        self.ctx.campaign.researched.insert(topic.to_owned());
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::LaunchCraft { craft, target } => {
                systems::craft::launch(&mut self.ctx, craft, target);
            }
            PlayerCommand::RedirectCraft { craft, target } => {
                systems::craft::redirect(&mut self.ctx, craft, target);
            }
            PlayerCommand::ReturnToBase { craft } => {
                systems::craft::return_to_base(&mut self.ctx, craft);
            }
            PlayerCommand::MinimizeDogfight { craft } => {
                self.ctx.dogfights.minimize(craft);
            }
            PlayerCommand::RestoreDogfight { craft } => {
                self.ctx.dogfights.restore(craft);
            }
            PlayerCommand::DisengageDogfight { craft } => {
                systems::dogfight::disengage(&mut self.ctx, craft);
            }
        }
    }
}
