//! Interception coordinator.
//!
//! Admits, queues, promotes and tears down interception sessions. Sessions
//! live here, NOT in the ECS; systems look up the craft and UFO through the
//! target registry.
//!
//! Admission: ordinary sessions are capped at `MAX_DOGFIGHTS` counting active
//! and pending together. A hunter-killer attack ignores that cap but at most one
//! may exist, and admitting it deletes every ordinary session. Pending sessions
//! wait for the zoom-in transition, then all start in one step. Promotion pops
//! from the back of the pending queue, so a hunter-killer's main session (pushed
//! last) is serviced before its escorts (pushed to the front).

use std::collections::VecDeque;

use geoscape_core::constants::{MAX_DOGFIGHTS, MAX_ESCORT_JOINERS, MAX_HUNTER_KILLER_DOGFIGHTS};
use geoscape_core::enums::DogfightWait;
use geoscape_core::state::DogfightView;
use geoscape_core::types::{CraftId, UfoId};

#[derive(Debug, Clone, PartialEq)]
pub struct DogfightSession {
    pub craft: CraftId,
    pub ufo: UfoId,
    pub hunter_killer: bool,
    /// Enrolled automatically beside a hunter-killer attack.
    pub joined: bool,
    /// Zero until promoted.
    pub slot: u32,
    pub interception_count: u32,
    pub minimized: bool,
    pub waiting: Option<DogfightWait>,
    pub rounds: u32,
}

impl DogfightSession {
    fn new(craft: CraftId, ufo: UfoId, hunter_killer: bool, joined: bool) -> Self {
        Self {
            craft,
            ufo,
            hunter_killer,
            joined,
            slot: 0,
            interception_count: 0,
            minimized: false,
            waiting: None,
            rounds: 0,
        }
    }

    /// Whether this session fights on screen this round.
    pub fn is_fighting(&self) -> bool {
        !self.minimized && self.waiting.is_none()
    }

    fn view(&self, active: bool) -> DogfightView {
        DogfightView {
            craft: self.craft,
            ufo: self.ufo,
            slot: self.slot,
            interception_count: self.interception_count,
            hunter_killer: self.hunter_killer,
            minimized: self.minimized,
            waiting: self.waiting,
            active,
            rounds: self.rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Ordinary sessions are full.
    AtCapacity,
    /// A hunter-killer fight blocks new sessions.
    HunterKillerActive,
    /// The craft already has a session.
    AlreadyEngaged,
}

/// Zoom animation measured in `advance` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionTimer {
    frames_remaining: u32,
    running: bool,
    done: bool,
}

impl TransitionTimer {
    pub fn start(&mut self, frames: u32) {
        self.frames_remaining = frames;
        self.running = true;
        self.done = frames == 0;
    }

    /// Advance one frame. Returns true once the animation has finished.
    pub fn tick(&mut self) -> bool {
        if self.running && !self.done {
            self.frames_remaining = self.frames_remaining.saturating_sub(1);
            self.done = self.frames_remaining == 0;
        }
        self.done
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[derive(Debug)]
pub struct InterceptionCoordinator {
    active: Vec<DogfightSession>,
    pending: VecDeque<DogfightSession>,
    zoom_in: TransitionTimer,
    zoom_out: TransitionTimer,
    transition_frames: u32,
}

impl InterceptionCoordinator {
    pub fn new(transition_frames: u32) -> Self {
        Self {
            active: Vec::new(),
            pending: VecDeque::new(),
            zoom_in: TransitionTimer::default(),
            zoom_out: TransitionTimer::default(),
            transition_frames,
        }
    }

    // --- Queries ---

    pub fn active(&self) -> &[DogfightSession] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [DogfightSession] {
        &mut self.active
    }

    pub fn pending(&self) -> impl Iterator<Item = &DogfightSession> {
        self.pending.iter()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.pending.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &DogfightSession> {
        self.active.iter().chain(self.pending.iter())
    }

    pub fn session_for_craft(&self, craft: CraftId) -> Option<&DogfightSession> {
        self.all().find(|s| s.craft == craft)
    }

    pub fn has_session_for_ufo(&self, ufo: UfoId) -> bool {
        self.all().any(|s| s.ufo == ufo)
    }

    pub fn hunter_killer_count(&self) -> usize {
        self.all().filter(|s| s.hunter_killer).count()
    }

    pub fn has_hunter_killer(&self) -> bool {
        self.hunter_killer_count() > 0
    }

    /// Ordinary sessions, active plus pending.
    pub fn non_hunter_killer_count(&self) -> usize {
        self.all().filter(|s| !s.hunter_killer).count()
    }

    pub fn transition_running(&self) -> bool {
        self.zoom_in.is_running() || self.zoom_out.is_running()
    }

    /// Some active session is being fought on screen.
    pub fn has_foreground(&self) -> bool {
        self.active.iter().any(|s| !s.minimized)
    }

    pub fn views(&self) -> Vec<DogfightView> {
        self.active
            .iter()
            .map(|s| s.view(true))
            .chain(self.pending.iter().map(|s| s.view(false)))
            .collect()
    }

    // --- Admission ---

    /// Queue an ordinary interception.
    pub fn request(&mut self, craft: CraftId, ufo: UfoId) -> Admission {
        if self.session_for_craft(craft).is_some() {
            return Admission::AlreadyEngaged;
        }
        if self.has_hunter_killer() {
            return Admission::HunterKillerActive;
        }
        if self.non_hunter_killer_count() >= MAX_DOGFIGHTS {
            return Admission::AtCapacity;
        }
        self.pending
            .push_back(DogfightSession::new(craft, ufo, false, false));
        self.begin_zoom_in();
        tracing::info!(
            target: "geoscape::dogfight",
            craft = %craft,
            ufo = %ufo,
            "dogfight.admitted"
        );
        Admission::Admitted
    }

    /// Queue a hunter-killer attack plus its escort joiners.
    ///
    /// On admission every ordinary session is deleted and returned, so the
    /// caller can release the craft involved.
    pub fn request_hunter_killer(
        &mut self,
        craft: CraftId,
        ufo: UfoId,
        escorts: &[CraftId],
    ) -> (Admission, Vec<DogfightSession>) {
        if self.hunter_killer_count() >= MAX_HUNTER_KILLER_DOGFIGHTS {
            return (Admission::HunterKillerActive, Vec::new());
        }

        let mut cancelled: Vec<DogfightSession> = self.active.drain(..).collect();
        cancelled.extend(self.pending.drain(..));

        for &escort in escorts
            .iter()
            .filter(|&&escort| escort != craft)
            .take(MAX_ESCORT_JOINERS)
        {
            self.pending
                .push_front(DogfightSession::new(escort, ufo, false, true));
        }
        self.pending
            .push_back(DogfightSession::new(craft, ufo, true, false));
        self.zoom_out.reset();
        self.begin_zoom_in();

        tracing::info!(
            target: "geoscape::dogfight",
            craft = %craft,
            ufo = %ufo,
            cancelled = cancelled.len(),
            escorts = self.pending.len() - 1,
            "dogfight.hunter_killer"
        );
        (Admission::Admitted, cancelled)
    }

    fn begin_zoom_in(&mut self) {
        if !self.zoom_in.is_running() {
            self.zoom_in.start(self.transition_frames);
        }
    }

    // --- Window control ---

    pub fn minimize(&mut self, craft: CraftId) -> bool {
        match self.active.iter_mut().find(|s| s.craft == craft) {
            Some(session) => {
                session.minimized = true;
                true
            }
            None => false,
        }
    }

    /// Bring a session back on screen. Refused while it waits for altitude or
    /// terrain.
    pub fn restore(&mut self, craft: CraftId) -> bool {
        match self.active.iter_mut().find(|s| s.craft == craft) {
            Some(session) if session.waiting.is_none() => {
                session.minimized = false;
                true
            }
            _ => false,
        }
    }

    // --- Teardown ---

    /// Remove the craft's session, active or pending.
    pub fn disengage(&mut self, craft: CraftId) -> Option<DogfightSession> {
        self.end_sessions_for_craft(craft)
    }

    pub fn end_sessions_for_craft(&mut self, craft: CraftId) -> Option<DogfightSession> {
        let removed = if let Some(idx) = self.active.iter().position(|s| s.craft == craft) {
            Some(self.active.remove(idx))
        } else if let Some(idx) = self.pending.iter().position(|s| s.craft == craft) {
            self.pending.remove(idx)
        } else {
            None
        };
        if removed.is_some() {
            self.after_removal();
        }
        removed
    }

    pub fn end_sessions_for_ufo(&mut self, ufo: UfoId) -> Vec<DogfightSession> {
        let mut removed: Vec<DogfightSession> = Vec::new();
        let mut idx = 0;
        while idx < self.active.len() {
            if self.active[idx].ufo == ufo {
                removed.push(self.active.remove(idx));
            } else {
                idx += 1;
            }
        }
        let (gone, kept): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|s| s.ufo == ufo);
        self.pending = kept.into();
        removed.extend(gone);
        if !removed.is_empty() {
            self.after_removal();
        }
        removed
    }

    fn after_removal(&mut self) {
        self.update_interception_counts();
        if self.is_empty() {
            self.zoom_in.reset();
            self.zoom_out.start(self.transition_frames);
        }
    }

    // --- Per-advance update ---

    /// Run the zoom timers one frame. Returns the crafts whose sessions were
    /// promoted this call.
    pub fn update_transitions(&mut self) -> Vec<CraftId> {
        let mut promoted = Vec::new();

        if self.zoom_out.is_running() && self.zoom_out.tick() {
            self.zoom_out.reset();
        }

        if self.zoom_in.is_running() && self.zoom_in.tick() {
            while let Some(mut session) = self.pending.pop_back() {
                session.slot = self.lowest_free_slot();
                tracing::info!(
                    target: "geoscape::dogfight",
                    craft = %session.craft,
                    ufo = %session.ufo,
                    slot = session.slot,
                    "dogfight.started"
                );
                promoted.push(session.craft);
                self.active.push(session);
            }
            self.zoom_in.reset();
            self.update_interception_counts();
        }

        promoted
    }

    fn lowest_free_slot(&self) -> u32 {
        (1..)
            .find(|slot| !self.active.iter().any(|s| s.slot == *slot))
            .unwrap_or(1)
    }

    fn update_interception_counts(&mut self) {
        let count = self.active.len() as u32;
        for session in &mut self.active {
            session.interception_count = count;
        }
    }
}
