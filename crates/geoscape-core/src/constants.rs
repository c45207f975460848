//! Simulation constants and tuning parameters.

/// Seconds covered by one clock step.
pub const SECONDS_PER_STEP: u32 = 5;

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3_440.065;

// --- Shields ---

/// Shield value of a UFO that has not been initialised yet.
pub const SHIELD_UNINITIALIZED: i32 = -1;

/// Recharge rate meaning "refill instantly".
pub const SHIELD_RECHARGE_INFINITE: i32 = -1;

// --- Interception ---

/// Cap on ordinary (non hunter-killer) sessions, active plus pending.
pub const MAX_DOGFIGHTS: usize = 4;

/// Cap on hunter-killer sessions, active plus pending.
pub const MAX_HUNTER_KILLER_DOGFIGHTS: usize = 1;

/// Extra craft that may join a hunter-killer fight.
pub const MAX_ESCORT_JOINERS: usize = 3;

/// Radius around the attacked craft in which escorts can join (nm).
pub const ESCORT_JOIN_RANGE_NM: f64 = 100.0;

/// Default zoom transition length, in `advance` calls.
pub const ZOOM_TRANSITION_FRAMES: u32 = 3;

/// Rounds an ordinary UFO stays in a fight before breaking off.
pub const UFO_ESCAPE_ROUNDS: u32 = 24;

// --- Detection ---

/// Retaliation UFOs look for bases within this range (nm).
pub const RETALIATION_DETECTION_RANGE_NM: f64 = 600.0;

/// Trajectory zone that never triggers base discovery.
pub const RETALIATION_EXCLUDED_ZONE: usize = 5;

// --- Timers ---

/// Crash sites stay on the globe for a random number of hours in this range.
pub const CRASH_SITE_HOURS_MIN: u32 = 24;
pub const CRASH_SITE_HOURS_MAX: u32 = 48;

/// Mission sites expire after this many minutes unless the rule says otherwise.
pub const MISSION_SITE_MINUTES: u32 = 48 * 60;

/// Minutes between two alien mission think passes.
pub const MISSION_THINK_MINUTES: u32 = 30;

/// Days between supply runs to an alien base.
pub const ALIEN_BASE_SUPPLY_DAYS: u32 = 14;
