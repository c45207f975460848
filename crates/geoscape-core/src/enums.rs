//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Clock boundary crossed by a single 5-second step, ordered by granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeTrigger {
    FiveSeconds,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    OneMonth,
}

impl TimeTrigger {
    /// Handler order: coarsest boundary first.
    pub const DESCENDING: [TimeTrigger; 6] = [
        TimeTrigger::OneMonth,
        TimeTrigger::OneDay,
        TimeTrigger::OneHour,
        TimeTrigger::ThirtyMinutes,
        TimeTrigger::TenMinutes,
        TimeTrigger::FiveSeconds,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Speed setting chosen by the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSpeed {
    #[default]
    FiveSeconds,
    OneMinute,
    FiveMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
}

impl TimeSpeed {
    /// Number of 5-second steps one `advance` call attempts.
    pub fn steps(self) -> u32 {
        match self {
            TimeSpeed::FiveSeconds => 1,
            TimeSpeed::OneMinute => 12,
            TimeSpeed::FiveMinutes => 60,
            TimeSpeed::ThirtyMinutes => 360,
            TimeSpeed::OneHour => 720,
            TimeSpeed::OneDay => 17_280,
        }
    }
}

/// UFO lifecycle status. Destroyed is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoStatus {
    #[default]
    Flying,
    Landed,
    Crashed,
    Destroyed,
}

impl UfoStatus {
    pub fn is_terminal(self) -> bool {
        self == UfoStatus::Destroyed
    }
}

/// Player craft status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CraftStatus {
    #[default]
    Ready,
    Out,
    Repairs,
    Refuelling,
    Rearming,
}

impl CraftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CraftStatus::Ready => "ready",
            CraftStatus::Out => "out",
            CraftStatus::Repairs => "repairs",
            CraftStatus::Refuelling => "refuelling",
            CraftStatus::Rearming => "rearming",
        }
    }
}

/// Flight altitude band, lowest first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Altitude {
    Ground,
    #[default]
    VeryLow,
    Low,
    High,
    VeryHigh,
}

/// Where a craft is able to fight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftTerrain {
    #[default]
    Any,
    /// Only over sea (submarines and similar).
    WaterOnly,
    /// Only over land.
    LandOnly,
}

/// Broad craft role, used by hunter-killer targeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CraftRole {
    #[default]
    Interceptor,
    Transport,
}

/// Which craft a hunter-killer prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HuntMode {
    #[default]
    Interceptors,
    Transports,
    Any,
}

/// What an alien mission is trying to achieve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionObjective {
    #[default]
    Score,
    Infiltration,
    Base,
    Site,
    Retaliation,
    Supply,
}

/// Discriminant of the `Target` sum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    Ufo,
    Waypoint,
    MissionSite,
    AlienBase,
    Craft,
}

/// Why the outer time loop is not stepping the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suspension {
    #[default]
    Running,
    /// A notification is waiting to be dismissed.
    AwaitingNotification,
    /// Interceptions are pending start or a zoom transition is running.
    AwaitingTransition,
    /// At least one interception is being fought on screen.
    Intercepting,
}

/// Why an interception session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DogfightEnd {
    UfoDestroyed,
    UfoCrashed,
    UfoEscaped,
    CraftDestroyed,
    CraftReturned,
    Disengaged,
    /// Removed by a hunter-killer override.
    Cancelled,
}

/// Why a pending session is held minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DogfightWait {
    /// The UFO flies above the craft's ceiling.
    Altitude,
    /// The UFO is over terrain the craft cannot fight over.
    Terrain,
}
