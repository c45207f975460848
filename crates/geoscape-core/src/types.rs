//! Fundamental globe, calendar and identity types.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_RADIUS_NM, SECONDS_PER_STEP};
use crate::enums::TimeTrigger;

/// Position on the globe in radians.
/// `lon` grows eastward, `lat` grows northward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self {
            lon: lon.to_radians(),
            lat: lat.to_radians(),
        }
    }

    /// Longitude and latitude in degrees.
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Unit vector on the sphere (x toward lon 0, z toward the north pole).
    pub fn to_unit(&self) -> DVec3 {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    pub fn from_unit(v: DVec3) -> Self {
        let v = v.normalize();
        Self {
            lon: v.y.atan2(v.x),
            lat: v.z.clamp(-1.0, 1.0).asin(),
        }
    }

    /// Great-circle angle to another position (radians).
    pub fn angle_to(&self, other: &Position) -> f64 {
        self.to_unit().dot(other.to_unit()).clamp(-1.0, 1.0).acos()
    }

    /// Great-circle distance in nautical miles.
    pub fn distance_nm(&self, other: &Position) -> f64 {
        self.angle_to(other) * EARTH_RADIUS_NM
    }

    /// Move along the great circle toward `dest` by at most `angle` radians.
    ///
    /// Returns the new position and whether `dest` was reached.
    pub fn step_toward(&self, dest: &Position, angle: f64) -> (Position, bool) {
        let total = self.angle_to(dest);
        if total <= angle || total < 1e-12 {
            return (*dest, true);
        }
        let sin_total = total.sin();
        if sin_total.abs() < 1e-9 {
            // Antipodal: any meridian is a shortest path.
            let lat = (self.lat + angle).min(std::f64::consts::FRAC_PI_2);
            return (Position::new(self.lon, lat), false);
        }
        let t = angle / total;
        let a = self.to_unit();
        let b = dest.to_unit();
        let v = a * (((1.0 - t) * total).sin() / sin_total) + b * ((t * total).sin() / sin_total);
        (Position::from_unit(v), false)
    }

    /// Great-circle angle covered in one 5-second step at `speed_knots`.
    pub fn step_angle(speed_knots: f64) -> f64 {
        speed_knots * SECONDS_PER_STEP as f64 / 3600.0 / EARTH_RADIUS_NM
    }
}

/// Calendar clock advanced in 5-second steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// 1..=days_in_month
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(1999, 1, 1, 12, 0, 0)
    }
}

impl GameTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn is_leap_year(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 if Self::is_leap_year(self.year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Advance by one 5-second step and report the highest boundary crossed.
    pub fn advance(&mut self) -> TimeTrigger {
        let mut trigger = TimeTrigger::FiveSeconds;
        self.second += SECONDS_PER_STEP;
        if self.second < 60 {
            return trigger;
        }

        self.second = 0;
        self.minute += 1;
        if self.minute % 10 == 0 {
            trigger = TimeTrigger::TenMinutes;
        }
        if self.minute % 30 == 0 {
            trigger = TimeTrigger::ThirtyMinutes;
        }
        if self.minute < 60 {
            return trigger;
        }

        self.minute = 0;
        self.hour += 1;
        trigger = TimeTrigger::OneHour;
        if self.hour < 24 {
            return trigger;
        }

        self.hour = 0;
        self.day += 1;
        trigger = TimeTrigger::OneDay;
        if self.day <= self.days_in_month() {
            return trigger;
        }

        self.day = 1;
        self.month += 1;
        if self.month > 12 {
            self.month = 1;
            self.year += 1;
        }
        TimeTrigger::OneMonth
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Hostile craft.
    UfoId
);
entity_id!(
    /// Player craft.
    CraftId
);
entity_id!(WaypointId);
entity_id!(
    /// Mission site (terror site and similar ground objectives).
    SiteId
);
entity_id!(AlienBaseId);
entity_id!(
    /// Player base.
    BaseId
);
entity_id!(MissionId);
