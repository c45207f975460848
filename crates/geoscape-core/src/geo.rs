//! Authored globe regions: rectangular areas and land polygons.
//!
//! Rulesets are written in degrees; everything else in the simulation uses
//! radians through `Position`.

use serde::{Deserialize, Serialize};

use crate::dice::Dice;
use crate::types::Position;

/// Longitude/latitude rectangle in degrees. `lon_min > lon_max` wraps across
/// the antimeridian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoArea {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoArea {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    fn lon_span(&self) -> f64 {
        if self.lon_min <= self.lon_max {
            self.lon_max - self.lon_min
        } else {
            360.0 - self.lon_min + self.lon_max
        }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        let (lon, lat) = pos.to_degrees();
        let lon = normalize_lon(lon);
        if lat < self.lat_min || lat > self.lat_max {
            return false;
        }
        if self.lon_min <= self.lon_max {
            lon >= self.lon_min && lon <= self.lon_max
        } else {
            lon >= self.lon_min || lon <= self.lon_max
        }
    }

    pub fn center(&self) -> Position {
        let lon = normalize_lon(self.lon_min + self.lon_span() / 2.0);
        Position::from_degrees(lon, (self.lat_min + self.lat_max) / 2.0)
    }

    pub fn random_point(&self, dice: &mut impl Dice) -> Position {
        let lon = normalize_lon(self.lon_min + self.lon_span() * dice.unit());
        let lat = self.lat_min + (self.lat_max - self.lat_min) * dice.unit();
        Position::from_degrees(lon, lat)
    }
}

/// Wrap a longitude into `(-180, 180]`.
fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Closed land outline in degrees, `[lon, lat]` per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandPolygon {
    pub points: Vec<[f64; 2]>,
}

impl LandPolygon {
    /// Even-odd ray cast in lon/lat space.
    pub fn contains(&self, pos: &Position) -> bool {
        let (x, y) = pos.to_degrees();
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.points[i];
            let [xj, yj] = self.points[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}
