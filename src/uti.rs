//! The Urban Threat Index (UTI) field: a pure, deterministic function of
//! `(lat, lng, timestamp)` (spec.md §4.1). No RNG, no hidden clock reads;
//! every bit of variation is derived from the inputs themselves.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::math::planar_distance_deg;
use crate::model::Coord;

const CITY_CENTER: Coord = Coord::new(40.7589, -73.9851);

const FEATURE_WEIGHTS: [f64; 10] = [0.30, 0.20, 0.10, 0.05, 0.15, 0.10, 0.05, 0.03, 0.01, 0.01];

/// The 10 sub-scores, in the fixed order spec.md §4.1 defines them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub historical_crime_rate: f64,
    pub time_of_day: f64,
    pub day_of_week: f64,
    pub weather_condition: f64,
    pub foot_traffic_density: f64,
    pub lighting_quality: f64,
    pub transit_distance: f64,
    pub socioeconomic_index: f64,
    pub event_density: f64,
    pub police_presence: f64,
}

impl Features {
    pub fn as_array(&self) -> [f64; 10] {
        [
            self.historical_crime_rate,
            self.time_of_day,
            self.day_of_week,
            self.weather_condition,
            self.foot_traffic_density,
            self.lighting_quality,
            self.transit_distance,
            self.socioeconomic_index,
            self.event_density,
            self.police_presence,
        ]
    }
}

/// A 32-bit FNV-1a mixer over the fixed-precision decimal string form of a
/// coordinate, normalized into `[0, 100)`. This is the crate's only source
/// of "pseudo-randomness", and it is a pure function of its inputs (spec.md
/// §4.1: "All pseudo-randomness is derived from a stable coordinate hash").
fn coord_hash(coord: Coord, decimals: usize) -> f64 {
    let s = format!("{:.*},{:.*}", decimals, coord.lat, decimals, coord.lng);

    const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET_BASIS;
    for byte in s.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    (hash % 100) as f64
}

#[inline]
fn coord_hash_4dp(coord: Coord) -> f64 {
    coord_hash(coord, 4)
}

#[inline]
fn coord_hash_2dp(coord: Coord) -> f64 {
    coord_hash(coord, 2)
}

fn d_center(coord: Coord) -> f64 {
    planar_distance_deg(coord, CITY_CENTER)
}

fn historical_crime_rate(coord: Coord) -> f64 {
    (10.0 * d_center(coord)).min(1.0) + coord_hash_4dp(coord) / 200.0
}

fn time_of_day(hour: u32) -> f64 {
    hour as f64 / 24.0
}

fn day_of_week(weekday: u32) -> f64 {
    weekday as f64 / 6.0
}

fn weather_condition(day_of_year: u32) -> f64 {
    0.5 + 0.3 * (2.0 * PI * day_of_year as f64 / 365.0).sin()
}

fn foot_traffic_density(coord: Coord, hour: u32) -> f64 {
    let base = match hour {
        7..=9 | 17..=19 => 0.8,
        10..=16 => 0.6,
        20..=22 => 0.4,
        _ => 0.1,
    };
    base * (1.0 - 5.0 * d_center(coord)).max(0.1)
}

fn lighting_quality(coord: Coord, hour: u32) -> f64 {
    if (6..=18).contains(&hour) {
        1.0
    } else {
        0.3 + coord_hash_4dp(coord) / 200.0
    }
}

fn transit_distance(coord: Coord) -> f64 {
    coord_hash_2dp(coord) / 100.0
}

fn socioeconomic_index(coord: Coord) -> f64 {
    let base = (1.0 - 3.0 * d_center(coord)).max(0.2);
    (base + coord_hash_2dp(coord) / 200.0).min(1.0)
}

fn event_density(coord: Coord, is_weekend: bool) -> f64 {
    let multiplier = if is_weekend { 1.5 } else { 1.0 };
    (coord_hash_2dp(coord) / 300.0 * multiplier).min(1.0)
}

fn police_presence(coord: Coord, hour: u32) -> f64 {
    let time_factor = if (8..=20).contains(&hour) { 0.8 } else { 0.4 };
    time_factor * (1.0 - 2.0 * d_center(coord)).max(0.3)
}

/// Computes the 10-feature vector for `(coord, timestamp)`.
pub fn features(coord: Coord, timestamp: DateTime<Utc>) -> Features {
    let hour = timestamp.hour();
    // `num_days_from_monday` matches Python's `datetime.weekday()` (0=Mon..6=Sun).
    let weekday = timestamp.weekday().num_days_from_monday();
    let day_of_year = timestamp.ordinal();
    let is_weekend = weekday >= 5;

    Features {
        historical_crime_rate: historical_crime_rate(coord).min(1.0),
        time_of_day: time_of_day(hour),
        day_of_week: day_of_week(weekday),
        weather_condition: weather_condition(day_of_year),
        foot_traffic_density: foot_traffic_density(coord, hour),
        lighting_quality: lighting_quality(coord, hour),
        transit_distance: transit_distance(coord),
        socioeconomic_index: socioeconomic_index(coord),
        event_density: event_density(coord, is_weekend),
        police_presence: police_presence(coord, hour),
    }
}

fn temporal_factor(hour: u32) -> f64 {
    match hour {
        22..=23 | 0..=5 => 1.4,
        18..=21 => 1.2,
        6..=8 => 1.1,
        _ => 1.0,
    }
}

fn spatial_factor(coord: Coord) -> f64 {
    let d = d_center(coord);
    if d > 0.1 {
        1.3
    } else if d > 0.05 {
        1.1
    } else {
        1.0
    }
}

/// The scalar UTI score for `(lat, lng, t)`, in `[0, 1]` (spec.md §4.1).
///
/// Pure and deterministic: identical inputs always produce identical output,
/// on every machine, on every call.
pub fn uti(coord: Coord, timestamp: DateTime<Utc>) -> f64 {
    let f = features(coord, timestamp);
    let base: f64 = f
        .as_array()
        .iter()
        .zip(FEATURE_WEIGHTS.iter())
        .map(|(v, w)| v * w)
        .sum();

    let temporal = temporal_factor(timestamp.hour());
    let spatial = spatial_factor(coord);

    (base * temporal * spatial).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pinned() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_uti_is_pure() {
        let coord = Coord::new(40.76, -73.98);
        let t = pinned();
        assert_eq!(uti(coord, t), uti(coord, t));
        assert_eq!(features(coord, t), features(coord, t));
    }

    #[test]
    fn test_uti_is_bounded() {
        for lat in [40.70, 40.75, 40.80] {
            for lng in [-74.02, -73.97, -73.93] {
                let coord = Coord::new(lat, lng);
                let score = uti(coord, pinned());
                assert!((0.0..=1.0).contains(&score), "score was {score}");
            }
        }
    }

    #[test]
    fn test_night_hours_raise_the_temporal_factor() {
        let coord = Coord::new(40.75, -73.98);
        let night = Utc.with_ymd_and_hms(2024, 6, 15, 23, 0, 0).unwrap();
        let midday = Utc.with_ymd_and_hms(2024, 6, 15, 13, 0, 0).unwrap();
        assert!(temporal_factor(night.hour()) > temporal_factor(midday.hour()));
    }

    #[test]
    fn test_coord_hash_is_stable_across_calls() {
        let coord = Coord::new(40.7123, -73.9456);
        assert_eq!(coord_hash_4dp(coord), coord_hash_4dp(coord));
        assert_eq!(coord_hash_2dp(coord), coord_hash_2dp(coord));
    }
}
