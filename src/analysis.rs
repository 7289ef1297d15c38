//! Route analysis: given any ordered polyline (for example one produced by
//! an external walking-route provider), partition it into threat segments
//! and summarise distance, walking time and overall safety. This entry
//! point needs no graph at all.

use chrono::{DateTime, Timelike, Utc};

use crate::error::{Result, RouterError};
use crate::math::{geodesic_distance_km, planar_distance_deg};
use crate::model::{AlgorithmConfig, Coord, RouteResult, RouteType, ThreatSegment};
use crate::reason;

const CITY_CENTER: Coord = Coord::new(40.7589, -73.9851);
const HUDSON_LNG: f64 = -74.005;
const EAST_RIVER_LNG: f64 = -73.94;

/// Threshold above which a window becomes a `ThreatSegment`.
const THREAT_THRESHOLD: f64 = 0.4;

fn uti_base_per_point(coord: Coord, is_night: bool) -> f64 {
    let d = planar_distance_deg(coord, CITY_CENTER);
    let mut base = (0.15 * d).min(0.7);

    if coord.lng < HUDSON_LNG {
        base += 0.2;
    } else if coord.lng > EAST_RIVER_LNG {
        base += 0.15;
    }

    if is_night {
        base += 0.2;
    }

    base.min(0.9)
}

fn segment_uti(points: &[Coord], is_night: bool) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: f64 = points.iter().map(|&c| uti_base_per_point(c, is_night)).sum();
    sum / points.len() as f64
}

/// Analyses an arbitrary polyline and produces a `RouteResult`. `now` pins
/// the timestamp used for the night-hours bonus; without one, no night
/// bonus is applied (the core never reads the wall clock on its own after
/// graph build time).
pub fn analyse_polyline(points: &[Coord], now: Option<DateTime<Utc>>) -> Result<RouteResult> {
    for coord in points {
        if !coord.is_valid() {
            return Err(RouterError::InvalidCoord {
                lat: coord.lat,
                lng: coord.lng,
            });
        }
    }

    let is_night = now.is_some_and(|t| reason::is_night_hour(t.hour()));

    let mut distance_km = 0.0;
    for pair in points.windows(2) {
        distance_km += geodesic_distance_km(pair[0], pair[1]);
    }

    let n = points.len();
    let segment_size = (n / 10).max(1);

    let mut threat_segments = Vec::new();
    if n > segment_size {
        let mut i = 0;
        while i < n - segment_size {
            let segment_end = (i + segment_size).min(n - 1);
            let window = &points[i..=segment_end];
            let uti_score = segment_uti(window, is_night);

            if uti_score > THREAT_THRESHOLD {
                let lng = window[0].lng;
                threat_segments.push(ThreatSegment {
                    start_idx: i,
                    end_idx: segment_end,
                    uti_score,
                    reason: reason::reason(uti_score, lng, is_night),
                    mitigation: Some(reason::mitigation(uti_score, lng, is_night)),
                });
            }

            i += segment_size;
        }
    }

    let safety_score = if threat_segments.is_empty() {
        0.8
    } else {
        let mean_uti: f64 =
            threat_segments.iter().map(|s| s.uti_score).sum::<f64>() / threat_segments.len() as f64;
        (1.0 - mean_uti).max(0.1)
    };

    Ok(RouteResult {
        path: points.iter().map(|c| c.to_geojson()).collect(),
        safety_score,
        distance_km: RouteResult::round_distance(distance_km),
        estimated_time_minutes: RouteResult::estimated_time_minutes(distance_km),
        threat_segments,
        route_type: RouteType::OsrmEnhanced,
        algorithm_config: AlgorithmConfig {
            safety_weight: 0.5,
            distance_weight: 0.5,
            routing_service: Some("external"),
        },
        snapped: false,
        optimization_focus: None,
    })
}
