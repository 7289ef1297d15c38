//! Geodesic helpers. All distances in this crate are true WGS-84
//! ellipsoidal geodesic distances, not planar approximations, computed
//! with `geo`'s Karney-based `Geodesic` algorithm.

use geo::{Distance, Geodesic, Point};

use crate::model::Coord;

#[inline]
fn to_point(c: Coord) -> Point<f64> {
    Point::new(c.lng, c.lat)
}

/// Geodesic distance between two coordinates, in kilometers.
#[inline]
pub fn geodesic_distance_km(a: Coord, b: Coord) -> f64 {
    Geodesic.distance(to_point(a), to_point(b)) / 1000.
}

/// Planar (Euclidean, degree-space) distance, used only where a formula
/// calls for a "distance from center" proxy rather than a true geodesic
/// (e.g. the UTI field's `d_center`).
#[inline]
pub fn planar_distance_deg(a: Coord, b: Coord) -> f64 {
    ((a.lat - b.lat).powi(2) + (a.lng - b.lng).powi(2)).sqrt()
}
