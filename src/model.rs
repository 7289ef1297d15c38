//! Value types shared across the routing core.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;
use serde::Serialize;

/// Hot-path id-keyed lookup map, keyed the same way the teacher's A* keys
/// its open/closed sets: `rustc_hash::FxHasher` instead of the stdlib's
/// SipHash, since `NodeId` keys are already well-distributed `u32`s.
pub type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A geographic coordinate. Immutable value; equality is exact
/// (bit-for-bit on the `f64`s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `[lng, lat]`, the GeoJSON coordinate order used on the wire.
    pub fn to_geojson(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_geojson(point: [f64; 2]) -> Self {
        Self {
            lng: point[0],
            lat: point[1],
        }
    }

    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A rectangular area of interest, southwest/northeast corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub sw: Coord,
    pub ne: Coord,
}

impl BoundingBox {
    pub const fn new(sw: Coord, ne: Coord) -> Self {
        Self { sw, ne }
    }

    pub fn is_valid(&self) -> bool {
        self.sw.is_valid()
            && self.ne.is_valid()
            && self.ne.lat > self.sw.lat
            && self.ne.lng > self.sw.lng
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    UrbanCenter,
    Waterfront,
    Residential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Highway,
    Arterial,
    Residential,
    Pedestrian,
}

impl RoadType {
    /// Multiplier applied to blended edge cost.
    pub fn cost_modifier(self) -> f64 {
        match self {
            RoadType::Highway => 0.8,
            RoadType::Arterial => 1.0,
            RoadType::Residential => 1.2,
            RoadType::Pedestrian => 1.5,
        }
    }
}

/// Stable node identifier, an index into `UrbanGraph::nodes`.
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coord,
    pub uti_score: f64,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub distance_km: f64,
    pub avg_uti_score: f64,
    pub road_type: RoadType,
    pub lighting_score: f64,
    pub foot_traffic_score: f64,
}

impl Edge {
    /// Blended lighting/foot-traffic/UTI risk cost for this edge.
    pub fn safety_cost(&self) -> f64 {
        let environmental_risk = 1.0 - (0.3 * self.lighting_score + 0.2 * self.foot_traffic_score);
        0.7 * self.avg_uti_score + 0.3 * environmental_risk
    }
}

/// A geospatial grid graph with water-body exclusion and road-class
/// attributes. The graph exclusively owns its nodes and adjacency lists;
/// searches only ever hold non-owning references into it.
#[derive(Debug, Clone, Default)]
pub struct UrbanGraph {
    pub(crate) nodes: FxHashMap<NodeId, Node>,
    pub(crate) adj: FxHashMap<NodeId, Vec<Edge>>,
}

impl UrbanGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(Vec::len).sum()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn neighbors(&self, id: NodeId) -> &[Edge] {
        self.adj.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatSegment {
    pub start_idx: usize,
    pub end_idx: usize,
    pub uti_score: f64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    GraphBased,
    OsrmEnhanced,
    FastestRoute,
    BalancedRoute,
    SafestRoute,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::GraphBased => "graph_based",
            RouteType::OsrmEnhanced => "osrm_enhanced",
            RouteType::FastestRoute => "fastest_route",
            RouteType::BalancedRoute => "balanced_route",
            RouteType::SafestRoute => "safest_route",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlgorithmConfig {
    pub safety_weight: f64,
    pub distance_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_service: Option<&'static str>,
}

/// Wire-compatible route result. Self-contained: no reference back into
/// the graph, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    /// `[lng, lat]` pairs, GeoJSON `LineString` order.
    pub path: Vec<[f64; 2]>,
    pub safety_score: f64,
    pub distance_km: f64,
    pub estimated_time_minutes: i64,
    pub threat_segments: Vec<ThreatSegment>,
    pub route_type: RouteType,
    pub algorithm_config: AlgorithmConfig,
    /// Set when the query coordinate snapped to a node more than 1 km away.
    pub snapped: bool,
    /// Present when this result also carries a classification focus
    /// string, as produced by `alternatives()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_focus: Option<&'static str>,
}

impl RouteResult {
    pub fn round_distance(distance_km: f64) -> f64 {
        (distance_km * 100.0).round() / 100.0
    }

    pub fn estimated_time_minutes(distance_km: f64) -> i64 {
        (distance_km / 5.0 * 60.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_equality_is_exact() {
        let a = Coord::new(40.7589, -73.9851);
        let b = Coord::new(40.7589, -73.9851);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounding_box_rejects_non_ne_corner() {
        let bad = BoundingBox::new(Coord::new(40.78, -73.97), Coord::new(40.74, -74.01));
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_road_type_modifiers_match_spec_table() {
        assert_eq!(RoadType::Highway.cost_modifier(), 0.8);
        assert_eq!(RoadType::Arterial.cost_modifier(), 1.0);
        assert_eq!(RoadType::Residential.cost_modifier(), 1.2);
        assert_eq!(RoadType::Pedestrian.cost_modifier(), 1.5);
    }

    #[test]
    fn test_estimated_time_uses_5kmh_walking_speed() {
        assert_eq!(RouteResult::estimated_time_minutes(5.0), 60);
    }
}
