//! Graph construction: a regular lattice of nodes over a bounding box, with
//! water-body exclusion and road-class edge attributes.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use crate::error::{Result, RouterError};
use crate::math::geodesic_distance_km;
use crate::model::{
    BoundingBox, Coord, Edge, FxHashMap, Node, NodeId, NodeType, RoadType, UrbanGraph,
};
use crate::uti;

/// Default connection radius for the production lattice.
pub const DEFAULT_CONNECT_KM: f64 = 0.2;
/// Default lattice density.
pub const DEFAULT_LATTICE_N: usize = 25;

#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    pub lattice_n: usize,
    pub connect_km: f64,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            lattice_n: DEFAULT_LATTICE_N,
            connect_km: DEFAULT_CONNECT_KM,
        }
    }
}

impl GraphBuilder {
    pub fn new(lattice_n: usize, connect_km: f64) -> Self {
        Self {
            lattice_n,
            connect_km,
        }
    }

    /// Builds an `UrbanGraph` over `area`.
    pub fn build(&self, area: BoundingBox) -> Result<UrbanGraph> {
        if !area.is_valid() {
            return Err(RouterError::InvalidBounds(
                "NE corner must be strictly north-east of SW corner".to_string(),
            ));
        }
        if self.lattice_n < 2 {
            return Err(RouterError::InvalidBounds(
                "lattice density must be at least 2".to_string(),
            ));
        }
        if self.connect_km < 0.0 {
            return Err(RouterError::InvalidBounds(
                "connection threshold must be non-negative".to_string(),
            ));
        }

        let coords = lattice(area, self.lattice_n);

        // The only wall-clock read in the crate: initial node scoring at
        // build time. Everything downstream is given this timestamp as data.
        let build_time = Utc::now();

        let mut nodes: FxHashMap<NodeId, Node> =
            FxHashMap::with_capacity_and_hasher(coords.len(), Default::default());
        for (id, coord) in coords.iter().copied().enumerate() {
            let node_type = classify_node(coord);
            let uti_score = uti::uti(coord, build_time);
            nodes.insert(
                id as NodeId,
                Node {
                    id: id as NodeId,
                    coord,
                    uti_score,
                    node_type,
                },
            );
        }

        let mut adj: FxHashMap<NodeId, Vec<Edge>> =
            FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for a_id in 0..coords.len() as NodeId {
            let a = nodes[&a_id];
            for b_id in 0..coords.len() as NodeId {
                if a_id == b_id {
                    continue;
                }
                let b = nodes[&b_id];

                let distance_km = geodesic_distance_km(a.coord, b.coord);
                if distance_km > self.connect_km {
                    continue;
                }
                if crosses_water(a.coord, b.coord) {
                    continue;
                }

                adj.entry(a_id).or_default().push(build_edge(&a, &b, distance_km));
            }
        }

        let graph = UrbanGraph { nodes, adj };
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "urban graph built"
        );
        Ok(graph)
    }
}

/// Regular `N×N` lattice of coordinates evenly spaced over `area`.
fn lattice(area: BoundingBox, n: usize) -> Vec<Coord> {
    let mut coords = Vec::with_capacity(n * n);
    for i in 0..n {
        let lat = area.sw.lat + (area.ne.lat - area.sw.lat) * i as f64 / (n - 1) as f64;
        for j in 0..n {
            let lng = area.sw.lng + (area.ne.lng - area.sw.lng) * j as f64 / (n - 1) as f64;
            coords.push(Coord::new(lat, lng));
        }
    }
    coords
}

fn classify_node(coord: Coord) -> NodeType {
    if (40.74..=40.78).contains(&coord.lat) && (-74.01..=-73.97).contains(&coord.lng) {
        NodeType::UrbanCenter
    } else if coord.lng < -74.005 || coord.lng > -73.94 {
        NodeType::Waterfront
    } else {
        NodeType::Residential
    }
}

/// Rejects a candidate edge that crosses the East River or Hudson River
/// bands.
fn crosses_water(a: Coord, b: Coord) -> bool {
    let lat_band = (40.70..=40.80).contains(&a.lat.min(b.lat));

    let crosses_east_river =
        (a.lng < -73.96 && b.lng > -73.95) || (b.lng < -73.96 && a.lng > -73.95);
    let crosses_hudson = (a.lng < -74.01 && b.lng > -74.00) || (b.lng < -74.01 && a.lng > -74.00);

    lat_band && (crosses_east_river || crosses_hudson)
}

fn build_edge(a: &Node, b: &Node, distance_km: f64) -> Edge {
    let (road_type, lighting_score, foot_traffic_score) = edge_attributes(a.node_type, b.node_type);
    Edge {
        from: a.id,
        to: b.id,
        distance_km,
        avg_uti_score: (a.uti_score + b.uti_score) / 2.0,
        road_type,
        lighting_score,
        foot_traffic_score,
    }
}

/// `(road_type, lighting_score, foot_traffic_score)` cascade:
/// `urban_center` wins over `waterfront` wins over plain residential.
fn edge_attributes(a: NodeType, b: NodeType) -> (RoadType, f64, f64) {
    if a == NodeType::UrbanCenter || b == NodeType::UrbanCenter {
        (RoadType::Arterial, 0.9, 0.8)
    } else if a == NodeType::Waterfront || b == NodeType::Waterfront {
        (RoadType::Highway, 0.4, 0.3)
    } else {
        (RoadType::Residential, 0.6, 0.5)
    }
}

/// Applies UTI overrides by node id, then recomputes every edge's
/// `avg_uti_score` from its endpoints. Unknown ids are ignored.
/// Out-of-range scores are clamped to `[0, 1]`; the number of clamps
/// performed is returned as a soft-warning count.
pub fn update_uti(graph: &mut UrbanGraph, scores: &HashMap<NodeId, f64>) -> usize {
    let mut clamp_count = 0;

    for (&id, &score) in scores {
        let Some(node) = graph.nodes.get_mut(&id) else {
            continue;
        };
        let clamped = score.clamp(0.0, 1.0);
        if clamped != score {
            clamp_count += 1;
        }
        node.uti_score = clamped;
    }

    for edges in graph.adj.values_mut() {
        for edge in edges.iter_mut() {
            let from_uti = graph.nodes[&edge.from].uti_score;
            let to_uti = graph.nodes[&edge.to].uti_score;
            edge.avg_uti_score = (from_uti + to_uti) / 2.0;
        }
    }

    if clamp_count > 0 {
        tracing::warn!(clamp_count, "update_uti clamped out-of-range scores");
    }

    clamp_count
}

/// Scans all nodes for the minimum geodesic distance to `coord` (nearest-
/// node snapping). Returns the nearest node id and the snapped distance in
/// kilometers.
pub fn nearest_node(graph: &UrbanGraph, coord: Coord) -> Option<(NodeId, f64)> {
    graph
        .nodes
        .values()
        .map(|node| (node.id, geodesic_distance_km(coord, node.coord)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}
