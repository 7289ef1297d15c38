//! Safety-Aware A* over the `UrbanGraph`: shortest path minimising a blend
//! of distance and predicted risk, parameterised by a safety weight
//! `w_s ∈ [0, 1]`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use tracing::{debug, info};

use crate::error::{Result, RouterError};
use crate::graph::nearest_node;
use crate::math::geodesic_distance_km;
use crate::model::{
    AlgorithmConfig, Coord, Edge, NodeId, RouteResult, RouteType, ThreatSegment, UrbanGraph,
};
use crate::reason;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
type FxHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;

/// Exhausting this many expansions without reaching the goal yields `NoPath`.
pub const MAX_EXPANSIONS: usize = 15_000;

/// A coordinate snapped more than this far from its nearest node triggers
/// the `Snapped` soft warning.
const SNAP_WARNING_KM: f64 = 1.0;

#[derive(Clone, Copy)]
struct SearchNode {
    came_from: Option<u32>,
    g_score: f64,
}

/// An entry in the open set. Ties in `f_score` are broken by `index`
/// ascending (first-discovered wins), so identical inputs always pop nodes
/// in the same order and produce byte-identical results.
#[derive(Clone, Copy)]
struct HeapEntry {
    index: u32,
    f_score: f64,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.f_score == other.f_score
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // inverted, so `BinaryHeap` (a max-heap) behaves as a min-heap on
        // f_score, with smaller `index` preferred on ties.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

fn edge_cost(edge: &Edge, safety_weight: f64) -> f64 {
    let distance_weight = 1.0 - safety_weight;
    let blended = distance_weight * edge.distance_km + safety_weight * edge.safety_cost();
    blended * edge.road_type.cost_modifier()
}

fn heuristic(from: Coord, goal: Coord, goal_uti: f64, safety_weight: f64) -> f64 {
    let distance_weight = 1.0 - safety_weight;
    distance_weight * geodesic_distance_km(from, goal) + safety_weight * goal_uti
}

/// Runs the safety-aware search from `start` to `end`.
pub fn route(
    graph: &UrbanGraph,
    start: Coord,
    end: Coord,
    safety_weight: f64,
) -> Result<RouteResult> {
    if !(0.0..=1.0).contains(&safety_weight) {
        return Err(RouterError::InvalidWeight(safety_weight));
    }
    for coord in [start, end] {
        if !coord.is_valid() {
            return Err(RouterError::InvalidCoord {
                lat: coord.lat,
                lng: coord.lng,
            });
        }
    }

    let (start_id, start_snap_km) =
        nearest_node(graph, start).ok_or(RouterError::GraphNotInitialised)?;
    let (end_id, end_snap_km) =
        nearest_node(graph, end).ok_or(RouterError::GraphNotInitialised)?;
    let snapped = start_snap_km > SNAP_WARNING_KM || end_snap_km > SNAP_WARNING_KM;

    let goal_coord = graph.node(end_id).unwrap().coord;
    let goal_uti = graph.node(end_id).unwrap().uti_score;

    let mut open = std::collections::BinaryHeap::new();
    let mut nodes: FxIndexMap<NodeId, SearchNode> = FxIndexMap::default();
    let mut closed: FxHashSet<NodeId> = FxHashSet::default();

    nodes.insert(
        start_id,
        SearchNode {
            came_from: None,
            g_score: 0.0,
        },
    );
    open.push(HeapEntry {
        index: 0,
        f_score: heuristic(
            graph.node(start_id).unwrap().coord,
            goal_coord,
            goal_uti,
            safety_weight,
        ),
    });

    let mut expansions = 0usize;

    while expansions < MAX_EXPANSIONS {
        let Some(HeapEntry { index, .. }) = open.pop() else {
            break;
        };
        let (&node_id, &node_data) = nodes.get_index(index as usize).unwrap();

        // a cheaper path to this node was already finalised; this entry is
        // a stale duplicate and doesn't count against the expansion cap.
        if closed.contains(&node_id) {
            continue;
        }
        closed.insert(node_id);
        expansions += 1;

        if node_id == end_id {
            info!(expansions, g_score = node_data.g_score, "A* goal reached");
            return Ok(reconstruct(graph, &nodes, index, safety_weight, snapped));
        }

        for edge in graph.neighbors(node_id) {
            if closed.contains(&edge.to) {
                continue;
            }

            let tentative_g = node_data.g_score + edge_cost(edge, safety_weight);

            let neighbor_index = match nodes.entry(edge.to) {
                indexmap::map::Entry::Occupied(mut e) => {
                    if tentative_g >= e.get().g_score {
                        continue;
                    }
                    let idx = e.index() as u32;
                    e.insert(SearchNode {
                        came_from: Some(index),
                        g_score: tentative_g,
                    });
                    idx
                }
                indexmap::map::Entry::Vacant(e) => {
                    let idx = e.index() as u32;
                    e.insert(SearchNode {
                        came_from: Some(index),
                        g_score: tentative_g,
                    });
                    idx
                }
            };

            let neighbor_coord = graph.node(edge.to).unwrap().coord;
            let h = heuristic(neighbor_coord, goal_coord, goal_uti, safety_weight);
            debug!(to = edge.to, g = tentative_g, h, "relaxed edge");

            open.push(HeapEntry {
                index: neighbor_index,
                f_score: tentative_g + h,
            });
        }
    }

    if expansions >= MAX_EXPANSIONS {
        info!(expansions, "A* exploration cap hit, no path");
    } else {
        info!("A* open set emptied, no path");
    }
    Err(RouterError::NoPath)
}

fn reconstruct(
    graph: &UrbanGraph,
    nodes: &FxIndexMap<NodeId, SearchNode>,
    goal_index: u32,
    safety_weight: f64,
    snapped: bool,
) -> RouteResult {
    let mut node_indices = Vec::new();
    let mut current = Some(goal_index);
    while let Some(idx) = current {
        node_indices.push(idx);
        current = nodes.get_index(idx as usize).unwrap().1.came_from;
    }
    node_indices.reverse();

    let node_ids: Vec<NodeId> = node_indices
        .iter()
        .map(|&idx| *nodes.get_index(idx as usize).unwrap().0)
        .collect();

    let mut path = Vec::with_capacity(node_ids.len());
    let mut distance_km = 0.0;
    let mut safety_cost_sum = 0.0;
    let mut threat_segments = Vec::new();

    for (i, &id) in node_ids.iter().enumerate() {
        let coord = graph.node(id).unwrap().coord;
        path.push(coord.to_geojson());

        if i + 1 < node_ids.len() {
            let next_id = node_ids[i + 1];
            let edge = graph
                .neighbors(id)
                .iter()
                .find(|e| e.to == next_id)
                .expect("traversed edge must exist in the graph");

            distance_km += edge.distance_km;
            safety_cost_sum += edge.safety_cost();

            if edge.avg_uti_score > 0.5 {
                threat_segments.push(ThreatSegment {
                    start_idx: i,
                    end_idx: i + 1,
                    uti_score: edge.avg_uti_score,
                    reason: reason::reason(edge.avg_uti_score, coord.lng, false),
                    mitigation: Some(reason::mitigation(edge.avg_uti_score, coord.lng, false)),
                });
            }
        }
    }

    let k = node_ids.len().max(1) as f64;
    let safety_score = (1.0 - safety_cost_sum / k).max(0.0);

    RouteResult {
        path,
        safety_score,
        distance_km: RouteResult::round_distance(distance_km),
        estimated_time_minutes: RouteResult::estimated_time_minutes(distance_km),
        threat_segments,
        route_type: RouteType::GraphBased,
        algorithm_config: AlgorithmConfig {
            safety_weight,
            distance_weight: 1.0 - safety_weight,
            routing_service: None,
        },
        snapped,
        optimization_focus: None,
    }
}
