//! Safety-aware walking route core: grid graph construction over a
//! bounding box, blended distance/safety A* search, and deterministic
//! urban threat scoring.
//!
//! The graph is built once and shared across concurrent queries behind a
//! reader-writer lock: many routes can be computed while the graph is
//! read-only, and `update_uti`/rebuilds take it exclusively.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

pub mod alternatives;
pub mod analysis;
pub mod astar;
pub mod error;
pub mod graph;
pub mod math;
pub mod model;
mod reason;
pub mod uti;

pub use error::{Result, RouterError};
pub use model::{
    AlgorithmConfig, BoundingBox, Coord, Edge, Node, NodeId, NodeType, RoadType, RouteResult,
    RouteType, ThreatSegment, UrbanGraph,
};

/// Shared handle to a built `UrbanGraph`. Cloning a `Router` is cheap and
/// shares the same underlying graph; `route`/`alternatives` take a read
/// lock, `update_uti` takes a write lock.
#[derive(Clone, Default)]
pub struct Router {
    graph: Arc<RwLock<Option<UrbanGraph>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds (or rebuilds) the graph over `area`.
    pub fn build_graph(&self, area: BoundingBox) -> Result<()> {
        self.build_graph_with(area, graph::GraphBuilder::default())
    }

    /// `build_graph` with an explicit lattice density and connection radius.
    pub fn build_graph_with(&self, area: BoundingBox, builder: graph::GraphBuilder) -> Result<()> {
        let built = builder.build(area)?;
        *self.graph.write() = Some(built);
        Ok(())
    }

    /// Applies UTI overrides by node id and recomputes affected edges.
    /// Returns the number of out-of-range scores that were clamped.
    pub fn update_uti(&self, scores: &HashMap<NodeId, f64>) -> Result<usize> {
        let mut guard = self.graph.write();
        let graph = guard.as_mut().ok_or(RouterError::GraphNotInitialised)?;
        Ok(graph::update_uti(graph, scores))
    }

    /// Safety-aware A* between `start` and `end`.
    pub fn route(&self, start: Coord, end: Coord, safety_weight: f64) -> Result<RouteResult> {
        let guard = self.graph.read();
        let graph = guard.as_ref().ok_or(RouterError::GraphNotInitialised)?;
        astar::route(graph, start, end, safety_weight)
    }

    /// Up to `k` alternative routes at varying safety/speed tradeoffs.
    pub fn alternatives(&self, start: Coord, end: Coord, k: usize) -> Result<Vec<RouteResult>> {
        let guard = self.graph.read();
        let graph = guard.as_ref().ok_or(RouterError::GraphNotInitialised)?;
        Ok(alternatives::alternatives(graph, start, end, k))
    }

    pub fn node_count(&self) -> usize {
        self.graph.read().as_ref().map_or(0, UrbanGraph::node_count)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.read().as_ref().map_or(0, UrbanGraph::edge_count)
    }
}

/// Analyses an arbitrary polyline, independent of any built graph. `now`
/// pins the timestamp used for the night-hours bonus.
pub fn analyse_polyline(points: &[Coord], now: Option<DateTime<Utc>>) -> Result<RouteResult> {
    analysis::analyse_polyline(points, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> BoundingBox {
        BoundingBox::new(Coord::new(40.7489, -73.9851), Coord::new(40.7829, -73.9441))
    }

    #[test]
    fn test_route_before_build_graph_is_rejected() {
        let router = Router::new();
        let err = router
            .route(Coord::new(40.76, -73.98), Coord::new(40.77, -73.97), 0.5)
            .unwrap_err();
        assert_eq!(err, RouterError::GraphNotInitialised);
    }

    #[test]
    fn test_build_then_route_succeeds() {
        let router = Router::new();
        router
            .build_graph_with(area(), graph::GraphBuilder::new(20, 0.25))
            .unwrap();

        assert!(router.node_count() > 0);
        assert!(router.edge_count() > 0);

        let result = router
            .route(Coord::new(40.7500, -73.9800), Coord::new(40.7700, -73.9600), 0.5)
            .unwrap();
        assert!(!result.path.is_empty());
    }

    #[test]
    fn test_update_uti_before_build_is_rejected() {
        let router = Router::new();
        let err = router.update_uti(&HashMap::new()).unwrap_err();
        assert_eq!(err, RouterError::GraphNotInitialised);
    }

    #[test]
    fn test_alternatives_surface_through_the_router() {
        let router = Router::new();
        router
            .build_graph_with(area(), graph::GraphBuilder::new(20, 0.25))
            .unwrap();

        let routes = router
            .alternatives(Coord::new(40.7500, -73.9800), Coord::new(40.7700, -73.9600), 3)
            .unwrap();
        assert!(!routes.is_empty());
    }

    #[test]
    fn test_cloned_router_handles_share_the_same_graph() {
        let router = Router::new();
        let clone = router.clone();
        router
            .build_graph_with(area(), graph::GraphBuilder::new(10, 0.3))
            .unwrap();

        assert_eq!(router.node_count(), clone.node_count());
    }

    /// spec.md §8 invariant 7 asks that `analyse_polyline(path_of(R)) == R`
    /// "up to `route_type` and `algorithm_config`". Re-running the polyline
    /// analysis over a graph route's own coordinates exercises a genuinely
    /// different threat-segmentation algorithm (windowed UTI over
    /// `analysis.rs`'s own formula, threshold `0.4`) than the one that
    /// produced the graph route (per-edge `avg_uti_score`, threshold `0.5`),
    /// so `threat_segments` is not expected to round-trip — only the pure
    /// geometry (`path`, `distance_km`) does. See DESIGN.md's Open Question
    /// decisions.
    #[test]
    fn test_polyline_reanalysis_of_a_graph_route_keeps_geometry_but_not_threat_segments() {
        let router = Router::new();
        router
            .build_graph_with(area(), graph::GraphBuilder::new(20, 0.25))
            .unwrap();

        let routed = router
            .route(Coord::new(40.7500, -73.9800), Coord::new(40.7700, -73.9600), 0.5)
            .unwrap();

        let points: Vec<Coord> = routed.path.iter().map(|&p| Coord::from_geojson(p)).collect();
        let reanalysed = analyse_polyline(&points, None).unwrap();

        assert_eq!(reanalysed.path, routed.path);
        assert_eq!(reanalysed.distance_km, routed.distance_km);

        // route_type/algorithm_config are explicitly excluded by invariant 7.
        assert_ne!(reanalysed.route_type, routed.route_type);
    }
}
