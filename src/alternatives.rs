//! Alternative routes at varying safety/speed tradeoffs: run the
//! safety-aware search at several safety weights and rank the results that
//! succeeded.

use crate::astar;
use crate::model::{Coord, RouteResult, RouteType, UrbanGraph};

const MIN_WEIGHT: f64 = 0.1;
const MAX_WEIGHT: f64 = 0.9;

const FASTEST_FOCUS: &str = "minimize_distance";
const BALANCED_FOCUS: &str = "balance_distance_and_safety";
const SAFEST_FOCUS: &str = "maximize_safety";

/// Safety weights evenly spaced over `[0.1, 0.9]`, `k` of them. A single
/// alternative uses the midpoint.
fn spaced_weights(k: usize) -> Vec<f64> {
    if k <= 1 {
        return vec![(MIN_WEIGHT + MAX_WEIGHT) / 2.0];
    }
    (0..k)
        .map(|i| MIN_WEIGHT + (MAX_WEIGHT - MIN_WEIGHT) * i as f64 / (k - 1) as f64)
        .collect()
}

fn classify(weight: f64) -> (RouteType, &'static str) {
    if weight < 0.3 {
        (RouteType::FastestRoute, FASTEST_FOCUS)
    } else if weight > 0.7 {
        (RouteType::SafestRoute, SAFEST_FOCUS)
    } else {
        (RouteType::BalancedRoute, BALANCED_FOCUS)
    }
}

/// Composite score used to rank alternatives, favouring safety with a
/// secondary preference for shorter routes.
fn rank_score(result: &RouteResult) -> f64 {
    0.6 * result.safety_score + 0.4 * (1.0 / (result.distance_km + 1.0))
}

/// Computes up to `k` alternative routes between `start` and `end`. Weights
/// that fail to find a path are dropped rather than surfaced as an error;
/// the result is empty only if every weight failed.
pub fn alternatives(graph: &UrbanGraph, start: Coord, end: Coord, k: usize) -> Vec<RouteResult> {
    if k == 0 {
        return Vec::new();
    }

    let mut results: Vec<RouteResult> = spaced_weights(k)
        .into_iter()
        .filter_map(|weight| {
            let mut result = astar::route(graph, start, end, weight).ok()?;
            let (route_type, focus) = classify(weight);
            result.route_type = route_type;
            result.optimization_focus = Some(focus);
            Some(result)
        })
        .collect();

    results.sort_by(|a, b| rank_score(b).total_cmp(&rank_score(a)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::BoundingBox;

    fn area() -> BoundingBox {
        BoundingBox::new(Coord::new(40.7489, -73.9851), Coord::new(40.7829, -73.9441))
    }

    #[test]
    fn test_spaced_weights_cover_the_full_range() {
        let weights = spaced_weights(5);
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[0], MIN_WEIGHT);
        assert_eq!(*weights.last().unwrap(), MAX_WEIGHT);
    }

    #[test]
    fn test_single_alternative_uses_the_midpoint() {
        assert_eq!(spaced_weights(1), vec![0.5]);
    }

    #[test]
    fn test_alternatives_are_ranked_best_first_and_tagged() {
        let graph = GraphBuilder::new(25, 0.2).build(area()).unwrap();
        let start = Coord::new(40.7500, -73.9800);
        let end = Coord::new(40.7700, -73.9600);

        let routes = alternatives(&graph, start, end, 3);
        assert!(!routes.is_empty());

        for pair in routes.windows(2) {
            assert!(rank_score(&pair[0]) >= rank_score(&pair[1]) - 1e-9);
        }
        for route in &routes {
            assert!(route.optimization_focus.is_some());
        }
    }

    #[test]
    fn test_zero_alternatives_requested_yields_empty_vec() {
        let graph = GraphBuilder::new(5, 0.3).build(area()).unwrap();
        let routes = alternatives(
            &graph,
            Coord::new(40.76, -73.98),
            Coord::new(40.77, -73.97),
            0,
        );
        assert!(routes.is_empty());
    }

    #[test]
    fn test_unreachable_endpoints_yield_empty_vec() {
        let far_area = BoundingBox::new(Coord::new(40.0, -75.0), Coord::new(41.5, -73.0));
        let graph = GraphBuilder::new(25, 0.01).build(far_area).unwrap();
        let routes = alternatives(
            &graph,
            Coord::new(40.05, -74.95),
            Coord::new(41.45, -73.05),
            3,
        );
        assert!(routes.is_empty());
    }
}
