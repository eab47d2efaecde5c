//! Integration tests: structural properties of the spanning tree and
//! tour over generated point sets, cross-checked against petgraph.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use mstour_pipeline::{
    DisjointSet, Edge, PipelineConfig, Point, Termination, WalkState, diagnostics, process,
};
use petgraph::data::Element;
use petgraph::graph::UnGraph;

/// Deterministic pseudo-random points (64-bit LCG) in `[0, 1000)`.
fn scattered(n: usize, seed: u64) -> Vec<Point> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 40) % 1000) as f32
    };
    (0..n).map(|_| Point::new(next(), next())).collect()
}

/// MST weight computed by petgraph over the same complete graph.
fn petgraph_mst_weight(points: &[Point]) -> f64 {
    let mut graph = UnGraph::<(), f32>::new_undirected();
    let nodes: Vec<_> = points.iter().map(|_| graph.add_node(())).collect();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            graph.add_edge(nodes[i], nodes[j], points[i].distance(points[j]));
        }
    }
    petgraph::algo::min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { weight, .. } => Some(f64::from(weight)),
            Element::Node { .. } => None,
        })
        .sum()
}

#[test]
fn mst_weight_matches_petgraph() {
    for (n, seed) in [(2, 1), (7, 2), (25, 3), (60, 4)] {
        let points = scattered(n, seed);
        let solution = process(&points, &PipelineConfig::default()).unwrap();
        let expected = petgraph_mst_weight(&points);
        assert!(
            (solution.mst.total_weight() - expected).abs() < 1e-2,
            "n={n}: {} vs petgraph {expected}",
            solution.mst.total_weight(),
        );
    }
}

#[test]
fn tree_has_n_minus_one_edges_and_no_cycle() {
    let points = scattered(40, 11);
    let solution = process(&points, &PipelineConfig::default()).unwrap();
    assert_eq!(solution.mst.len(), points.len() - 1);

    let mut ds = DisjointSet::new(points.len());
    for e in solution.mst.edges() {
        assert!(ds.union(e.a(), e.b()).unwrap(), "cycle through {e:?}");
    }
    assert!(ds.is_spanning());
}

#[test]
fn completed_walk_crosses_every_edge_twice() {
    for seed in 20..30 {
        let points = scattered(30, seed);
        let solution = process(&points, &PipelineConfig::default()).unwrap();
        assert_eq!(solution.walk_state, WalkState::Done);
        assert!(solution.tour.is_permutation_of(points.len()));
        assert!(
            solution
                .mst
                .edges()
                .iter()
                .all(|e| e.traversals() == Edge::MAX_TRAVERSALS)
        );
    }
}

#[test]
fn mst_weight_is_invariant_under_point_order() {
    let points = scattered(35, 99);
    let baseline = process(&points, &PipelineConfig::default())
        .unwrap()
        .mst
        .total_weight();

    let mut reversed = points.clone();
    reversed.reverse();
    let mut rotated = points.clone();
    rotated.rotate_left(13);

    for permuted in [reversed, rotated] {
        let weight = process(&permuted, &PipelineConfig::default())
            .unwrap()
            .mst
            .total_weight();
        assert!((weight - baseline).abs() < 1e-2, "{weight} vs {baseline}");
    }
}

#[test]
fn termination_rules_give_same_solution() {
    let points = scattered(45, 7);
    let by_count = process(
        &points,
        &PipelineConfig {
            termination: Termination::EdgeCount,
            ..PipelineConfig::default()
        },
    )
    .unwrap();
    let by_scan = process(
        &points,
        &PipelineConfig {
            termination: Termination::SpanningScan,
            ..PipelineConfig::default()
        },
    )
    .unwrap();
    assert_eq!(by_count, by_scan);
}

#[test]
fn collinear_points() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(2.0, 0.0),
    ];
    let solution = process(&points, &PipelineConfig::default()).unwrap();
    assert!((solution.mst.total_weight() - 2.0).abs() < 1e-6);
    assert_eq!(solution.tour.vertices(), &[0, 1, 2]);
}

#[test]
fn coincident_points_still_yield_a_tour() {
    let points = vec![Point::new(5.0, 5.0); 6];
    let solution = process(&points, &PipelineConfig::default()).unwrap();
    assert_eq!(solution.mst.len(), 5);
    assert!(solution.mst.total_weight().abs() < f64::EPSILON);
    assert!(solution.tour.is_permutation_of(6));
}

#[test]
fn tour_is_at_most_twice_the_mst() {
    // The walk is a shortcut of the doubled tree.
    for seed in 40..45 {
        let points = scattered(50, seed);
        let solution = process(&points, &PipelineConfig::default()).unwrap();
        let tour = solution.tour.length(&points).unwrap();
        assert!(tour <= 2.0 * solution.mst.total_weight() + 0.1);
    }
}

#[test]
fn solution_serializes_to_json() {
    let points = scattered(5, 123);
    let solution = process(&points, &PipelineConfig::default()).unwrap();
    let json = serde_json::to_string(&solution).unwrap();
    let back: mstour_pipeline::Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(back, solution);
}

#[test]
fn diagnostics_agree_with_solution() {
    struct ZeroClock;
    impl diagnostics::Clock for ZeroClock {
        type Instant = ();
        fn now(&self) {}
        fn elapsed(&self, _since: &()) -> std::time::Duration {
            std::time::Duration::ZERO
        }
    }

    let points = scattered(12, 5);
    let (solution, diag) =
        diagnostics::process_with_diagnostics(&points, &PipelineConfig::default(), &ZeroClock)
            .unwrap();
    assert!((diag.summary.mst_weight - solution.mst.total_weight()).abs() < f64::EPSILON);
    assert!((diag.summary.tour_length - solution.tour.length(&points).unwrap()).abs() < 1e-9);
    assert!(diag.report().contains("0.0%"));
}
