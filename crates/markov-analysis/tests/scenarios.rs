//! Known-chain regression tests.
//!
//! Each chain is small enough that classes, links, periods and limiting
//! distributions are computed by hand and hardcoded here.

use markov_analysis::graph::{ClassKind, condense, decompose, reduce};
use markov_analysis::matrix::{
    TransitionMatrix, distribution, period, power, power_iterate, sub_matrix,
};
use markov_analysis::ChainAnalysis;
use markov_core::load::{EdgePolicy, read_graph};
use markov_core::{AnalysisConfig, WeightedDigraph};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load(text: &str) -> WeightedDigraph {
    read_graph(text.as_bytes(), EdgePolicy::Strict)
        .expect("load")
        .graph
}

fn sorted_one_based(analysis: &ChainAnalysis) -> Vec<(Vec<usize>, ClassKind, usize)> {
    let mut out: Vec<_> = analysis
        .classes
        .iter()
        .map(|c| {
            let mut v: Vec<usize> = c.vertices.iter().map(|v| v + 1).collect();
            v.sort_unstable();
            (v, c.kind, c.period)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// Gambler's ruin on {1..5}: 1 and 5 absorb, 2..4 move ±1 with p = 1/2.
const GAMBLER: &str = "5
1 1 1.0
2 1 0.5
2 3 0.5
3 2 0.5
3 4 0.5
4 3 0.5
4 5 0.5
5 5 1.0
";

/// Deterministic 3-cycle feeding nothing.
const RING: &str = "3
1 2 1.0
2 3 1.0
3 1 1.0
";

/// Two-state weather chain from the classic textbook example.
const WEATHER: &str = "2
1 1 0.9
1 2 0.1
2 1 0.5
2 2 0.5
";

/// Diamond of transient states with a redundant shortcut into the sink.
const DIAMOND: &str = "4
1 2 0.4
1 3 0.4
1 4 0.2
2 4 1.0
3 4 1.0
4 4 1.0
";

#[test]
fn gamblers_ruin() {
    let g = load(GAMBLER);
    let a = ChainAnalysis::run(&g, &AnalysisConfig::default()).expect("analysis");
    assert!(a.validation.check().is_markov);
    assert_eq!(
        sorted_one_based(&a),
        vec![
            (vec![1], ClassKind::Absorbing, 1),
            (vec![2, 3, 4], ClassKind::Transient, 2),
            (vec![5], ClassKind::Absorbing, 1),
        ]
    );
    assert_eq!(a.stats.absorbing_count, 2);
    assert_eq!(a.links.len(), 2);

    // Ruin probabilities from the middle: 3/4, 1/2, 1/4.
    let r = power_iterate(&a.matrix, 1e-10, 10_000).expect("iterate");
    assert!(r.converged);
    for (start, ruin) in [(1, 0.75), (2, 0.5), (3, 0.25)] {
        let row = r.result.row(start).expect("row");
        assert!(close(row[0], ruin), "start {start}: {row:?}");
        assert!(close(row[4], 1.0 - ruin), "start {start}: {row:?}");
    }
}

#[test]
fn ring_is_one_periodic_class() {
    let g = load(RING);
    let a = ChainAnalysis::run(&g, &AnalysisConfig::default()).expect("analysis");
    assert_eq!(sorted_one_based(&a), vec![(vec![1, 2, 3], ClassKind::Recurrent, 3)]);
    assert!(a.links.is_empty());
    assert!(!a.global.converged);
    assert_eq!(a.global.iterations, 1000);
    assert!(a.stats.is_irreducible());
}

#[test]
fn weather_converges_to_stationary() {
    let g = load(WEATHER);
    let m = TransitionMatrix::from_graph(&g).expect("matrix");
    let r = power_iterate(&m, 1e-12, 1000).expect("iterate");
    assert!(r.converged);
    // π = (5/6, 1/6).
    for row in r.result.rows() {
        assert!(close(row[0], 5.0 / 6.0));
        assert!(close(row[1], 1.0 / 6.0));
    }
    assert_eq!(period(&m).expect("period"), 1);
}

#[test]
fn diamond_shortcut_is_reduced() {
    let g = load(DIAMOND);
    let p = decompose(&g).expect("decompose");
    let links = condense::build(&g, &p).expect("links");
    assert_eq!(links.len(), 5);

    let mut reduced = links.clone();
    assert_eq!(reduce::reduce(&mut reduced), 1);
    let c = |v: usize| p.class_of(v - 1).expect("class");
    assert!(!reduced.contains(c(1), c(4)));
    assert!(reduced.contains(c(1), c(2)));
    assert!(reduced.contains(c(2), c(4)));
}

#[test]
fn forecast_matches_hand_computation() {
    let g = load(WEATHER);
    let m = TransitionMatrix::from_graph(&g).expect("matrix");
    assert_eq!(distribution(&m, 0, 0).expect("d0"), vec![1.0, 0.0]);
    let d2 = distribution(&m, 0, 2).expect("d2");
    // [0.9, 0.1] · M = [0.86, 0.14]
    assert!(close(d2[0], 0.86));
    assert!(close(d2[1], 0.14));
}

#[test]
fn powers_three_and_seven_of_ring() {
    let g = load(RING);
    let m = TransitionMatrix::from_graph(&g).expect("matrix");
    assert_eq!(power(&m, 3).expect("m3"), TransitionMatrix::identity(3).expect("id"));
    assert_eq!(power(&m, 7).expect("m7"), m);
}

#[test]
fn class_submatrix_of_transient_block() {
    let g = load(GAMBLER);
    let m = TransitionMatrix::from_graph(&g).expect("matrix");
    let sub = sub_matrix(&m, &[1, 2, 3]).expect("sub");
    assert_eq!(
        sub.matrix.rows(),
        vec![
            vec![0.0, 0.5, 0.0],
            vec![0.5, 0.0, 0.5],
            vec![0.0, 0.5, 0.0]
        ]
    );
    assert_eq!(period(&sub.matrix).expect("period"), 2);
}

#[test]
fn content_hash_is_stable_across_loads() {
    assert_eq!(load(GAMBLER).content_hash(), load(GAMBLER).content_hash());
    assert_ne!(load(GAMBLER).content_hash(), load(RING).content_hash());
}
