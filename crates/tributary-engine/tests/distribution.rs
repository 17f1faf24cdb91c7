//! End-to-end distribution scenarios.
//!
//! Each test builds a small graph, runs `distribute` against a pinned
//! clock, and checks the full allocation accounting: conservation to the
//! cent, the depth and cycle guards, difficulty compensation, and the
//! penny-exact weighted fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use tributary_core::constants::FACTOR_PRECISION;
use tributary_core::fixed::parse_factor_ppb;
use tributary_core::types::{Allocation, AllocationSource, Edge, Node};
use tributary_engine::{summarize, CitationGraph, DistributionEngine, EngineConfig};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn rate(r: &str) -> u64 {
    parse_factor_ppb(r).unwrap()
}

fn engine(nodes: Vec<Node>, edges: Vec<Edge>) -> DistributionEngine {
    let graph = CitationGraph::new(nodes, edges).unwrap();
    DistributionEngine::with_clock(Arc::new(graph), now())
}

fn by_user(allocations: &[Allocation]) -> HashMap<String, u64> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for allocation in allocations {
        *totals.entry(allocation.user_id.clone()).or_insert(0) += allocation.amount;
    }
    totals
}

#[test]
fn difficulty_compensation_adjusts_upstream_pool() {
    // Base retention 0.4, difficulty 300/100 capped at 1.75 -> retains 70%.
    let task = Node::new("task", "executor", now())
        .with_propagation_ppb(rate("0.6"))
        .with_effort(100 * 60, 300 * 60);
    let upstream = Node::new("upstream", "upstream_owner", now());
    let engine = engine(vec![task, upstream], vec![Edge::new("task", "upstream")]);

    let allocations = engine.distribute("task", "task", 10_000).unwrap();
    let totals = by_user(&allocations);

    assert_eq!(totals["executor"], 7_000);
    assert_eq!(totals["upstream_owner"], 3_000);
    assert_eq!(totals.values().sum::<u64>(), 10_000);
}

#[test]
fn weighted_fan_out_splits_pool_exactly() {
    // One article citing ten upstream nodes with reference weights
    // 40 / 30 / (8 × 3.75). The 15% retained stays with the author, and
    // the 85.00 pool splits 34.00 / 25.50 / 25.50.
    let article = Node::new("article", "author", now()).with_propagation_ppb(rate("0.85"));
    let core = Node::new("core_theory", "core_author", now())
        .with_citations(5)
        .with_creativity_ppb(rate("8"));
    let method = Node::new("method", "method_author", now())
        .with_citations(3)
        .with_creativity_ppb(rate("10"));
    let mut nodes = vec![article, core, method];
    let mut edges = vec![
        Edge::new("article", "core_theory"),
        Edge::new("article", "method"),
    ];
    for i in 1..=8 {
        nodes.push(
            Node::new(format!("other_{i}"), format!("other_author_{i}"), now())
                .with_citations(1)
                .with_creativity_ppb(rate("3.75")),
        );
        edges.push(Edge::new("article", format!("other_{i}")));
    }

    let engine = engine(nodes, edges);
    let allocations = engine.distribute("article", "article", 10_000).unwrap();
    let totals = by_user(&allocations);

    assert_eq!(totals.values().sum::<u64>(), 10_000);
    assert_eq!(totals["author"], 1_500);
    assert_eq!(totals["core_author"], 3_400);
    assert_eq!(totals["method_author"], 2_550);

    let others: Vec<u64> = (1..=8)
        .map(|i| totals[&format!("other_author_{i}")])
        .collect();
    assert_eq!(others.iter().sum::<u64>(), 2_550);
    for share in &others {
        assert!(
            *share == 318 || *share == 319,
            "unexpected share {share}"
        );
    }
}

#[test]
fn depth_limit_stops_a_linear_chain() {
    // n0 -> n1 -> ... -> n7, every node propagating 100%. With depth 5
    // the entire amount lands on n5's creator and nothing reaches n6.
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for i in 0..8 {
        nodes.push(
            Node::new(format!("n{i}"), format!("u{i}"), now())
                .with_propagation_ppb(FACTOR_PRECISION),
        );
        if i > 0 {
            edges.push(Edge::new(format!("n{}", i - 1), format!("n{i}")));
        }
    }

    let engine = engine(nodes, edges);
    let allocations = engine.distribute("n0", "n0", 1_000).unwrap();

    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].user_id, "u5");
    assert_eq!(allocations[0].amount, 1_000);
    assert_eq!(allocations[0].level, 5);
    assert_eq!(allocations[0].source, AllocationSource::Propagation);
}

#[test]
fn cycle_guard_terminates_mutual_citation() {
    let a = Node::new("a", "ua", now()).with_propagation_ppb(FACTOR_PRECISION);
    let b = Node::new("b", "ub", now()).with_propagation_ppb(rate("0.5"));
    let graph = CitationGraph::new(
        vec![a, b],
        vec![Edge::new("a", "b"), Edge::new("b", "a")],
    )
    .unwrap();
    let config = EngineConfig {
        max_depth: 50,
        ..Default::default()
    };
    let engine = DistributionEngine::with_clock(Arc::new(graph), now())
        .with_config(config)
        .unwrap();

    let allocations = engine.distribute("a", "a", 1_000).unwrap();
    let totals = by_user(&allocations);

    assert_eq!(totals["ub"], 500);
    assert_eq!(totals["ua"], 500);
    assert_eq!(totals.values().sum::<u64>(), 1_000);
}

#[test]
fn distribute_is_idempotent() {
    let trigger = Node::new("t", "ut", now()).with_propagation_ppb(rate("0.7"));
    let left = Node::new("left", "ul", now() - chrono::Duration::days(365))
        .with_citations(4)
        .with_propagation_ppb(rate("0.2"));
    let right = Node::new("right", "ur", now())
        .with_citations(2)
        .with_propagation_ppb(rate("0.4"));
    let shared = Node::new("shared", "us", now() - chrono::Duration::days(30)).with_citations(7);
    let nodes = vec![trigger, left, right, shared];
    let edges = vec![
        Edge::new("t", "left"),
        Edge::new("t", "right"),
        Edge::new("left", "shared"),
        Edge::new("right", "shared"),
    ];

    let engine = engine(nodes, edges);
    let first = engine.distribute("evt", "t", 123_456).unwrap();
    let second = engine.distribute("evt", "t", 123_456).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.iter().map(|a| a.amount).sum::<u64>(), 123_456);
}

#[test]
fn same_node_may_be_credited_once_per_distinct_path() {
    // Diamond: both branches cite "shared"; it is visited once per branch
    // (the cycle guard is per-path, not global).
    let trigger = Node::new("t", "ut", now()).with_propagation_ppb(FACTOR_PRECISION);
    let left = Node::new("left", "ul", now())
        .with_citations(1)
        .with_propagation_ppb(FACTOR_PRECISION);
    let right = Node::new("right", "ur", now())
        .with_citations(1)
        .with_propagation_ppb(FACTOR_PRECISION);
    let shared = Node::new("shared", "us", now()).with_citations(1);
    let engine = engine(
        vec![trigger, left, right, shared],
        vec![
            Edge::new("t", "left"),
            Edge::new("t", "right"),
            Edge::new("left", "shared"),
            Edge::new("right", "shared"),
        ],
    );

    let allocations = engine.distribute("evt", "t", 1_000).unwrap();
    let shared_credits: Vec<&Allocation> = allocations
        .iter()
        .filter(|a| a.node_id == "shared")
        .collect();
    assert_eq!(shared_credits.len(), 2);
    assert_eq!(shared_credits.iter().map(|a| a.amount).sum::<u64>(), 1_000);
}

#[test]
fn summary_matches_allocations() {
    let task = Node::new("task", "executor", now())
        .with_propagation_ppb(rate("0.6"))
        .with_effort(100 * 60, 300 * 60);
    let upstream = Node::new("upstream", "upstream_owner", now());
    let engine = engine(vec![task, upstream], vec![Edge::new("task", "upstream")]);
    let allocations = engine.distribute("task", "task", 10_000).unwrap();

    let summaries = summarize(&allocations);
    assert_eq!(summaries[0].user_id, "executor");
    assert_eq!(summaries[0].direct, 7_000);
    assert_eq!(summaries[0].propagated, 0);
    assert_eq!(summaries[1].user_id, "upstream_owner");
    assert_eq!(summaries[1].propagated, 3_000);
}

proptest! {
    #[test]
    fn conservation_holds_for_arbitrary_rates_and_amounts(
        amount in 0u64..5_000_000,
        rate_a in 0u64..=FACTOR_PRECISION,
        rate_b in 0u64..=FACTOR_PRECISION,
        rate_c in 0u64..=FACTOR_PRECISION,
        citations in proptest::collection::vec(0u32..50, 4),
    ) {
        // Diamond with a back-edge cycle: a -> {b, c} -> d -> a.
        let nodes = vec![
            Node::new("a", "ua", now()).with_propagation_ppb(rate_a).with_citations(citations[0]),
            Node::new("b", "ub", now() - chrono::Duration::days(200))
                .with_propagation_ppb(rate_b)
                .with_citations(citations[1]),
            Node::new("c", "uc", now() - chrono::Duration::days(400))
                .with_propagation_ppb(rate_c)
                .with_citations(citations[2]),
            Node::new("d", "ud", now() - chrono::Duration::days(800))
                .with_citations(citations[3])
                .with_propagation_ppb(FACTOR_PRECISION / 2),
        ];
        let edges = vec![
            Edge::new("a", "b"),
            Edge::new("a", "c"),
            Edge::new("b", "d"),
            Edge::new("c", "d"),
            Edge::new("d", "a"),
        ];
        let engine = engine(nodes, edges);
        let allocations = engine.distribute("evt", "a", amount).unwrap();
        let total: u64 = allocations.iter().map(|a| a.amount).sum();
        prop_assert_eq!(total, amount);
        for allocation in &allocations {
            prop_assert!(allocation.amount >= 1);
        }
    }
}
