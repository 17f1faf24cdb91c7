//! Criterion benchmarks for the distribution hot paths.
//!
//! Covers: pool apportionment across a wide claimant set, a deep linear
//! chain, and a wide fan-out distribution.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tributary_core::constants::FACTOR_PRECISION;
use tributary_core::types::{Edge, Node};
use tributary_engine::apportion::split_pool;
use tributary_engine::{CitationGraph, DistributionEngine, EngineConfig};

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn bench_split_pool(c: &mut Criterion) {
    let claimants: Vec<(String, u128)> = (0..100)
        .map(|i| (format!("n{i:03}"), (i as u128 + 1) * 7))
        .collect();

    c.bench_function("split_pool_100_claimants", |b| {
        b.iter(|| split_pool(black_box(1_000_000), black_box(&claimants)))
    });
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for i in 0..64u32 {
        nodes.push(
            Node::new(format!("n{i}"), format!("u{i}"), fixed_now())
                .with_propagation_ppb(FACTOR_PRECISION / 2)
                .with_citations(3),
        );
        if i > 0 {
            edges.push(Edge::new(format!("n{}", i - 1), format!("n{i}")));
        }
    }
    let graph = Arc::new(CitationGraph::new(nodes, edges).unwrap());
    let engine = DistributionEngine::with_clock(graph, fixed_now())
        .with_config(EngineConfig {
            max_depth: 64,
            ..Default::default()
        })
        .unwrap();

    c.bench_function("distribute_deep_chain", |b| {
        b.iter(|| engine.distribute(black_box("bench"), black_box("n0"), black_box(1_000_000)))
    });
}

fn bench_wide_fanout(c: &mut Criterion) {
    let mut nodes = vec![
        Node::new("trigger", "author", fixed_now())
            .with_propagation_ppb(850_000_000),
    ];
    let mut edges = Vec::new();
    for i in 0..200u32 {
        nodes.push(
            Node::new(format!("up{i:03}"), format!("user{i:03}"), fixed_now())
                .with_citations(i % 7 + 1),
        );
        edges.push(Edge::new("trigger", format!("up{i:03}")));
    }
    let graph = Arc::new(CitationGraph::new(nodes, edges).unwrap());
    let engine = DistributionEngine::with_clock(graph, fixed_now());

    c.bench_function("distribute_wide_fanout", |b| {
        b.iter(|| engine.distribute(black_box("bench"), black_box("trigger"), black_box(1_000_000)))
    });
}

criterion_group!(benches, bench_split_pool, bench_deep_chain, bench_wide_fanout);
criterion_main!(benches);
