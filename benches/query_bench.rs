use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::rngs::StdRng;

use bayesets::{ComputedIndex, IndexOptions};

/// Zipf-ish synthetic corpus: popular features land on many items, the
/// long tail on few, which is roughly what tag and keyword data look like.
fn synthetic_pairs(n_items: usize, vocab: usize, per_item: usize, seed: u64) -> Vec<(u64, String)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pairs = Vec::with_capacity(n_items * per_item);
    for item in 0..n_items {
        for _ in 0..per_item {
            let r: f64 = rng.random();
            let feature = ((vocab as f64) * r * r) as usize;
            pairs.push((item as u64, format!("ft{feature}")));
        }
    }
    pairs
}

fn build_index(n_items: usize) -> ComputedIndex {
    let pairs = synthetic_pairs(n_items, n_items / 10 + 64, 24, 42);
    ComputedIndex::from_pairs(pairs, IndexOptions::default())
}

fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("seal");
    group.measurement_time(Duration::from_secs(10));
    for n_items in [1_000usize, 10_000] {
        let pairs = synthetic_pairs(n_items, n_items / 10 + 64, 24, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n_items), &pairs, |b, pairs| {
            b.iter(|| {
                black_box(ComputedIndex::from_pairs(
                    pairs.clone(),
                    IndexOptions::default(),
                ))
            });
        });
    }
    group.finish();
}

fn bench_singleton_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_singleton");
    for n_items in [1_000usize, 10_000, 100_000] {
        let index = build_index(n_items);
        group.bench_with_input(BenchmarkId::from_parameter(n_items), &index, |b, index| {
            b.iter(|| black_box(index.query(&[17], Some(10))));
        });
    }
    group.finish();
}

fn bench_multi_item_query(c: &mut Criterion) {
    let index = build_index(100_000);
    let mut group = c.benchmark_group("query_multi");
    for query_size in [2usize, 8, 32] {
        let ids: Vec<u64> = (0..query_size as u64).map(|i| i * 97).collect();
        group.bench_with_input(BenchmarkId::from_parameter(query_size), &ids, |b, ids| {
            b.iter(|| black_box(index.query(ids, Some(10))));
        });
    }
    group.finish();
}

fn bench_detailed_scores(c: &mut Criterion) {
    let index = build_index(10_000);
    let candidates: Vec<u64> = index.query(&[17], Some(10)).iter().map(|&(id, _)| id).collect();
    c.bench_function("detailed_scores_top10", |b| {
        b.iter(|| black_box(index.get_detailed_scores(&[17], &candidates, 20)));
    });
}

criterion_group!(
    benches,
    bench_seal,
    bench_singleton_query,
    bench_multi_item_query,
    bench_detailed_scores
);
criterion_main!(benches);
