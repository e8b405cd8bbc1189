use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use agrocast_core::MonthKey;
use agrocast_forecast::{
    EncoderTable, EngineSettings, FeatureProviders, ForecastEngine, ForestRegressor, InMemoryRecordStore,
    LabelEncoder, ModelArtifacts, Node, StandardScaler, Tree, DEMAND_FEATURES, DEMAND_SCALED_FEATURES,
    PRICE_FEATURES,
};

/// Complete binary tree of `depth` levels splitting on features round-robin.
fn balanced_tree(depth: u32, n_features: usize, seed: usize) -> Tree {
    let internal = (1usize << depth) - 1;
    let total = (1usize << (depth + 1)) - 1;
    let nodes = (0..total)
        .map(|i| {
            if i < internal {
                Node::Split {
                    feature: (i + seed) % n_features,
                    threshold: ((i * 37 + seed * 11) % 100) as f64,
                    left: 2 * i + 1,
                    right: 2 * i + 2,
                }
            } else {
                Node::Leaf {
                    value: 50.0 + ((i + seed) % 17) as f64,
                }
            }
        })
        .collect();
    Tree { nodes }
}

fn forest(names: &[&str], n_trees: usize, depth: u32) -> ForestRegressor {
    let trees = (0..n_trees).map(|s| balanced_tree(depth, names.len(), s)).collect();
    ForestRegressor::new(names.iter().map(|n| n.to_string()).collect(), trees).unwrap()
}

fn artifacts(n_trees: usize) -> Arc<ModelArtifacts> {
    let encoders = EncoderTable::new()
        .with_field("state", LabelEncoder::new(["Bihar", "Kerala", "Punjab"]))
        .with_field("crop", LabelEncoder::new(["Maize", "Rice", "Wheat"]));
    let scaler = StandardScaler::new(
        DEMAND_SCALED_FEATURES.iter().map(|c| c.to_string()).collect(),
        vec![40.0, 30_000.0, 30.0, 1_250.0],
        vec![10.0, 11_000.0, 11.0, 430.0],
    )
    .unwrap();

    Arc::new(
        ModelArtifacts::new(
            Arc::new(forest(&PRICE_FEATURES, n_trees, 8)),
            Arc::new(forest(&DEMAND_FEATURES, n_trees, 8)),
            scaler,
            encoders.clone(),
            encoders,
        )
        .unwrap(),
    )
}

fn engine(n_trees: usize, store: InMemoryRecordStore) -> ForecastEngine {
    ForecastEngine::new(
        Arc::new(store),
        artifacts(n_trees),
        FeatureProviders::synthetic(Some(7)),
        EngineSettings::default(),
    )
}

fn month(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}

fn bench_single_month(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_month");

    for n_trees in [10usize, 100] {
        let engine = engine(n_trees, InMemoryRecordStore::new());
        group.bench_with_input(BenchmarkId::new("price_inferred", n_trees), &engine, |b, e| {
            b.iter(|| e.price_resolver().resolve(black_box("Bihar"), black_box("Rice"), month(2024, 3)));
        });
        group.bench_with_input(BenchmarkId::new("demand_inferred", n_trees), &engine, |b, e| {
            b.iter(|| e.demand_resolver().resolve(black_box("Bihar"), black_box("Rice"), month(2024, 3)));
        });
    }

    let store = InMemoryRecordStore::new();
    store.set_price("Bihar", "Rice", month(2024, 3), 42.0);
    let engine = engine(100, store);
    group.bench_function("price_stored", |b| {
        b.iter(|| engine.price_resolver().resolve(black_box("Bihar"), black_box("Rice"), month(2024, 3)));
    });

    group.finish();
}

fn bench_forecast_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast_range");
    let engine = engine(100, InMemoryRecordStore::new());
    let start = month(2024, 1);

    for months in [12u32, 60, 120] {
        let end = (1..months).fold(start, |m, _| m.succ().expect("within year range"));
        group.throughput(Throughput::Elements(u64::from(months)));
        group.bench_with_input(BenchmarkId::new("demand", months), &end, |b, end| {
            b.iter(|| engine.forecast_demand("Punjab", "Wheat", start, *end).unwrap());
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let store = InMemoryRecordStore::new();
    for crop in ["Maize", "Rice", "Wheat", "Barley", "Cotton", "Jute"] {
        store.set_price("Bihar", crop, month(2024, 4), 30.0);
        store.set_demand("Bihar", crop, month(2024, 4), 800.0);
    }
    let engine = engine(100, store);

    c.bench_function("snapshot_six_crops", |b| {
        b.iter(|| engine.snapshot(black_box("Bihar"), month(2024, 4), month(2024, 5)));
    });
}

criterion_group!(benches, bench_single_month, bench_forecast_range, bench_snapshot);
criterion_main!(benches);
