//! Criterion benchmarks for trove-features hot paths.
//!
//! Covers: concentration index, per-domain computers, and the full engine pass.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trove_core::config::ScoringConfig;
use trove_core::traits::FeatureComputer;
use trove_core::types::{DepositRecord, DepositSet};
use trove_features::asset::herfindahl;
use trove_features::{FeatureEngine, TimeFeatureComputer, ValueFeatureComputer};

/// 2 000 wallets with 25 deposits each spread over 8 assets.
fn synthetic_deposits() -> DepositSet {
    let mut records = Vec::with_capacity(50_000);
    for wallet in 0..2_000u64 {
        for n in 0..25u64 {
            records.push(DepositRecord {
                account_id: format!("0x{wallet:040x}"),
                asset: format!("asset-{}", (wallet + n) % 8),
                asset_symbol: String::new(),
                amount: Some((n + 1) as f64),
                amount_usd: Some(((wallet % 97) * (n + 3)) as f64),
                timestamp: Utc
                    .timestamp_opt(1_600_000_000 + (n * 3_600 * (wallet % 11 + 1)) as i64, 0)
                    .unwrap(),
                block_number: Some(n),
                transaction_hash: String::new(),
            });
        }
    }
    DepositSet::new(records).unwrap()
}

fn bench_herfindahl(c: &mut Criterion) {
    let counts: Vec<u64> = (1..=64).collect();
    c.bench_function("herfindahl_64_assets", |b| {
        b.iter(|| herfindahl(black_box(counts.iter().copied())))
    });
}

fn bench_computers(c: &mut Criterion) {
    let deposits = synthetic_deposits();
    c.bench_function("time_features_50k", |b| {
        b.iter(|| TimeFeatureComputer::new().compute(black_box(&deposits)))
    });
    c.bench_function("value_features_50k", |b| {
        b.iter(|| ValueFeatureComputer::new().compute(black_box(&deposits)))
    });
}

fn bench_engine(c: &mut Criterion) {
    let deposits = synthetic_deposits();
    let engine = FeatureEngine::new(ScoringConfig::default()).unwrap();
    c.bench_function("feature_engine_50k", |b| b.iter(|| engine.run(black_box(&deposits))));
}

criterion_group!(benches, bench_herfindahl, bench_computers, bench_engine);
criterion_main!(benches);
