//! Asset-usage features: diversity relative to the dataset and concentration.
//!
//! Concentration is the Herfindahl index over per-asset deposit counts:
//! `sum(count_i^2) / (sum count_i)^2`. It is 1 for a single-asset wallet and
//! approaches `1/N` when usage is spread evenly over `N` assets.

use std::collections::BTreeMap;

use trove_core::traits::FeatureComputer;
use trove_core::types::{AssetFeatures, DepositRecord, DepositSet, FeatureTable};

/// Computes [`AssetFeatures`] for each wallet.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetFeatureComputer;

impl AssetFeatureComputer {
    pub fn new() -> Self {
        Self
    }

    /// Features for one wallet given the dataset-wide distinct asset count.
    pub fn wallet_features(records: &[&DepositRecord], total_distinct_assets: usize) -> AssetFeatures {
        let counts = asset_counts(records);
        let unique = counts.len();

        let ratio = if total_distinct_assets == 0 {
            0.0
        } else {
            unique as f64 / total_distinct_assets as f64
        };

        AssetFeatures {
            unique_assets_count: unique as u64,
            unique_assets_ratio: ratio,
            most_used_asset: most_used(&counts).unwrap_or_default().to_string(),
            asset_concentration: herfindahl(counts.values().copied()),
        }
    }
}

/// Deposit count per asset, keyed in ascending asset order.
fn asset_counts<'a>(records: &[&'a DepositRecord]) -> BTreeMap<&'a str, u64> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.asset.as_str()).or_insert(0u64) += 1;
    }
    counts
}

/// The asset with the highest count; ties go to the smallest asset id.
fn most_used<'a>(counts: &BTreeMap<&'a str, u64>) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    for (&asset, &count) in counts {
        match best {
            Some((_, c)) if c >= count => {}
            _ => best = Some((asset, count)),
        }
    }
    best.map(|(asset, _)| asset)
}

/// Herfindahl index of `counts`. An empty or all-zero input is 1 by convention.
pub fn herfindahl(counts: impl IntoIterator<Item = u64>) -> f64 {
    let (sum, sum_sq) = counts.into_iter().fold((0u128, 0u128), |(s, sq), c| {
        let c = c as u128;
        (s + c, sq + c * c)
    });
    if sum == 0 {
        return 1.0;
    }
    sum_sq as f64 / (sum * sum) as f64
}

impl FeatureComputer for AssetFeatureComputer {
    type Features = AssetFeatures;

    fn name(&self) -> &'static str {
        "asset"
    }

    fn compute(&self, deposits: &DepositSet) -> FeatureTable<AssetFeatures> {
        let total_distinct = deposits.distinct_asset_count();
        deposits
            .by_account()
            .into_iter()
            .map(|(account, records)| {
                (account.to_string(), Self::wallet_features(&records, total_distinct))
            })
            .collect()
    }
}
