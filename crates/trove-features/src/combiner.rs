//! Feature merge and composite scoring.
//!
//! The three per-domain tables are outer-joined on `account_id`; gaps are
//! resolved by the configured [`MissingValuePolicy`]. Each wallet then gets:
//!
//! ```text
//! activity  = w_c * clip(count, 0, C)/C + w_k * clip(consistency, 0, 1) + w_d * clip(ratio, 0, 1)
//! value     = w_v * clip(usd, 0, U)/U   + w_k * clip(value_consistency, 0, 1) + w_s * (1 - concentration)
//! longevity = w_t * clip(span, 0, S)/S  + w_g * clip(avg_gap, 0, G)/G
//! final     = scale * (a * activity + v * value + l * longevity)
//! ```
//!
//! Sub-scores are clamped to `[0, 1]` and `final` to `[0, scale]`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use tracing::{debug, info, warn};
use trove_core::config::{MissingValuePolicy, ScoringConfig};
use trove_core::types::{
    AssetFeatures, ComponentScores, FeatureTable, TimeFeatures, ValueFeatures, WalletFeatureVector,
};

/// One wallet's rows from each domain table, any of which may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedWallet {
    pub account_id: String,
    pub time: Option<TimeFeatures>,
    pub value: Option<ValueFeatures>,
    pub asset: Option<AssetFeatures>,
}

impl MergedWallet {
    /// True when every domain row is present and no numeric value is missing.
    ///
    /// A `None` std is only missing when two or more priced deposits exist;
    /// below that it is undefined rather than lost.
    pub fn is_complete(&self) -> bool {
        let value_complete = self.value.as_ref().is_some_and(|v| {
            v.total_deposit_amount.is_some()
                && v.total_deposit_usd.is_some()
                && v.avg_deposit_amount.is_some()
                && v.avg_deposit_usd.is_some()
                && v.max_deposit_usd.is_some()
                && v.min_deposit_usd.is_some()
                && (v.deposit_usd_std.is_some() || v.priced_deposits < 2)
        });
        self.time.is_some() && self.asset.is_some() && value_complete
    }
}

/// Merges per-domain feature tables and scores each wallet.
#[derive(Debug, Clone, Default)]
pub struct FeatureCombiner {
    config: ScoringConfig,
}

impl FeatureCombiner {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Outer join of the three tables, ordered by `account_id`.
    pub fn merge(
        time: &FeatureTable<TimeFeatures>,
        value: &FeatureTable<ValueFeatures>,
        asset: &FeatureTable<AssetFeatures>,
    ) -> Vec<MergedWallet> {
        let accounts: BTreeSet<&String> = time.keys().chain(value.keys()).chain(asset.keys()).collect();
        accounts
            .into_iter()
            .map(|account| MergedWallet {
                account_id: account.clone(),
                time: time.get(account).cloned(),
                value: value.get(account).cloned(),
                asset: asset.get(account).cloned(),
            })
            .collect()
    }

    /// Resolve gaps under `policy`, returning an unscored vector or `None`
    /// when the wallet is excluded.
    pub fn fill(merged: MergedWallet, policy: MissingValuePolicy) -> Option<WalletFeatureVector> {
        if policy == MissingValuePolicy::Exclude && !merged.is_complete() {
            return None;
        }

        let MergedWallet { account_id, time, value, asset } = merged;
        let zero = |v: Option<f64>| v.unwrap_or(0.0);

        Some(WalletFeatureVector {
            account_id,
            first_deposit_time: time.as_ref().map(|t| t.first_deposit_time),
            last_deposit_time: time.as_ref().map(|t| t.last_deposit_time),
            deposit_timespan_days: time.as_ref().map_or(0.0, |t| t.deposit_timespan_days),
            total_deposits_count: time.as_ref().map_or(0, |t| t.total_deposits_count),
            avg_days_between_deposits: time.as_ref().map_or(0.0, |t| t.avg_days_between_deposits),
            deposit_consistency: time.as_ref().map_or(0.0, |t| t.deposit_consistency),
            total_deposit_amount: zero(value.as_ref().and_then(|v| v.total_deposit_amount)),
            total_deposit_usd: zero(value.as_ref().and_then(|v| v.total_deposit_usd)),
            avg_deposit_amount: zero(value.as_ref().and_then(|v| v.avg_deposit_amount)),
            avg_deposit_usd: zero(value.as_ref().and_then(|v| v.avg_deposit_usd)),
            max_deposit_usd: zero(value.as_ref().and_then(|v| v.max_deposit_usd)),
            min_deposit_usd: zero(value.as_ref().and_then(|v| v.min_deposit_usd)),
            deposit_usd_std: zero(value.as_ref().and_then(|v| v.deposit_usd_std)),
            deposit_value_consistency: value.as_ref().map_or(0.0, |v| v.deposit_value_consistency),
            unique_assets_count: asset.as_ref().map_or(0, |a| a.unique_assets_count),
            unique_assets_ratio: asset.as_ref().map_or(0.0, |a| a.unique_assets_ratio),
            most_used_asset: asset.as_ref().map(|a| a.most_used_asset.clone()).unwrap_or_default(),
            asset_concentration: asset.as_ref().map_or(0.0, |a| a.asset_concentration),
            activity_score: 0.0,
            value_score: 0.0,
            longevity_score: 0.0,
            final_score: 0.0,
        })
    }

    pub fn activity_score(&self, v: &WalletFeatureVector) -> f64 {
        let w = &self.config.activity;
        let cap = self.config.saturation.deposit_count;
        let score = w.deposit_count * saturate(v.total_deposits_count as f64, cap)
            + w.consistency * clip_unit(v.deposit_consistency)
            + w.asset_diversity * clip_unit(v.unique_assets_ratio);
        clip_unit(score)
    }

    pub fn value_score(&self, v: &WalletFeatureVector) -> f64 {
        let w = &self.config.value;
        let cap = self.config.saturation.total_usd;
        let score = w.total_usd * saturate(v.total_deposit_usd, cap)
            + w.consistency * clip_unit(v.deposit_value_consistency)
            + w.asset_spread * clip_unit(1.0 - v.asset_concentration);
        clip_unit(score)
    }

    pub fn longevity_score(&self, v: &WalletFeatureVector) -> f64 {
        let w = &self.config.longevity;
        let sat = &self.config.saturation;
        let score = w.timespan * saturate(v.deposit_timespan_days, sat.timespan_days)
            + w.avg_gap * saturate(v.avg_days_between_deposits, sat.avg_gap_days);
        clip_unit(score)
    }

    /// All three sub-scores and the composite for one vector.
    pub fn component_scores(&self, v: &WalletFeatureVector) -> ComponentScores {
        let activity = self.activity_score(v);
        let value = self.value_score(v);
        let longevity = self.longevity_score(v);

        let c = &self.config.composite;
        let weighted = c.activity * activity + c.value * value + c.longevity * longevity;
        let final_score = (c.scale * weighted).clamp(0.0, c.scale);

        ComponentScores {
            activity_score: activity,
            value_score: value,
            longevity_score: longevity,
            final_score,
        }
    }

    /// Write the component scores into `v`.
    pub fn score(&self, v: &mut WalletFeatureVector) {
        let s = self.component_scores(v);
        v.activity_score = s.activity_score;
        v.value_score = s.value_score;
        v.longevity_score = s.longevity_score;
        v.final_score = s.final_score;
    }

    /// Merge, fill and score. Output is ordered by `account_id`.
    pub fn combine(
        &self,
        time: &FeatureTable<TimeFeatures>,
        value: &FeatureTable<ValueFeatures>,
        asset: &FeatureTable<AssetFeatures>,
    ) -> Vec<WalletFeatureVector> {
        let merged = Self::merge(time, value, asset);
        let total = merged.len();
        let policy = self.config.missing_values;

        let mut rows: Vec<WalletFeatureVector> = merged
            .into_iter()
            .filter_map(|m| {
                let account = m.account_id.clone();
                let filled = Self::fill(m, policy);
                if filled.is_none() {
                    debug!(account = %account, "combiner: wallet excluded for missing values");
                }
                filled
            })
            .collect();

        for row in &mut rows {
            self.score(row);
        }

        let excluded = total - rows.len();
        if excluded > 0 {
            warn!(excluded, ?policy, "combiner: wallets dropped by missing-value policy");
        }
        info!(wallets = rows.len(), "combiner: scored wallets");
        rows
    }
}

/// Rank by `final_score` descending, ties by `account_id` ascending, keep `n`.
pub fn rank_by_final_score(rows: &[WalletFeatureVector], n: usize) -> Vec<WalletFeatureVector> {
    let mut ranked: Vec<&WalletFeatureVector> = rows.iter().collect();
    ranked.sort_by(|a, b| compare_desc(a, b));
    ranked.into_iter().take(n).cloned().collect()
}

fn compare_desc(a: &WalletFeatureVector, b: &WalletFeatureVector) -> Ordering {
    OrderedFloat(b.final_score)
        .cmp(&OrderedFloat(a.final_score))
        .then_with(|| a.account_id.cmp(&b.account_id))
}

/// `clip(x, 0, cap) / cap`.
fn saturate(x: f64, cap: f64) -> f64 {
    x.clamp(0.0, cap) / cap
}

fn clip_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use trove_core::config::SaturationThresholds;

    fn vector(account: &str) -> WalletFeatureVector {
        FeatureCombiner::fill(
            MergedWallet { account_id: account.into(), time: None, value: None, asset: None },
            MissingValuePolicy::ZeroFill,
        )
        .unwrap()
    }

    fn time_row(count: u64) -> TimeFeatures {
        let t = Utc.timestamp_opt(0, 0).unwrap();
        TimeFeatures {
            first_deposit_time: t,
            last_deposit_time: t,
            deposit_timespan_days: 0.0,
            total_deposits_count: count,
            avg_days_between_deposits: 0.0,
            deposit_consistency: 0.0,
        }
    }

    fn value_row(total_usd: f64, std: Option<f64>) -> ValueFeatures {
        ValueFeatures {
            total_deposit_amount: Some(1.0),
            total_deposit_usd: Some(total_usd),
            priced_deposits: 2,
            avg_deposit_amount: Some(1.0),
            avg_deposit_usd: Some(total_usd),
            max_deposit_usd: Some(total_usd),
            min_deposit_usd: Some(total_usd),
            deposit_usd_std: std,
            deposit_value_consistency: 0.0,
        }
    }

    fn asset_row() -> AssetFeatures {
        AssetFeatures {
            unique_assets_count: 1,
            unique_assets_ratio: 1.0,
            most_used_asset: "A".into(),
            asset_concentration: 1.0,
        }
    }

    #[test]
    fn activity_formula() {
        let c = FeatureCombiner::default();
        let mut v = vector("w");
        v.total_deposits_count = 3;
        v.deposit_consistency = 1.0;
        v.unique_assets_ratio = 1.0;
        assert!((c.activity_score(&v) - 0.612).abs() < 1e-12);
    }

    #[test]
    fn value_formula() {
        let c = FeatureCombiner::default();
        let mut v = vector("w");
        v.total_deposit_usd = 5_000.0;
        v.deposit_value_consistency = 0.5;
        v.asset_concentration = 0.625;
        let expected = 0.4 * 0.5 + 0.3 * 0.5 + 0.3 * 0.375;
        assert!((c.value_score(&v) - expected).abs() < 1e-12);
    }

    #[test]
    fn longevity_formula() {
        let c = FeatureCombiner::default();
        let mut v = vector("w");
        v.deposit_timespan_days = 73.0;
        v.avg_days_between_deposits = 15.0;
        let expected = 0.6 * 0.2 + 0.4 * 0.5;
        assert!((c.longevity_score(&v) - expected).abs() < 1e-12);
    }

    #[test]
    fn usd_beyond_cap_earns_nothing_more() {
        let c = FeatureCombiner::default();
        let mut at_cap = vector("w");
        at_cap.total_deposit_usd = 10_000.0;
        at_cap.asset_concentration = 1.0;
        let mut beyond = at_cap.clone();
        beyond.total_deposit_usd = 1_000_000.0;
        assert_eq!(c.value_score(&at_cap), c.value_score(&beyond));
        assert!((c.value_score(&beyond) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn negative_consistency_clipped() {
        let c = FeatureCombiner::default();
        let mut v = vector("w");
        v.deposit_consistency = -4.0;
        v.asset_concentration = 1.0;
        assert_eq!(c.activity_score(&v), 0.0);
    }

    #[test]
    fn injected_thresholds_apply() {
        let cfg = ScoringConfig {
            saturation: SaturationThresholds { total_usd: 100.0, ..Default::default() },
            ..Default::default()
        };
        let c = FeatureCombiner::new(cfg);
        let mut v = vector("w");
        v.total_deposit_usd = 50.0;
        v.asset_concentration = 1.0;
        assert!((c.value_score(&v) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn final_score_composition() {
        let c = FeatureCombiner::default();
        let mut v = vector("w");
        v.total_deposits_count = 100;
        v.deposit_consistency = 1.0;
        v.unique_assets_ratio = 1.0;
        v.total_deposit_usd = 10_000.0;
        v.deposit_value_consistency = 1.0;
        v.asset_concentration = 0.0;
        v.deposit_timespan_days = 365.0;
        v.avg_days_between_deposits = 30.0;
        let s = c.component_scores(&v);
        assert_eq!(s.activity_score, 1.0);
        assert_eq!(s.value_score, 1.0);
        assert_eq!(s.longevity_score, 1.0);
        assert!((s.final_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fill_keeps_signal_free_wallet() {
        let v = vector("ghost");
        assert_eq!(v.total_deposits_count, 0);
        assert_eq!(v.first_deposit_time, None);
        assert_eq!(v.most_used_asset, "");
        let s = FeatureCombiner::default().component_scores(&v);
        // missing concentration fills to 0, so only the spread term contributes
        assert!((s.value_score - 0.3).abs() < 1e-12);
        assert_eq!(s.activity_score, 0.0);
    }

    #[test]
    fn merge_is_outer_join() {
        let mut time = FeatureTable::new();
        time.insert("a".to_string(), time_row(1));
        let mut value = FeatureTable::new();
        value.insert("b".to_string(), value_row(10.0, None));
        let asset = FeatureTable::new();
        let merged = FeatureCombiner::merge(&time, &value, &asset);
        let ids: Vec<_> = merged.iter().map(|m| m.account_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(merged[0].value.is_none());
        assert!(merged[1].time.is_none());
    }

    #[test]
    fn exclude_policy_drops_incomplete_wallets() {
        let mut time = FeatureTable::new();
        let mut value = FeatureTable::new();
        let mut asset = FeatureTable::new();
        for id in ["full", "partial"] {
            time.insert(id.to_string(), time_row(2));
            asset.insert(id.to_string(), asset_row());
        }
        value.insert("full".to_string(), value_row(10.0, Some(1.0)));
        value.insert("partial".to_string(), value_row(10.0, None));

        let cfg = ScoringConfig { missing_values: MissingValuePolicy::Exclude, ..Default::default() };
        let rows = FeatureCombiner::new(cfg).combine(&time, &value, &asset);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account_id, "full");

        let rows = FeatureCombiner::default().combine(&time, &value, &asset);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].deposit_usd_std, 0.0);
    }

    #[test]
    fn exclude_policy_keeps_single_priced_deposit() {
        let mut time = FeatureTable::new();
        let mut value = FeatureTable::new();
        let mut asset = FeatureTable::new();
        for id in ["pair", "solo"] {
            time.insert(id.to_string(), time_row(1));
            asset.insert(id.to_string(), asset_row());
        }
        value.insert("pair".to_string(), value_row(84.0, Some(0.0)));
        value.insert("solo".to_string(), ValueFeatures { priced_deposits: 1, ..value_row(42.0, None) });

        let cfg = ScoringConfig { missing_values: MissingValuePolicy::Exclude, ..Default::default() };
        let rows = FeatureCombiner::new(cfg).combine(&time, &value, &asset);
        let ids: Vec<_> = rows.iter().map(|w| w.account_id.as_str()).collect();
        assert_eq!(ids, vec!["pair", "solo"]);
        assert_eq!(rows[1].deposit_usd_std, 0.0);
    }

    #[test]
    fn overflowed_totals_are_missing() {
        let mut time = FeatureTable::new();
        let mut value = FeatureTable::new();
        let mut asset = FeatureTable::new();
        time.insert("big".to_string(), time_row(2));
        asset.insert("big".to_string(), asset_row());
        value.insert("big".to_string(), ValueFeatures { total_deposit_usd: None, ..value_row(1e308, Some(0.0)) });

        let cfg = ScoringConfig { missing_values: MissingValuePolicy::Exclude, ..Default::default() };
        assert!(FeatureCombiner::new(cfg).combine(&time, &value, &asset).is_empty());

        let rows = FeatureCombiner::default().combine(&time, &value, &asset);
        assert_eq!(rows[0].total_deposit_usd, 0.0);
        assert!(rows[0].final_score.is_finite());
    }

    #[test]
    fn empty_tables_combine_to_empty() {
        let rows = FeatureCombiner::default().combine(
            &FeatureTable::new(),
            &FeatureTable::new(),
            &FeatureTable::new(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn ranking_breaks_ties_by_account() {
        let mut a = vector("b");
        a.final_score = 50.0;
        let mut b = vector("a");
        b.final_score = 50.0;
        let mut c = vector("c");
        c.final_score = 90.0;
        let ranked = rank_by_final_score(&[a, b, c], 2);
        let ids: Vec<_> = ranked.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    proptest! {
        #[test]
        fn scores_always_bounded(
            count in 0u64..10_000,
            consistency in -50.0f64..2.0,
            ratio in 0.0f64..1.0,
            usd in -1e3f64..1e9,
            value_consistency in -50.0f64..2.0,
            concentration in 0.0f64..=1.0,
            span in 0.0f64..5_000.0,
            gap in 0.0f64..5_000.0,
        ) {
            let mut v = vector("w");
            v.total_deposits_count = count;
            v.deposit_consistency = consistency;
            v.unique_assets_ratio = ratio;
            v.total_deposit_usd = usd;
            v.deposit_value_consistency = value_consistency;
            v.asset_concentration = concentration;
            v.deposit_timespan_days = span;
            v.avg_days_between_deposits = gap;
            let s = FeatureCombiner::default().component_scores(&v);
            for sub in [s.activity_score, s.value_score, s.longevity_score] {
                prop_assert!((0.0..=1.0).contains(&sub));
            }
            prop_assert!((0.0..=100.0).contains(&s.final_score));
        }
    }
}
