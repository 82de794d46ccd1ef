//! Temporal features: how long and how regularly a wallet has deposited.

use chrono::{DateTime, Utc};
use trove_core::constants::SECONDS_PER_DAY;
use trove_core::stats::{dispersion_consistency, mean, sample_std};
use trove_core::traits::FeatureComputer;
use trove_core::types::{DepositSet, FeatureTable, TimeFeatures};

/// Computes [`TimeFeatures`] for each wallet.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeFeatureComputer;

impl TimeFeatureComputer {
    pub fn new() -> Self {
        Self
    }

    /// Features for a single wallet's deposit timestamps (any order).
    ///
    /// Returns `None` for an empty slice; grouping never produces one.
    pub fn wallet_features(timestamps: &[DateTime<Utc>]) -> Option<TimeFeatures> {
        let mut sorted = timestamps.to_vec();
        sorted.sort();
        let first = *sorted.first()?;
        let last = *sorted.last()?;

        let timespan_days = (last - first).num_seconds() as f64 / SECONDS_PER_DAY;
        let count = sorted.len() as u64;

        Some(TimeFeatures {
            first_deposit_time: first,
            last_deposit_time: last,
            deposit_timespan_days: timespan_days,
            total_deposits_count: count,
            avg_days_between_deposits: avg_days_between(timespan_days, count),
            deposit_consistency: cadence_consistency(&sorted),
        })
    }
}

/// Span divided by deposit count; 0 when there are no deposits.
pub fn avg_days_between(timespan_days: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    timespan_days / count as f64
}

/// `1 - std/mean` of the gaps between consecutive sorted timestamps.
///
/// Fewer than two gaps leave the sample deviation undefined and yield 0, as do
/// zero-mean gaps. The result is not clipped and can be negative.
pub fn cadence_consistency(sorted: &[DateTime<Utc>]) -> f64 {
    if sorted.len() < 2 {
        return 0.0;
    }
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64)
        .collect();
    dispersion_consistency(sample_std(&gaps), mean(&gaps))
}

impl FeatureComputer for TimeFeatureComputer {
    type Features = TimeFeatures;

    fn name(&self) -> &'static str {
        "time"
    }

    fn compute(&self, deposits: &DepositSet) -> FeatureTable<TimeFeatures> {
        deposits
            .by_account()
            .into_iter()
            .filter_map(|(account, records)| {
                let timestamps: Vec<_> = records.iter().map(|r| r.timestamp).collect();
                Self::wallet_features(&timestamps).map(|f| (account.to_string(), f))
            })
            .collect()
    }
}
