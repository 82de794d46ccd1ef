//! Monetary features: deposit totals, averages, extrema and size stability.
//!
//! Missing amounts are skipped by every reduction, so a wallet whose USD
//! values all failed to parse has a zero total and `None` averages. A
//! reduction that overflows is reported as missing rather than infinite.

use trove_core::stats::{dispersion_consistency, max, mean, min, sample_std, sum};
use trove_core::traits::FeatureComputer;
use trove_core::types::{DepositRecord, DepositSet, FeatureTable, ValueFeatures};

/// Computes [`ValueFeatures`] for each wallet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFeatureComputer;

impl ValueFeatureComputer {
    pub fn new() -> Self {
        Self
    }

    pub fn wallet_features(records: &[&DepositRecord]) -> ValueFeatures {
        let amounts: Vec<f64> = records.iter().filter_map(|r| r.amount).collect();
        let usd: Vec<f64> = records.iter().filter_map(|r| r.amount_usd).collect();

        let avg_usd = mean(&usd);
        let std_usd = sample_std(&usd);

        ValueFeatures {
            total_deposit_amount: sum(&amounts),
            total_deposit_usd: sum(&usd),
            priced_deposits: usd.len() as u64,
            avg_deposit_amount: mean(&amounts),
            avg_deposit_usd: avg_usd,
            max_deposit_usd: max(&usd),
            min_deposit_usd: min(&usd),
            deposit_usd_std: std_usd,
            deposit_value_consistency: dispersion_consistency(std_usd, avg_usd),
        }
    }
}

impl FeatureComputer for ValueFeatureComputer {
    type Features = ValueFeatures;

    fn name(&self) -> &'static str {
        "value"
    }

    fn compute(&self, deposits: &DepositSet) -> FeatureTable<ValueFeatures> {
        deposits
            .by_account()
            .into_iter()
            .map(|(account, records)| (account.to_string(), Self::wallet_features(&records)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn deposit(amount: Option<f64>, usd: Option<f64>) -> DepositRecord {
        DepositRecord {
            account_id: "w".into(),
            asset: "a".into(),
            asset_symbol: "A".into(),
            amount,
            amount_usd: usd,
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            block_number: None,
            transaction_hash: String::new(),
        }
    }

    fn features(records: &[DepositRecord]) -> ValueFeatures {
        let refs: Vec<&DepositRecord> = records.iter().collect();
        ValueFeatureComputer::wallet_features(&refs)
    }

    #[test]
    fn aggregates_amounts() {
        let f = features(&[
            deposit(Some(1.0), Some(100.0)),
            deposit(Some(2.0), Some(200.0)),
            deposit(Some(3.0), Some(150.0)),
        ]);
        assert_eq!(f.total_deposit_amount, Some(6.0));
        assert_eq!(f.total_deposit_usd, Some(450.0));
        assert_eq!(f.priced_deposits, 3);
        assert_eq!(f.avg_deposit_amount, Some(2.0));
        assert_eq!(f.avg_deposit_usd, Some(150.0));
        assert_eq!(f.max_deposit_usd, Some(200.0));
        assert_eq!(f.min_deposit_usd, Some(100.0));
        assert_eq!(f.deposit_usd_std, Some(50.0));
        assert!((f.deposit_value_consistency - (1.0 - 50.0 / 150.0)).abs() < 1e-12);
    }

    #[test]
    fn single_deposit_consistency_is_zero() {
        let f = features(&[deposit(Some(1.0), Some(100.0))]);
        assert_eq!(f.deposit_usd_std, None);
        assert_eq!(f.deposit_value_consistency, 0.0);
        assert_eq!(f.max_deposit_usd, Some(100.0));
    }

    #[test]
    fn identical_sizes_are_fully_consistent() {
        let f = features(&[deposit(None, Some(10.0)), deposit(None, Some(10.0))]);
        assert_eq!(f.deposit_value_consistency, 1.0);
        assert_eq!(f.total_deposit_amount, Some(0.0));
        assert_eq!(f.avg_deposit_amount, None);
    }

    #[test]
    fn missing_usd_values_are_skipped() {
        let f = features(&[
            deposit(Some(1.0), None),
            deposit(Some(1.0), Some(40.0)),
            deposit(Some(1.0), Some(60.0)),
        ]);
        assert_eq!(f.total_deposit_usd, Some(100.0));
        assert_eq!(f.avg_deposit_usd, Some(50.0));
        assert_eq!(f.total_deposit_amount, Some(3.0));
        assert_eq!(f.priced_deposits, 2);
    }

    #[test]
    fn all_usd_missing() {
        let f = features(&[deposit(Some(1.0), None), deposit(Some(2.0), None)]);
        assert_eq!(f.total_deposit_usd, Some(0.0));
        assert_eq!(f.priced_deposits, 0);
        assert_eq!(f.avg_deposit_usd, None);
        assert_eq!(f.min_deposit_usd, None);
        assert_eq!(f.deposit_value_consistency, 0.0);
    }

    #[test]
    fn zero_mean_is_guarded() {
        let f = features(&[deposit(None, Some(0.0)), deposit(None, Some(0.0))]);
        assert_eq!(f.deposit_value_consistency, 0.0);
    }

    #[test]
    fn overflowing_usd_is_missing() {
        let f = features(&[deposit(Some(1.0), Some(1e308)), deposit(Some(1.0), Some(1e308))]);
        assert_eq!(f.total_deposit_usd, None);
        assert_eq!(f.avg_deposit_usd, None);
        assert_eq!(f.deposit_usd_std, None);
        assert_eq!(f.max_deposit_usd, Some(1e308));
        assert_eq!(f.priced_deposits, 2);
        assert_eq!(f.deposit_value_consistency, 0.0);
        assert_eq!(f.total_deposit_amount, Some(2.0));
    }
}
