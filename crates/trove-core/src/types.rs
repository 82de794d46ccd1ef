//! Core data types: deposit records, per-domain feature rows, wallet vectors.
//!
//! Monetary values are `f64` USD or native asset units. Values that failed to
//! parse upstream are carried as `None` rather than a sentinel number.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Per-wallet table keyed by `account_id`. Ordered so every iteration is deterministic.
pub type FeatureTable<T> = BTreeMap<String, T>;

/// A single inbound deposit, flattened from a raw transaction file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DepositRecord {
    /// Depositing wallet. Never empty inside a [`DepositSet`].
    pub account_id: String,
    /// Asset identifier (usually the token contract or market id).
    pub asset: String,
    pub asset_symbol: String,
    /// Quantity in native asset units.
    pub amount: Option<f64>,
    /// USD value at deposit time.
    pub amount_usd: Option<f64>,
    /// Block time, second precision.
    pub timestamp: DateTime<Utc>,
    pub block_number: Option<u64>,
    pub transaction_hash: String,
}

/// Validated collection of deposits.
///
/// Construction rejects empty account ids, so every grouped view has a
/// usable wallet key.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(try_from = "Vec<DepositRecord>", into = "Vec<DepositRecord>")]
pub struct DepositSet {
    records: Vec<DepositRecord>,
}

impl DepositSet {
    /// Wrap `records`, rejecting any record whose `account_id` is empty.
    pub fn new(records: Vec<DepositRecord>) -> Result<Self, FeatureError> {
        if let Some(index) = records.iter().position(|r| r.account_id.is_empty()) {
            return Err(FeatureError::EmptyAccountId { index });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DepositRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group deposits by wallet, preserving input order inside each group.
    pub fn by_account(&self) -> BTreeMap<&str, Vec<&DepositRecord>> {
        let mut groups: BTreeMap<&str, Vec<&DepositRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.account_id.as_str()).or_default().push(record);
        }
        groups
    }

    /// Number of distinct asset identifiers across the whole dataset.
    pub fn distinct_asset_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.asset.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl TryFrom<Vec<DepositRecord>> for DepositSet {
    type Error = FeatureError;

    fn try_from(records: Vec<DepositRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<DepositSet> for Vec<DepositRecord> {
    fn from(set: DepositSet) -> Self {
        set.records
    }
}

/// Temporal aggregates for one wallet.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimeFeatures {
    pub first_deposit_time: DateTime<Utc>,
    pub last_deposit_time: DateTime<Utc>,
    pub deposit_timespan_days: f64,
    pub total_deposits_count: u64,
    pub avg_days_between_deposits: f64,
    /// `1 - std/mean` of inter-arrival gaps. Unclipped: may be negative.
    pub deposit_consistency: f64,
}

/// Monetary aggregates for one wallet.
///
/// Averages and extrema are `None` when the wallet has no parseable value.
/// Any aggregate that overflows `f64` is `None` as well.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValueFeatures {
    pub total_deposit_amount: Option<f64>,
    pub total_deposit_usd: Option<f64>,
    /// Deposits with a parseable USD value.
    pub priced_deposits: u64,
    pub avg_deposit_amount: Option<f64>,
    pub avg_deposit_usd: Option<f64>,
    pub max_deposit_usd: Option<f64>,
    pub min_deposit_usd: Option<f64>,
    /// Sample standard deviation; `None` below two parseable values.
    pub deposit_usd_std: Option<f64>,
    pub deposit_value_consistency: f64,
}

/// Asset diversity and concentration for one wallet.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssetFeatures {
    pub unique_assets_count: u64,
    pub unique_assets_ratio: f64,
    pub most_used_asset: String,
    /// Herfindahl index of per-asset deposit counts, in `(0, 1]`.
    pub asset_concentration: f64,
}

/// The bounded sub-scores and composite for one wallet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct ComponentScores {
    pub activity_score: f64,
    pub value_score: f64,
    pub longevity_score: f64,
    pub final_score: f64,
}

/// One scored row of the wallet feature table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WalletFeatureVector {
    pub account_id: String,
    // temporal
    pub first_deposit_time: Option<DateTime<Utc>>,
    pub last_deposit_time: Option<DateTime<Utc>>,
    pub deposit_timespan_days: f64,
    pub total_deposits_count: u64,
    pub avg_days_between_deposits: f64,
    pub deposit_consistency: f64,
    // monetary
    pub total_deposit_amount: f64,
    pub total_deposit_usd: f64,
    pub avg_deposit_amount: f64,
    pub avg_deposit_usd: f64,
    pub max_deposit_usd: f64,
    pub min_deposit_usd: f64,
    pub deposit_usd_std: f64,
    pub deposit_value_consistency: f64,
    // asset
    pub unique_assets_count: u64,
    pub unique_assets_ratio: f64,
    pub most_used_asset: String,
    pub asset_concentration: f64,
    // scores
    pub activity_score: f64,
    pub value_score: f64,
    pub longevity_score: f64,
    pub final_score: f64,
}

impl WalletFeatureVector {
    /// First numeric field that is NaN or infinite. JSON has no encoding
    /// for those, so such a row cannot be persisted and read back.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("deposit_timespan_days", self.deposit_timespan_days),
            ("avg_days_between_deposits", self.avg_days_between_deposits),
            ("deposit_consistency", self.deposit_consistency),
            ("total_deposit_amount", self.total_deposit_amount),
            ("total_deposit_usd", self.total_deposit_usd),
            ("avg_deposit_amount", self.avg_deposit_amount),
            ("avg_deposit_usd", self.avg_deposit_usd),
            ("max_deposit_usd", self.max_deposit_usd),
            ("min_deposit_usd", self.min_deposit_usd),
            ("deposit_usd_std", self.deposit_usd_std),
            ("deposit_value_consistency", self.deposit_value_consistency),
            ("unique_assets_ratio", self.unique_assets_ratio),
            ("asset_concentration", self.asset_concentration),
            ("activity_score", self.activity_score),
            ("value_score", self.value_score),
            ("longevity_score", self.longevity_score),
            ("final_score", self.final_score),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Input row for the alternative risk-adjusted scorer.
///
/// Uses a transaction-level schema unrelated to [`WalletFeatureVector`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct RiskFeatureRow {
    #[serde(rename = "from")]
    pub wallet_address: String,
    pub tx_count: Option<f64>,
    pub tx_frequency: Option<f64>,
    pub total_value: Option<f64>,
    pub avg_value: Option<f64>,
    pub unique_contracts: Option<f64>,
    pub wallet_age_days: Option<f64>,
    pub value_std: Option<f64>,
    pub std_time_between_tx: Option<f64>,
    pub avg_gas_cost: Option<f64>,
    pub total_gas_cost: Option<f64>,
}

/// Output row of the alternative scorer, score in `[0, 100]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WalletScore {
    pub wallet_address: String,
    pub score: f64,
}
