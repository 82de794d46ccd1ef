//! Injectable scoring configuration.
//!
//! Every weight and saturation threshold used by the scorers lives here with a
//! `Default` carrying the production constants. Scoring functions take these
//! structs by reference, so tests can override any threshold locally.
//! All structs deserialize with `#[serde(default)]`, letting a config file set
//! only the fields it cares about.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// How missing merged values are treated before scoring.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Replace every missing numeric value with 0 and keep the wallet.
    #[default]
    ZeroFill,
    /// Drop any wallet that has at least one missing value.
    Exclude,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ActivityWeights {
    pub deposit_count: f64,
    pub consistency: f64,
    pub asset_diversity: f64,
}

impl Default for ActivityWeights {
    fn default() -> Self {
        Self {
            deposit_count: ACTIVITY_COUNT_WEIGHT,
            consistency: ACTIVITY_CONSISTENCY_WEIGHT,
            asset_diversity: ACTIVITY_DIVERSITY_WEIGHT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ValueWeights {
    pub total_usd: f64,
    pub consistency: f64,
    /// Weight on `1 - asset_concentration`.
    pub asset_spread: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self {
            total_usd: VALUE_VOLUME_WEIGHT,
            consistency: VALUE_CONSISTENCY_WEIGHT,
            asset_spread: VALUE_SPREAD_WEIGHT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LongevityWeights {
    pub timespan: f64,
    pub avg_gap: f64,
}

impl Default for LongevityWeights {
    fn default() -> Self {
        Self {
            timespan: LONGEVITY_SPAN_WEIGHT,
            avg_gap: LONGEVITY_CADENCE_WEIGHT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CompositeWeights {
    pub activity: f64,
    pub value: f64,
    pub longevity: f64,
    /// Multiplier applied after weighting; 100 yields a `[0, 100]` score.
    pub scale: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            activity: COMPOSITE_ACTIVITY_WEIGHT,
            value: COMPOSITE_VALUE_WEIGHT,
            longevity: COMPOSITE_LONGEVITY_WEIGHT,
            scale: FINAL_SCORE_SCALE,
        }
    }
}

/// Fixed caps beyond which a raw feature earns no additional credit.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SaturationThresholds {
    pub deposit_count: f64,
    pub total_usd: f64,
    pub timespan_days: f64,
    pub avg_gap_days: f64,
}

impl Default for SaturationThresholds {
    fn default() -> Self {
        Self {
            deposit_count: DEPOSIT_COUNT_CAP,
            total_usd: DEPOSIT_USD_CAP,
            timespan_days: TIMESPAN_DAYS_CAP,
            avg_gap_days: AVG_GAP_DAYS_CAP,
        }
    }
}

/// Configuration for the primary (feature combiner) scoring path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub activity: ActivityWeights,
    pub value: ValueWeights,
    pub longevity: LongevityWeights,
    pub composite: CompositeWeights,
    pub saturation: SaturationThresholds,
    pub missing_values: MissingValuePolicy,
    /// Size of the persisted top-wallets view.
    pub top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            activity: ActivityWeights::default(),
            value: ValueWeights::default(),
            longevity: LongevityWeights::default(),
            composite: CompositeWeights::default(),
            saturation: SaturationThresholds::default(),
            missing_values: MissingValuePolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ScoringConfig {
    /// Reject negative or non-finite weights and non-positive caps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("activity.deposit_count", self.activity.deposit_count),
            ("activity.consistency", self.activity.consistency),
            ("activity.asset_diversity", self.activity.asset_diversity),
            ("value.total_usd", self.value.total_usd),
            ("value.consistency", self.value.consistency),
            ("value.asset_spread", self.value.asset_spread),
            ("longevity.timespan", self.longevity.timespan),
            ("longevity.avg_gap", self.longevity.avg_gap),
            ("composite.activity", self.composite.activity),
            ("composite.value", self.composite.value),
            ("composite.longevity", self.composite.longevity),
            ("composite.scale", self.composite.scale),
        ];
        check_weights(&weights)?;

        let caps = [
            ("saturation.deposit_count", self.saturation.deposit_count),
            ("saturation.total_usd", self.saturation.total_usd),
            ("saturation.timespan_days", self.saturation.timespan_days),
            ("saturation.avg_gap_days", self.saturation.avg_gap_days),
        ];
        for (name, value) in caps {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidCap { name, value });
            }
        }

        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        Ok(())
    }
}

/// Weights over the min-max normalized base-score columns.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BaseWeights {
    pub tx_count: f64,
    pub tx_frequency: f64,
    pub total_value: f64,
    pub avg_value: f64,
    pub unique_contracts: f64,
    pub wallet_age_days: f64,
}

impl Default for BaseWeights {
    fn default() -> Self {
        Self {
            tx_count: BASE_TX_COUNT_WEIGHT,
            tx_frequency: BASE_TX_FREQUENCY_WEIGHT,
            total_value: BASE_TOTAL_VALUE_WEIGHT,
            avg_value: BASE_AVG_VALUE_WEIGHT,
            unique_contracts: BASE_UNIQUE_CONTRACTS_WEIGHT,
            wallet_age_days: BASE_WALLET_AGE_WEIGHT,
        }
    }
}

/// Weights over the min-max normalized risk-indicator columns.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
    pub value_std: f64,
    pub std_time_between_tx: f64,
    pub avg_gas_cost: f64,
    pub total_gas_cost: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            value_std: RISK_VALUE_STD_WEIGHT,
            std_time_between_tx: RISK_TIMING_STD_WEIGHT,
            avg_gas_cost: RISK_AVG_GAS_WEIGHT,
            total_gas_cost: RISK_TOTAL_GAS_WEIGHT,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.value_std + self.std_time_between_tx + self.avg_gas_cost + self.total_gas_cost
    }
}

/// Slack for floating-point rounding when summing risk weights.
const RISK_WEIGHT_TOLERANCE: f64 = 1e-9;

/// Configuration for the alternative risk-adjusted scorer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RiskScorerConfig {
    pub base: BaseWeights,
    pub risk: RiskWeights,
    pub missing_values: MissingValuePolicy,
    pub top_n: usize,
}

impl Default for RiskScorerConfig {
    fn default() -> Self {
        Self {
            base: BaseWeights::default(),
            risk: RiskWeights::default(),
            missing_values: MissingValuePolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl RiskScorerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weights(&[
            ("base.tx_count", self.base.tx_count),
            ("base.tx_frequency", self.base.tx_frequency),
            ("base.total_value", self.base.total_value),
            ("base.avg_value", self.base.avg_value),
            ("base.unique_contracts", self.base.unique_contracts),
            ("base.wallet_age_days", self.base.wallet_age_days),
            ("risk.value_std", self.risk.value_std),
            ("risk.std_time_between_tx", self.risk.std_time_between_tx),
            ("risk.avg_gas_cost", self.risk.avg_gas_cost),
            ("risk.total_gas_cost", self.risk.total_gas_cost),
        ])?;
        // risk must stay in [0, 1] for `1 - risk` to act as a penalty
        let sum = self.risk.sum();
        if sum > 1.0 + RISK_WEIGHT_TOLERANCE {
            return Err(ConfigError::RiskWeightsExceedOne { sum });
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        Ok(())
    }
}

fn check_weights(weights: &[(&'static str, f64)]) -> Result<(), ConfigError> {
    for &(name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidWeight { name, value });
        }
    }
    Ok(())
}
