//! Risk-adjusted scorer.
//!
//! ```text
//! base  = sum_j w_j * minmax(base_col_j)
//! risk  = sum_k r_k * minmax(risk_col_k)
//! score = 100 * minmax(base * (1 - risk))
//! ```
//!
//! Risk is a multiplicative penalty: a wallet whose risk approaches 1 is
//! driven toward 0 whatever its base score.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use tracing::{info, warn};
use trove_core::config::{MissingValuePolicy, RiskScorerConfig};
use trove_core::constants::RISK_SCORE_SCALE;
use trove_core::error::ConfigError;
use trove_core::types::{RiskFeatureRow, WalletScore};

use crate::normalize::min_max_normalize;

/// Per-wallet intermediate values, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWallet {
    pub wallet_address: String,
    pub base_score: f64,
    pub risk_score: f64,
    /// Final score in `[0, 100]`.
    pub score: f64,
}

/// A row after missing-value resolution: base columns then risk columns.
struct FilledRow<'a> {
    wallet: &'a str,
    base: [f64; 6],
    risk: [f64; 4],
}

/// Stateless scorer; each call is a pure function of its input population.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: RiskScorerConfig,
}

impl RiskScorer {
    pub fn new(config: RiskScorerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskScorerConfig {
        &self.config
    }

    /// Score every row that survives the missing-value policy.
    pub fn score_all(&self, rows: &[RiskFeatureRow]) -> Vec<ScoredWallet> {
        let filled: Vec<FilledRow<'_>> = rows
            .iter()
            .filter_map(|r| fill(r, self.config.missing_values))
            .collect();

        let dropped = rows.len() - filled.len();
        if dropped > 0 {
            warn!(dropped, "risk: rows dropped by missing-value policy");
        }
        if filled.is_empty() {
            return Vec::new();
        }

        let base_w = &self.config.base;
        let base_weights = [
            base_w.tx_count,
            base_w.tx_frequency,
            base_w.total_value,
            base_w.avg_value,
            base_w.unique_contracts,
            base_w.wallet_age_days,
        ];
        let risk_w = &self.config.risk;
        let risk_weights = [
            risk_w.value_std,
            risk_w.std_time_between_tx,
            risk_w.avg_gas_cost,
            risk_w.total_gas_cost,
        ];

        let base = weighted_normalized_sum(&filled, |r| &r.base, &base_weights);
        let risk = weighted_normalized_sum(&filled, |r| &r.risk, &risk_weights);

        let adjusted: Vec<f64> = base.iter().zip(&risk).map(|(b, r)| b * (1.0 - r)).collect();
        let scaled = min_max_normalize(&adjusted);

        filled
            .iter()
            .zip(base.iter().zip(&risk))
            .zip(scaled)
            .map(|((row, (b, r)), s)| ScoredWallet {
                wallet_address: row.wallet.to_string(),
                base_score: *b,
                risk_score: *r,
                score: s * RISK_SCORE_SCALE,
            })
            .collect()
    }

    /// Scores sorted descending (ties by address ascending), truncated to `top_n`.
    pub fn rank(&self, rows: &[RiskFeatureRow]) -> Vec<WalletScore> {
        let mut scored = self.score_all(rows);
        scored.sort_by(compare_desc);
        scored.truncate(self.config.top_n);
        info!(wallets = rows.len(), ranked = scored.len(), "risk: scoring complete");
        scored
            .into_iter()
            .map(|s| WalletScore { wallet_address: s.wallet_address, score: s.score })
            .collect()
    }
}

fn compare_desc(a: &ScoredWallet, b: &ScoredWallet) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then_with(|| a.wallet_address.cmp(&b.wallet_address))
}

fn fill(row: &RiskFeatureRow, policy: MissingValuePolicy) -> Option<FilledRow<'_>> {
    let base = [
        row.tx_count,
        row.tx_frequency,
        row.total_value,
        row.avg_value,
        row.unique_contracts,
        row.wallet_age_days,
    ];
    let risk = [row.value_std, row.std_time_between_tx, row.avg_gas_cost, row.total_gas_cost];

    let complete = base.iter().chain(&risk).all(Option::is_some);
    if policy == MissingValuePolicy::Exclude && !complete {
        return None;
    }

    Some(FilledRow {
        wallet: &row.wallet_address,
        base: base.map(|v| v.unwrap_or(0.0)),
        risk: risk.map(|v| v.unwrap_or(0.0)),
    })
}

/// Normalize each column independently across rows, then take the weighted sum per row.
fn weighted_normalized_sum<const N: usize>(
    rows: &[FilledRow<'_>],
    columns: impl for<'r> Fn(&'r FilledRow<'_>) -> &'r [f64; N],
    weights: &[f64; N],
) -> Vec<f64> {
    let mut totals = vec![0.0; rows.len()];
    for (j, weight) in weights.iter().enumerate() {
        let column: Vec<f64> = rows.iter().map(|r| columns(r)[j]).collect();
        for (total, v) in totals.iter_mut().zip(min_max_normalize(&column)) {
            *total += weight * v;
        }
    }
    totals
}
