//! Wallet analysis report.
//!
//! Summarises the scored feature table: the score distribution, the best and
//! worst wallets with their metric breakdown and per-wallet deposit history,
//! and group averages for both ends of the ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trove_core::constants::DEFAULT_REPORT_SAMPLE;
use trove_core::stats;
use trove_core::types::{DepositRecord, DepositSet, WalletFeatureVector};
use trove_features::rank_by_final_score;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const NO_DATE: &str = "N/A";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub analysis_timestamp: String,
    pub total_wallets_analyzed: usize,
    pub score_distribution: ScoreDistribution,
    pub top_performing_wallets: Vec<WalletAnalysis>,
    pub bottom_performing_wallets: Vec<WalletAnalysis>,
    pub key_findings: KeyFindings,
}

/// Summary statistics of `final_score`; all zero for an empty table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WalletAnalysis {
    pub wallet_id: String,
    pub score: f64,
    pub activity_metrics: ActivityMetrics,
    pub value_metrics: ValueMetrics,
    pub longevity_metrics: LongevityMetrics,
    pub asset_usage: AssetUsage,
    pub behavioral_patterns: BehavioralPatterns,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActivityMetrics {
    pub total_deposits: u64,
    pub deposit_consistency: f64,
    pub unique_assets: u64,
    pub activity_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValueMetrics {
    pub total_value_usd: f64,
    pub avg_deposit_usd: f64,
    pub value_consistency: f64,
    pub value_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LongevityMetrics {
    pub timespan_days: f64,
    pub avg_days_between_deposits: f64,
    pub longevity_score: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetUsage {
    pub most_used_asset: String,
    pub asset_concentration: f64,
}

/// Facts taken from the raw deposits rather than the feature row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BehavioralPatterns {
    pub first_deposit: String,
    pub last_deposit: String,
    pub largest_deposit_usd: f64,
    pub smallest_deposit_usd: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct KeyFindings {
    pub top_wallets: GroupSummary,
    pub bottom_wallets: GroupSummary,
}

/// Averages over one group of wallets; zero for an empty group.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupSummary {
    pub avg_score: f64,
    pub avg_deposits: f64,
    pub avg_value_usd: f64,
    pub avg_assets: f64,
}

impl GroupSummary {
    fn of(group: &[WalletFeatureVector]) -> Self {
        let avg = |f: fn(&WalletFeatureVector) -> f64| {
            let values: Vec<f64> = group.iter().map(f).collect();
            stats::mean(&values).unwrap_or(0.0)
        };
        Self {
            avg_score: avg(|w| w.final_score),
            avg_deposits: avg(|w| w.total_deposits_count as f64),
            avg_value_usd: avg(|w| w.total_deposit_usd),
            avg_assets: avg(|w| w.unique_assets_count as f64),
        }
    }
}

/// Builds [`AnalysisReport`]s from a read-only feature table.
#[derive(Debug, Clone, Copy)]
pub struct ReportGenerator {
    sample: usize,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_SAMPLE)
    }
}

impl ReportGenerator {
    /// `sample` wallets are taken from each end of the ranking.
    pub fn new(sample: usize) -> Self {
        Self { sample }
    }

    pub fn generate(
        &self,
        features: &[WalletFeatureVector],
        deposits: &DepositSet,
        generated_at: DateTime<Utc>,
    ) -> AnalysisReport {
        let ranked = rank_by_final_score(features, features.len());
        let top = &ranked[..self.sample.min(ranked.len())];
        let bottom = &ranked[ranked.len().saturating_sub(self.sample)..];

        let by_account = deposits.by_account();
        let analyse = |group: &[WalletFeatureVector]| -> Vec<WalletAnalysis> {
            group
                .iter()
                .map(|w| {
                    let history = by_account.get(w.account_id.as_str()).map_or(&[][..], Vec::as_slice);
                    wallet_analysis(w, history)
                })
                .collect()
        };

        AnalysisReport {
            analysis_timestamp: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            total_wallets_analyzed: features.len(),
            score_distribution: distribution(features),
            top_performing_wallets: analyse(top),
            bottom_performing_wallets: analyse(bottom),
            key_findings: KeyFindings {
                top_wallets: GroupSummary::of(top),
                bottom_wallets: GroupSummary::of(bottom),
            },
        }
    }
}

fn distribution(features: &[WalletFeatureVector]) -> ScoreDistribution {
    let scores: Vec<f64> = features.iter().map(|w| w.final_score).collect();
    ScoreDistribution {
        mean: stats::mean(&scores).unwrap_or(0.0),
        median: stats::median(&scores).unwrap_or(0.0),
        std: stats::sample_std(&scores).unwrap_or(0.0),
        min: stats::min(&scores).unwrap_or(0.0),
        max: stats::max(&scores).unwrap_or(0.0),
    }
}

fn wallet_analysis(w: &WalletFeatureVector, history: &[&DepositRecord]) -> WalletAnalysis {
    let first = history.iter().map(|d| d.timestamp).min();
    let last = history.iter().map(|d| d.timestamp).max();
    let usd: Vec<f64> = history.iter().filter_map(|d| d.amount_usd).collect();

    WalletAnalysis {
        wallet_id: w.account_id.clone(),
        score: w.final_score,
        activity_metrics: ActivityMetrics {
            total_deposits: w.total_deposits_count,
            deposit_consistency: w.deposit_consistency,
            unique_assets: w.unique_assets_count,
            activity_score: w.activity_score,
        },
        value_metrics: ValueMetrics {
            total_value_usd: w.total_deposit_usd,
            avg_deposit_usd: w.avg_deposit_usd,
            value_consistency: w.deposit_value_consistency,
            value_score: w.value_score,
        },
        longevity_metrics: LongevityMetrics {
            timespan_days: w.deposit_timespan_days,
            avg_days_between_deposits: w.avg_days_between_deposits,
            longevity_score: w.longevity_score,
        },
        asset_usage: AssetUsage {
            most_used_asset: w.most_used_asset.clone(),
            asset_concentration: w.asset_concentration,
        },
        behavioral_patterns: BehavioralPatterns {
            first_deposit: format_date(first),
            last_deposit: format_date(last),
            largest_deposit_usd: stats::max(&usd).unwrap_or(0.0),
            smallest_deposit_usd: stats::min(&usd).unwrap_or(0.0),
        },
    }
}

fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| NO_DATE.to_string(), |t| t.format(DATE_FORMAT).to_string())
}
