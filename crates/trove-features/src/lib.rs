//! # trove-features: Per-wallet feature engineering and scoring.
//!
//! Turns a [`DepositSet`](trove_core::types::DepositSet) into one scored
//! [`WalletFeatureVector`](trove_core::types::WalletFeatureVector) per wallet:
//! - **Time features**: deposit span, count, average gap and cadence consistency.
//! - **Value features**: totals, averages, extrema and dispersion of deposit sizes.
//! - **Asset features**: diversity against the dataset and Herfindahl concentration.
//! - **Combiner**: merges the three tables under a [`MissingValuePolicy`] and
//!   computes activity, value and longevity sub-scores plus the final score.
//!
//! [`MissingValuePolicy`]: trove_core::config::MissingValuePolicy

pub mod asset;
pub mod combiner;
pub mod engine;
pub mod time;
pub mod value;

pub use asset::AssetFeatureComputer;
pub use combiner::{FeatureCombiner, rank_by_final_score};
pub use engine::FeatureEngine;
pub use time::TimeFeatureComputer;
pub use value::ValueFeatureComputer;
