//! # trove-risk: Risk-adjusted wallet scoring.
//!
//! An independent scoring path over a transaction-level feature schema
//! (`tx_count`, `wallet_age_days`, gas costs, ...). Every column is min-max
//! normalized across the population, a weighted base score is discounted by
//! a weighted risk score (`base * (1 - risk)`), and the result is normalized
//! again onto `[0, 100]`.
//!
//! Normalization is a pure function of the population snapshot, so scores are
//! reproducible for identical input but not comparable across populations.

pub mod input;
pub mod normalize;
pub mod scorer;

pub use input::rows_from_json;
pub use normalize::min_max_normalize;
pub use scorer::{RiskScorer, ScoredWallet};
