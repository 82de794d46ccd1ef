//! Scoring constants. Monetary caps are in USD, durations in days.

/// Seconds in one day, used to convert deposit spans to fractional days.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Saturation thresholds
// ---------------------------------------------------------------------------

/// Deposit count at which the activity count term saturates.
pub const DEPOSIT_COUNT_CAP: f64 = 100.0;

/// Total USD deposited at which the value volume term saturates.
pub const DEPOSIT_USD_CAP: f64 = 10_000.0;

/// Deposit history span (days) at which the longevity span term saturates.
pub const TIMESPAN_DAYS_CAP: f64 = 365.0;

/// Average gap between deposits (days) at which the longevity cadence term saturates.
pub const AVG_GAP_DAYS_CAP: f64 = 30.0;

// ---------------------------------------------------------------------------
// Component weights
// ---------------------------------------------------------------------------

pub const ACTIVITY_COUNT_WEIGHT: f64 = 0.4;
pub const ACTIVITY_CONSISTENCY_WEIGHT: f64 = 0.3;
pub const ACTIVITY_DIVERSITY_WEIGHT: f64 = 0.3;

pub const VALUE_VOLUME_WEIGHT: f64 = 0.4;
pub const VALUE_CONSISTENCY_WEIGHT: f64 = 0.3;
pub const VALUE_SPREAD_WEIGHT: f64 = 0.3;

pub const LONGEVITY_SPAN_WEIGHT: f64 = 0.6;
pub const LONGEVITY_CADENCE_WEIGHT: f64 = 0.4;

/// Weight of `activity_score` in the composite.
pub const COMPOSITE_ACTIVITY_WEIGHT: f64 = 0.4;
/// Weight of `value_score` in the composite.
pub const COMPOSITE_VALUE_WEIGHT: f64 = 0.4;
/// Weight of `longevity_score` in the composite.
pub const COMPOSITE_LONGEVITY_WEIGHT: f64 = 0.2;

/// Scale applied to the weighted composite to produce `final_score`.
pub const FINAL_SCORE_SCALE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Alternative risk scorer weights
// ---------------------------------------------------------------------------

pub const BASE_TX_COUNT_WEIGHT: f64 = 0.2;
pub const BASE_TX_FREQUENCY_WEIGHT: f64 = 0.15;
pub const BASE_TOTAL_VALUE_WEIGHT: f64 = 0.2;
pub const BASE_AVG_VALUE_WEIGHT: f64 = 0.15;
pub const BASE_UNIQUE_CONTRACTS_WEIGHT: f64 = 0.15;
pub const BASE_WALLET_AGE_WEIGHT: f64 = 0.15;

/// High value volatility.
pub const RISK_VALUE_STD_WEIGHT: f64 = 0.3;
/// Irregular transaction timing.
pub const RISK_TIMING_STD_WEIGHT: f64 = 0.3;
pub const RISK_AVG_GAS_WEIGHT: f64 = 0.2;
pub const RISK_TOTAL_GAS_WEIGHT: f64 = 0.2;

/// Upper bound of the re-normalized risk-adjusted score.
pub const RISK_SCORE_SCALE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Output sizing
// ---------------------------------------------------------------------------

/// Number of wallets kept in the ranked "top" views.
pub const DEFAULT_TOP_N: usize = 1000;

/// Number of wallets sampled at each end of the ranking by the analysis report.
pub const DEFAULT_REPORT_SAMPLE: usize = 5;

/// Maximum characters shown in a raw-file preview.
pub const INSPECT_PREVIEW_CHARS: usize = 200;
