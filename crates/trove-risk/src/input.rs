//! Parsing of the risk feature table from JSON rows.
//!
//! Every row must carry the `from` address and all ten feature columns. A
//! column that is present but null or unparseable becomes `None`; a column
//! that is absent altogether is a schema error.

use serde_json::{Map, Value};
use trove_core::error::ScoringError;
use trove_core::stats::coerce_f64;
use trove_core::types::RiskFeatureRow;

/// Wallet identifier column.
pub const WALLET_COLUMN: &str = "from";

/// Columns feeding the base score.
pub const BASE_COLUMNS: [&str; 6] = [
    "tx_count",
    "tx_frequency",
    "total_value",
    "avg_value",
    "unique_contracts",
    "wallet_age_days",
];

/// Columns feeding the risk score.
pub const RISK_COLUMNS: [&str; 4] = [
    "value_std",
    "std_time_between_tx",
    "avg_gas_cost",
    "total_gas_cost",
];

/// Parse a JSON array of row objects into [`RiskFeatureRow`]s.
pub fn rows_from_json(table: &Value) -> Result<Vec<RiskFeatureRow>, ScoringError> {
    let rows = table.as_array().ok_or(ScoringError::NotATable)?;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let obj = row.as_object().ok_or(ScoringError::MalformedRow { index })?;
            parse_row(index, obj)
        })
        .collect()
}

fn parse_row(index: usize, obj: &Map<String, Value>) -> Result<RiskFeatureRow, ScoringError> {
    let wallet_address = match require(obj, WALLET_COLUMN)? {
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => return Err(ScoringError::MissingWalletAddress { index }),
    };

    let [tx_count, tx_frequency, total_value, avg_value, unique_contracts, wallet_age_days] =
        numeric_columns(obj, &BASE_COLUMNS)?;
    let [value_std, std_time_between_tx, avg_gas_cost, total_gas_cost] = numeric_columns(obj, &RISK_COLUMNS)?;

    Ok(RiskFeatureRow {
        wallet_address,
        tx_count,
        tx_frequency,
        total_value,
        avg_value,
        unique_contracts,
        wallet_age_days,
        value_std,
        std_time_between_tx,
        avg_gas_cost,
        total_gas_cost,
    })
}

/// Coerce `names` in order, failing on the first absent column.
fn numeric_columns<const N: usize>(
    obj: &Map<String, Value>,
    names: &[&str; N],
) -> Result<[Option<f64>; N], ScoringError> {
    let mut values = [None; N];
    for (slot, name) in values.iter_mut().zip(names) {
        *slot = coerce_f64(require(obj, name)?);
    }
    Ok(values)
}

fn require<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a Value, ScoringError> {
    obj.get(name)
        .ok_or_else(|| ScoringError::MissingColumn(name.to_string()))
}
