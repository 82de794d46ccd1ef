//! Shared fixtures for integration tests.

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use trove_core::types::{DepositRecord, DepositSet};

/// Base block time used by every fixture: 2021-05-03T00:00:00Z.
pub const T0: i64 = 1_620_000_000;

pub const DAY: i64 = 86_400;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A deposit `offset_secs` after [`T0`].
pub fn deposit(account: &str, asset: &str, usd: Option<f64>, offset_secs: i64) -> DepositRecord {
    DepositRecord {
        account_id: account.to_string(),
        asset: asset.to_string(),
        asset_symbol: asset.to_uppercase(),
        amount: usd,
        amount_usd: usd,
        timestamp: at(T0 + offset_secs),
        block_number: Some(12_000_000 + offset_secs.max(0) as u64 / 12),
        transaction_hash: format!("0x{account}{offset_secs}"),
    }
}

pub fn deposit_set(records: Vec<DepositRecord>) -> DepositSet {
    DepositSet::new(records).unwrap()
}

/// One wallet, asset `A`, daily deposits of 100, 200 and 150 USD.
pub fn three_daily_deposits() -> DepositSet {
    deposit_set(vec![
        deposit("W", "A", Some(100.0), 0),
        deposit("W", "A", Some(200.0), DAY),
        deposit("W", "A", Some(150.0), 2 * DAY),
    ])
}

/// A raw subgraph deposit object as found in `raw/*.json`.
pub fn raw_deposit(account: &str, asset: &str, usd: &str, ts: i64) -> Value {
    json!({
        "account": {"id": account},
        "amount": usd,
        "amountUSD": usd,
        "asset": {"id": asset, "symbol": asset.to_uppercase()},
        "blockNumber": (12_000_000 + (ts - T0) / 12).to_string(),
        "timestamp": ts.to_string(),
        "transaction": {"id": format!("0x{account}{ts}")}
    })
}

/// Write `deposits` as `{"deposits": [...]}` to `<data_dir>/raw/<name>`.
pub fn write_raw_file(data_dir: &Path, name: &str, deposits: Vec<Value>) {
    let raw = data_dir.join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join(name), json!({ "deposits": deposits }).to_string()).unwrap();
}

/// A risk-table row with every base column set to `base` and every risk column to `risk`.
pub fn risk_row(from: &str, base: f64, risk: f64) -> Value {
    json!({
        "from": from,
        "tx_count": base,
        "tx_frequency": base,
        "total_value": base,
        "avg_value": base,
        "unique_contracts": base,
        "wallet_age_days": base,
        "value_std": risk,
        "std_time_between_tx": risk,
        "avg_gas_cost": risk,
        "total_gas_cost": risk
    })
}
