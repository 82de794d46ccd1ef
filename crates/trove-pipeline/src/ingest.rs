//! Raw deposit ingestion.
//!
//! Reads every `*.json` file under the raw directory (sorted by name), takes
//! the `deposits` array of each, and flattens the nested subgraph shape
//! (`account.id`, `asset.symbol`, `amountUSD`, ...) into [`DepositRecord`]s.
//! Unreadable files and malformed entries are logged and skipped; only a
//! missing raw directory aborts ingestion.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{error, info, warn};
use trove_core::error::{IngestError, TroveError};
use trove_core::stats::coerce_f64;
use trove_core::types::{DepositRecord, DepositSet};

/// Counters describing one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub files_read: usize,
    /// Files that failed to read/parse or had no `deposits` array.
    pub files_skipped: usize,
    /// Raw entries seen across all files.
    pub entries_seen: usize,
    /// Entries dropped for a missing account id or timestamp.
    pub entries_malformed: usize,
}

#[derive(Debug, Clone)]
pub struct IngestionAdapter {
    raw_dir: PathBuf,
}

impl IngestionAdapter {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self { raw_dir: raw_dir.into() }
    }

    /// Load and flatten every raw file.
    pub fn load(&self) -> Result<(DepositSet, IngestSummary), TroveError> {
        let files = self.raw_files()?;
        let mut summary = IngestSummary::default();
        let mut records = Vec::new();

        for path in files {
            info!(file = %path.display(), "ingest: loading transactions");
            let entries = match read_deposits(&path) {
                Ok(Some(entries)) => entries,
                Ok(None) => {
                    warn!(file = %path.display(), "ingest: no deposits found");
                    summary.files_skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "ingest: skipping file");
                    summary.files_skipped += 1;
                    continue;
                }
            };

            info!(file = %path.display(), deposits = entries.len(), "ingest: found deposits");
            summary.files_read += 1;
            summary.entries_seen += entries.len();

            for entry in &entries {
                match flatten_deposit(entry) {
                    Some(record) => records.push(record),
                    None => summary.entries_malformed += 1,
                }
            }
        }

        if summary.entries_malformed > 0 {
            warn!(skipped = summary.entries_malformed, "ingest: malformed deposits skipped");
        }
        info!(deposits = records.len(), files = summary.files_read, "ingest: total deposits loaded");

        let set = DepositSet::new(records)?;
        Ok((set, summary))
    }

    /// `*.json` files in the raw directory, sorted by path.
    fn raw_files(&self) -> Result<Vec<PathBuf>, IngestError> {
        let dir = fs::read_dir(&self.raw_dir)
            .map_err(|_| IngestError::RawDirMissing(self.raw_dir.display().to_string()))?;
        let mut files: Vec<PathBuf> = dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

/// The `deposits` array of a raw file, `None` when the file has another shape.
fn read_deposits(path: &Path) -> Result<Option<Vec<Value>>, IngestError> {
    let text = fs::read_to_string(path).map_err(|e| IngestError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| IngestError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    match doc {
        Value::Object(mut obj) => match obj.remove("deposits") {
            Some(Value::Array(entries)) => Ok(Some(entries)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Flatten one raw deposit. Returns `None` without an account id or a usable timestamp.
pub fn flatten_deposit(raw: &Value) -> Option<DepositRecord> {
    let account_id = nested_str(raw, "account", "id").filter(|s| !s.is_empty())?;
    let timestamp = parse_timestamp(raw.get("timestamp")?)?;

    Some(DepositRecord {
        account_id: account_id.to_string(),
        asset: nested_str(raw, "asset", "id").unwrap_or_default().to_string(),
        asset_symbol: nested_str(raw, "asset", "symbol").unwrap_or_default().to_string(),
        amount: raw.get("amount").and_then(coerce_f64),
        amount_usd: raw.get("amountUSD").and_then(coerce_f64),
        timestamp,
        block_number: raw
            .get("blockNumber")
            .and_then(coerce_f64)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u64),
        transaction_hash: nested_str(raw, "transaction", "id").unwrap_or_default().to_string(),
    })
}

fn nested_str<'a>(raw: &'a Value, outer: &str, inner: &str) -> Option<&'a str> {
    raw.get(outer)?.get(inner)?.as_str()
}

/// Unix seconds (number or numeric string), or an RFC 3339 string.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = coerce_f64(value) {
        return Utc.timestamp_opt(secs as i64, 0).single();
    }
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_deposit(account: &str, ts: Value) -> Value {
        json!({
            "account": {"id": account},
            "amount": "1500000",
            "amountUSD": "1.5",
            "asset": {"id": "0xusdc", "symbol": "USDC"},
            "blockNumber": "12000000",
            "timestamp": ts,
            "transaction": {"id": "0xdead"}
        })
    }

    #[test]
    fn flattens_nested_fields() {
        let r = flatten_deposit(&raw_deposit("0xabc", json!("1620000000"))).unwrap();
        assert_eq!(r.account_id, "0xabc");
        assert_eq!(r.asset, "0xusdc");
        assert_eq!(r.asset_symbol, "USDC");
        assert_eq!(r.amount, Some(1_500_000.0));
        assert_eq!(r.amount_usd, Some(1.5));
        assert_eq!(r.block_number, Some(12_000_000));
        assert_eq!(r.timestamp.timestamp(), 1_620_000_000);
        assert_eq!(r.transaction_hash, "0xdead");
    }

    #[test]
    fn unparseable_numbers_become_missing() {
        let mut raw = raw_deposit("0xabc", json!(1620000000));
        raw["amountUSD"] = json!("not-a-number");
        raw["blockNumber"] = json!(null);
        let r = flatten_deposit(&raw).unwrap();
        assert_eq!(r.amount_usd, None);
        assert_eq!(r.block_number, None);
    }

    #[test]
    fn optional_nested_fields_default_empty() {
        let raw = json!({"account": {"id": "w"}, "timestamp": 1, "amount": 2});
        let r = flatten_deposit(&raw).unwrap();
        assert_eq!(r.asset, "");
        assert_eq!(r.asset_symbol, "");
        assert_eq!(r.transaction_hash, "");
        assert_eq!(r.amount_usd, None);
    }

    #[test]
    fn rfc3339_timestamps_accepted() {
        let r = flatten_deposit(&raw_deposit("w", json!("2021-05-03T00:00:00Z"))).unwrap();
        assert_eq!(r.timestamp.timestamp(), 1_620_000_000);
    }

    #[test]
    fn malformed_entries_rejected() {
        assert!(flatten_deposit(&raw_deposit("", json!(1))).is_none());
        assert!(flatten_deposit(&raw_deposit("w", json!("yesterday"))).is_none());
        assert!(flatten_deposit(&json!({"timestamp": 1})).is_none());
    }

    #[test]
    fn loads_directory_skipping_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let ok = json!({"deposits": [raw_deposit("w1", json!(10)), raw_deposit("", json!(11))]});
        fs::write(dir.path().join("a.json"), ok.to_string()).unwrap();
        fs::write(dir.path().join("b.json"), "{broken").unwrap();
        fs::write(dir.path().join("c.json"), json!({"withdraws": []}).to_string()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (set, summary) = IngestionAdapter::new(dir.path()).load().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            summary,
            IngestSummary { files_read: 1, files_skipped: 2, entries_seen: 2, entries_malformed: 1 }
        );
    }

    #[test]
    fn missing_raw_dir_is_fatal() {
        let err = IngestionAdapter::new("/nonexistent/trove/raw").load().unwrap_err();
        assert!(matches!(err, TroveError::Ingest(IngestError::RawDirMissing(_))));
    }
}
