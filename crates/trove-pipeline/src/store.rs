//! JSON table persistence.
//!
//! Every table is a pretty-printed JSON array. Writes land in a temporary
//! sibling file that is renamed over the target, so readers never observe a
//! half-written table.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;
use trove_core::error::StoreError;
use trove_core::types::{DepositSet, WalletFeatureVector, WalletScore};

use crate::report::AnalysisReport;

/// File-system layout rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory of raw transaction files.
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn deposits_path(&self) -> PathBuf {
        self.processed_dir().join("processed_deposits.json")
    }

    pub fn features_path(&self) -> PathBuf {
        self.processed_dir().join("features").join("wallet_features.json")
    }

    pub fn top_wallets_path(&self, n: usize) -> PathBuf {
        self.processed_dir().join("features").join(format!("top_{n}_wallets.json"))
    }

    /// Input table of the risk-adjusted scorer.
    pub fn risk_features_path(&self) -> PathBuf {
        self.processed_dir().join("scores").join("risk_features.json")
    }

    pub fn scores_path(&self) -> PathBuf {
        self.processed_dir().join("scores").join("wallet_scores.json")
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.processed_dir().join("analysis").join("wallet_analysis.json")
    }

    pub fn save_deposits(&self, deposits: &DepositSet) -> Result<PathBuf, StoreError> {
        let path = self.deposits_path();
        write_json(&path, deposits)?;
        info!(path = %path.display(), rows = deposits.len(), "store: saved deposits");
        Ok(path)
    }

    pub fn load_deposits(&self) -> Result<DepositSet, StoreError> {
        read_json(&self.deposits_path())
    }

    pub fn save_features(&self, rows: &[WalletFeatureVector]) -> Result<PathBuf, StoreError> {
        let path = self.features_path();
        write_json(&path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "store: saved features");
        Ok(path)
    }

    pub fn save_top_wallets(&self, rows: &[WalletFeatureVector], n: usize) -> Result<PathBuf, StoreError> {
        let path = self.top_wallets_path(n);
        write_json(&path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "store: saved top wallets");
        Ok(path)
    }

    pub fn load_features(&self) -> Result<Vec<WalletFeatureVector>, StoreError> {
        read_json(&self.features_path())
    }

    /// Raw risk table; schema checking happens in the scorer's parser.
    pub fn load_risk_features(&self) -> Result<Value, StoreError> {
        read_json(&self.risk_features_path())
    }

    pub fn save_scores(&self, scores: &[WalletScore]) -> Result<PathBuf, StoreError> {
        let path = self.scores_path();
        write_json(&path, scores)?;
        info!(path = %path.display(), rows = scores.len(), "store: saved scores");
        Ok(path)
    }

    pub fn save_report(&self, report: &AnalysisReport) -> Result<PathBuf, StoreError> {
        let path = self.analysis_path();
        write_json(&path, report)?;
        info!(path = %path.display(), "store: saved analysis report");
        Ok(path)
    }
}

/// Serialize `value` to `path`, replacing any existing file atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |e: std::io::Error| StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// Read and deserialize `path`. An absent file is a missing-input error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::MissingInput { path: path.display().to_string() });
    }
    let bytes = fs::read(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
