//! Error types for Trove.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("raw directory missing: {0}")] RawDirMissing(String),
    #[error("read {path}: {reason}")] Read { path: String, reason: String },
    #[error("parse {path}: {reason}")] Parse { path: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("empty account id at deposit {index}")] EmptyAccountId { index: usize },
    #[error("wallet {account_id} has non-finite {field}")] NonFinite { account_id: String, field: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("expected a JSON array of rows")] NotATable,
    #[error("missing column: {0}")] MissingColumn(String),
    #[error("row {index} is not an object")] MalformedRow { index: usize },
    #[error("row {index} has no wallet address")] MissingWalletAddress { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("missing input: {path}")] MissingInput { path: String },
    #[error("io {path}: {reason}")] Io { path: String, reason: String },
    #[error("serialization: {0}")] Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid weight {name}: {value}")] InvalidWeight { name: &'static str, value: f64 },
    #[error("invalid cap {name}: {value}")] InvalidCap { name: &'static str, value: f64 },
    #[error("risk weights sum to {sum}, must not exceed 1")] RiskWeightsExceedOne { sum: f64 },
    #[error("top_n must be non-zero")] ZeroTopN,
    #[error("load: {0}")] Load(String),
}

#[derive(Error, Debug)]
pub enum TroveError {
    #[error(transparent)] Ingest(#[from] IngestError),
    #[error(transparent)] Feature(#[from] FeatureError),
    #[error(transparent)] Scoring(#[from] ScoringError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Config(#[from] ConfigError),
}
