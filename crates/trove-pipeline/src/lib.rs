//! # trove-pipeline: Batch pipeline around the Trove scoring engines.
//!
//! # Modules
//!
//! - [`config`]: `PipelineConfig`, file + environment loading
//! - [`ingest`]: raw deposit files to a validated `DepositSet`
//! - [`inspect`]: shape summary of a raw JSON file
//! - [`store`]: JSON table persistence with atomic replacement
//! - [`report`]: top/bottom wallet analysis report
//! - [`pipeline`]: stage orchestration (process, features, score, analyze)

pub mod config;
pub mod ingest;
pub mod inspect;
pub mod pipeline;
pub mod report;
pub mod store;

pub use config::PipelineConfig;
pub use ingest::{IngestSummary, IngestionAdapter};
pub use inspect::{FileShape, JsonShape, inspect_file};
pub use pipeline::{Pipeline, RunSummary};
pub use report::{AnalysisReport, ReportGenerator};
pub use store::JsonStore;
