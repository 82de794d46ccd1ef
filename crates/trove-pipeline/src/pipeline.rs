//! Stage orchestration.
//!
//! Each stage reads its inputs from the [`JsonStore`], does one batch pass and
//! writes its outputs back. Failures are logged once here and propagated.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use trove_core::error::{FeatureError, TroveError};
use trove_core::types::{DepositSet, WalletFeatureVector, WalletScore};
use trove_features::FeatureEngine;
use trove_features::engine::FeatureRun;
use trove_risk::{RiskScorer, rows_from_json};

use crate::config::PipelineConfig;
use crate::ingest::{IngestSummary, IngestionAdapter};
use crate::report::{AnalysisReport, ReportGenerator};
use crate::store::JsonStore;

/// What a full run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ingest: IngestSummary,
    pub deposits: usize,
    pub wallets: usize,
    /// `None` when no risk feature table was present.
    pub scored_wallets: Option<usize>,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    store: JsonStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = JsonStore::new(&config.data_dir);
        Self { config, store }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Ingest raw files and persist the deposit table.
    ///
    /// An empty ingest is logged and nothing is written.
    pub fn process(&self) -> Result<(DepositSet, IngestSummary), TroveError> {
        info!(raw_dir = %self.store.raw_dir().display(), "process: starting");
        let (deposits, summary) = logged("process", IngestionAdapter::new(self.store.raw_dir()).load())?;

        if deposits.is_empty() {
            warn!("process: no deposits ingested, nothing persisted");
            return Ok((deposits, summary));
        }
        logged("process", self.store.save_deposits(&deposits))?;
        Ok((deposits, summary))
    }

    /// Compute and persist the wallet feature table and its top-N view.
    pub fn features(&self) -> Result<FeatureRun, TroveError> {
        info!("features: loading deposits");
        let deposits = logged("features", self.store.load_deposits())?;
        self.features_from(&deposits)
    }

    fn features_from(&self, deposits: &DepositSet) -> Result<FeatureRun, TroveError> {
        let engine = logged("features", FeatureEngine::new(self.config.scoring.clone()))?;
        let run = engine.run(deposits);
        logged("features", ensure_finite(&run.features))?;

        let top_n = self.config.scoring.top_n;
        logged("features", self.store.save_features(&run.features))?;
        logged("features", self.store.save_top_wallets(&run.top, top_n))?;
        Ok(run)
    }

    /// Score the risk feature table and persist the ranked wallet scores.
    pub fn score(&self) -> Result<Vec<WalletScore>, TroveError> {
        info!(input = %self.store.risk_features_path().display(), "score: loading risk features");
        let table = logged("score", self.store.load_risk_features())?;
        let rows = logged("score", rows_from_json(&table))?;
        let scorer = logged("score", RiskScorer::new(self.config.risk.clone()))?;

        let ranked = scorer.rank(&rows);
        logged("score", self.store.save_scores(&ranked))?;
        Ok(ranked)
    }

    /// Build and persist the analysis report. `now` stamps the report.
    pub fn analyze(&self, now: DateTime<Utc>) -> Result<AnalysisReport, TroveError> {
        let features = logged("analyze", self.store.load_features())?;
        let deposits = logged("analyze", self.store.load_deposits())?;
        info!(wallets = features.len(), "analyze: loaded data");

        let report = ReportGenerator::new(self.config.report_sample).generate(&features, &deposits, now);
        logged("analyze", self.store.save_report(&report))?;
        Ok(report)
    }

    /// Process, features, analyze, then score when a risk table exists.
    pub fn run_all(&self, now: DateTime<Utc>) -> Result<RunSummary, TroveError> {
        let (deposits, ingest) = self.process()?;
        let mut summary = RunSummary {
            ingest,
            deposits: deposits.len(),
            wallets: 0,
            scored_wallets: None,
            report_path: None,
        };
        if deposits.is_empty() {
            warn!("run: stopping after process, no deposits");
            return Ok(summary);
        }

        summary.wallets = self.features_from(&deposits)?.features.len();
        self.analyze(now)?;
        summary.report_path = Some(self.store.analysis_path());

        if self.store.risk_features_path().exists() {
            summary.scored_wallets = Some(self.score()?.len());
        } else {
            info!(
                input = %self.store.risk_features_path().display(),
                "run: no risk feature table, skipping score"
            );
        }

        info!(
            deposits = summary.deposits,
            wallets = summary.wallets,
            scored = ?summary.scored_wallets,
            "run: complete"
        );
        Ok(summary)
    }
}

/// Log a stage failure before handing it to the caller.
/// Rows that JSON cannot round-trip are refused before anything is written.
fn ensure_finite(rows: &[WalletFeatureVector]) -> Result<(), FeatureError> {
    match rows.iter().find_map(|w| w.non_finite_field().map(|field| (w, field))) {
        Some((w, field)) => Err(FeatureError::NonFinite { account_id: w.account_id.clone(), field }),
        None => Ok(()),
    }
}

fn logged<T, E: Into<TroveError>>(stage: &str, result: Result<T, E>) -> Result<T, TroveError> {
    result.map_err(|e| {
        let e = e.into();
        error!(stage, error = %e, "stage failed");
        e
    })
}
