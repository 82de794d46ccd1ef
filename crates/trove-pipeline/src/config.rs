//! Pipeline configuration.
//!
//! Provides [`PipelineConfig`] with defaults for the data directory, report
//! size, both scoring configurations and logging. Values are layered with the
//! `config` crate: built-in defaults, then an optional TOML/JSON file, then
//! `TROVE__*` environment variables (`TROVE__SCORING__TOP_N=500`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trove_core::config::{RiskScorerConfig, ScoringConfig};
use trove_core::constants::DEFAULT_REPORT_SAMPLE;
use trove_core::error::ConfigError;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "TROVE";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root holding `raw/` and `processed/`.
    pub data_dir: PathBuf,
    /// Wallets sampled at each end of the ranking in the analysis report.
    pub report_sample: usize,
    pub scoring: ScoringConfig,
    pub risk: RiskScorerConfig,
    /// Log level filter string (e.g. "info", "trove_features=debug").
    pub log_level: String,
    /// "text" or "json".
    pub log_format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            report_sample: DEFAULT_REPORT_SAMPLE,
            scoring: ScoringConfig::default(),
            risk: RiskScorerConfig::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load from an optional file plus environment overrides, then validate.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.risk.validate()
    }
}
