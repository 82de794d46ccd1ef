//! Feature engine: runs the three domain computers and the combiner over a
//! deposit snapshot and selects the top-N view.

use tracing::info;
use trove_core::config::ScoringConfig;
use trove_core::error::ConfigError;
use trove_core::traits::FeatureComputer;
use trove_core::types::{DepositSet, WalletFeatureVector};

use crate::asset::AssetFeatureComputer;
use crate::combiner::{FeatureCombiner, rank_by_final_score};
use crate::time::TimeFeatureComputer;
use crate::value::ValueFeatureComputer;

/// Output of one engine pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRun {
    /// Every scored wallet, ordered by `account_id`.
    pub features: Vec<WalletFeatureVector>,
    /// Best `top_n` wallets by `final_score`.
    pub top: Vec<WalletFeatureVector>,
}

/// The production feature pipeline.
#[derive(Debug, Clone)]
pub struct FeatureEngine {
    time: TimeFeatureComputer,
    value: ValueFeatureComputer,
    asset: AssetFeatureComputer,
    combiner: FeatureCombiner,
}

impl FeatureEngine {
    /// Build an engine after validating `config`.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            time: TimeFeatureComputer::new(),
            value: ValueFeatureComputer::new(),
            asset: AssetFeatureComputer::new(),
            combiner: FeatureCombiner::new(config),
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        self.combiner.config()
    }

    /// Compute, merge and score features for every wallet in `deposits`.
    ///
    /// An empty snapshot yields empty tables.
    pub fn run(&self, deposits: &DepositSet) -> FeatureRun {
        info!(deposits = deposits.len(), "features: starting");

        let time = self.time.compute(deposits);
        info!(computer = self.time.name(), wallets = time.len(), "features: computed");

        let value = self.value.compute(deposits);
        info!(computer = self.value.name(), wallets = value.len(), "features: computed");

        let asset = self.asset.compute(deposits);
        info!(computer = self.asset.name(), wallets = asset.len(), "features: computed");

        let features = self.combiner.combine(&time, &value, &asset);
        let top = rank_by_final_score(&features, self.config().top_n);
        info!(wallets = features.len(), top = top.len(), "features: generated");

        FeatureRun { features, top }
    }
}
