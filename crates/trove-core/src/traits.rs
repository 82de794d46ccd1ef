//! Trait interfaces between crates.
//!
//! - [`FeatureComputer`]: one per-wallet aggregation domain (trove-features implements)

use crate::types::{DepositSet, FeatureTable};

/// Pure, per-domain aggregation over a full deposit snapshot.
///
/// Implementations share no mutable state and each produce a disjoint table,
/// so they may run in any order or concurrently. Every wallet present in the
/// input appears exactly once in the output.
pub trait FeatureComputer: Send + Sync {
    /// Row type emitted for each wallet.
    type Features;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Aggregate `deposits` into one row per `account_id`.
    fn compute(&self, deposits: &DepositSet) -> FeatureTable<Self::Features>;
}
