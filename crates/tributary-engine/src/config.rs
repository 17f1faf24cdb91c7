//! Distribution engine configuration.

use serde::{Deserialize, Serialize};

use tributary_core::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_RETENTION_MULTIPLIER_PPB, DEFAULT_MIN_PROPAGATION_CENTS,
};
use tributary_core::error::ConfigError;

/// Tunable limits for a [`DistributionEngine`](crate::DistributionEngine).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum propagation depth; visits at this level fully retain.
    pub max_depth: u32,
    /// Pools below this many cents are not propagated upstream.
    pub min_propagation_cents: u64,
    /// Cap on the difficulty-compensation multiplier, in ppb. Must be > 0.
    pub max_retention_multiplier_ppb: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_propagation_cents: DEFAULT_MIN_PROPAGATION_CENTS,
            max_retention_multiplier_ppb: DEFAULT_MAX_RETENTION_MULTIPLIER_PPB,
        }
    }
}

impl EngineConfig {
    /// Check configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retention_multiplier_ppb == 0 {
            return Err(ConfigError::ZeroRetentionMultiplier);
        }
        Ok(())
    }
}
