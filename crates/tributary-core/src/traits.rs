//! Trait interfaces between crates.
//!
//! [`WeightModel`] is the contract between the distribution engine and the
//! weight math (tributary-weights implements it). It is a pure, deterministic
//! computation: the same inputs always produce the same weight.

use chrono::{DateTime, Utc};

use crate::error::WeightError;
use crate::types::Node;

/// Pure computation of node reference weights.
///
/// All math is integer fixed-point in parts-per-billion. Implementations
/// must be deterministic so that repeated `distribute` calls against the
/// same graph and clock instant are identical.
pub trait WeightModel: Send + Sync {
    /// Time-priority factor for a node created at `created_at`, evaluated
    /// at `now`, in ppb.
    ///
    /// Monotonically decreasing in age, in `(0, FACTOR_PRECISION]`.
    /// Created-in-future inputs count as zero elapsed days (factor 1.0).
    fn time_priority_ppb(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64;

    /// Reference weight `citation_count × time_priority × creativity`, in ppb.
    fn reference_weight_ppb(
        &self,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
        citation_count: u32,
        creativity_ppb: u64,
    ) -> Result<u128, WeightError>;

    /// Reference weight of a node snapshot, with the declared citation count
    /// floored by `citation_floor` (the graph's structurally observed count).
    ///
    /// Default implementation delegates to
    /// [`reference_weight_ppb`](Self::reference_weight_ppb).
    fn node_weight_ppb(
        &self,
        node: &Node,
        citation_floor: u32,
        now: DateTime<Utc>,
    ) -> Result<u128, WeightError> {
        self.reference_weight_ppb(
            node.created_at,
            now,
            node.citation_count.max(citation_floor),
            node.creativity_ppb,
        )
    }
}
