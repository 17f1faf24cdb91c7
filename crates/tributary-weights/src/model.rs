//! Reference weight model implementing the [`WeightModel`] trait.

use chrono::{DateTime, Utc};

use tributary_core::constants::FACTOR_PRECISION;
use tributary_core::error::WeightError;
use tributary_core::traits::WeightModel;

use crate::priority::time_priority_ppb;

/// Reference weight of a node: `citation_count × time_priority × creativity`.
///
/// Result is in ppb (`u128`). A node with zero citations or zero creativity
/// weighs nothing regardless of age.
pub fn reference_weight_ppb(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    citation_count: u32,
    creativity_ppb: u64,
) -> Result<u128, WeightError> {
    let time = time_priority_ppb(created_at, now) as u128;
    let product = (citation_count as u128)
        .checked_mul(time)
        .and_then(|p| p.checked_mul(creativity_ppb as u128))
        .ok_or(WeightError::ArithmeticOverflow)?;
    Ok(product / FACTOR_PRECISION as u128)
}

/// The production weight model.
///
/// Stateless; the evaluation instant is passed per call so one model can
/// serve many engines with different clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceModel;

impl ReferenceModel {
    /// Create a new ReferenceModel.
    pub fn new() -> Self {
        Self
    }
}

impl WeightModel for ReferenceModel {
    fn time_priority_ppb(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        time_priority_ppb(created_at, now)
    }

    fn reference_weight_ppb(
        &self,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
        citation_count: u32,
        creativity_ppb: u64,
    ) -> Result<u128, WeightError> {
        reference_weight_ppb(created_at, now, citation_count, creativity_ppb)
    }
}
