//! Allocation aggregation for reporting.
//!
//! Pure folds over an allocation list: per-user totals split by direct vs.
//! propagated share, and per-level statistics. The engine never calls these;
//! they exist for the consumers that present results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tributary_core::types::{Allocation, AllocationSource};

/// Per-user rollup of one distribution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: String,
    /// Cents credited at the trigger node (level 0).
    pub direct: u64,
    /// Cents credited through upstream propagation.
    pub propagated: u64,
    /// Number of allocations contributing to this user.
    pub allocations: usize,
}

impl UserSummary {
    pub fn total(&self) -> u64 {
        self.direct + self.propagated
    }
}

/// Fold allocations into per-user summaries, ordered by descending total
/// then ascending user id.
pub fn summarize(allocations: &[Allocation]) -> Vec<UserSummary> {
    let mut by_user: BTreeMap<&str, UserSummary> = BTreeMap::new();
    for allocation in allocations {
        let entry = by_user
            .entry(&allocation.user_id)
            .or_insert_with(|| UserSummary {
                user_id: allocation.user_id.clone(),
                direct: 0,
                propagated: 0,
                allocations: 0,
            });
        match allocation.source {
            AllocationSource::Direct => entry.direct += allocation.amount,
            AllocationSource::Propagation => entry.propagated += allocation.amount,
        }
        entry.allocations += 1;
    }

    let mut summaries: Vec<UserSummary> = by_user.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    summaries
}

/// Per-level count and total, ascending by level.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelStats {
    pub level: u32,
    pub count: usize,
    pub total: u64,
}

/// Fold allocations into per-propagation-level statistics.
pub fn level_stats(allocations: &[Allocation]) -> Vec<LevelStats> {
    let mut by_level: BTreeMap<u32, LevelStats> = BTreeMap::new();
    for allocation in allocations {
        let entry = by_level.entry(allocation.level).or_insert(LevelStats {
            level: allocation.level,
            count: 0,
            total: 0,
        });
        entry.count += 1;
        entry.total += allocation.amount;
    }
    by_level.into_values().collect()
}

/// Sum of all allocation amounts, in cents.
pub fn total_cents(allocations: &[Allocation]) -> u64 {
    allocations.iter().map(|a| a.amount).sum()
}
