//! Core value objects: nodes, citation edges, and allocations.
//!
//! All monetary amounts are in cents; all fractional factors are
//! parts-per-billion (see [`crate::constants::FACTOR_PRECISION`]).
//! Everything here is an immutable snapshot: the engine never mutates a
//! node, edge, or allocation after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::FACTOR_PRECISION;
use crate::error::GraphError;

fn default_creativity() -> u64 {
    FACTOR_PRECISION
}

/// A node of the citation graph: one unit of attributable work.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Unique node identifier.
    pub id: String,
    /// The user credited when this node retains revenue.
    pub creator_id: String,
    /// Creation instant; older nodes receive a lower time-priority factor.
    pub created_at: DateTime<Utc>,
    /// Declared number of times this node is known to be cited.
    #[serde(default)]
    pub citation_count: u32,
    /// Creativity multiplier in ppb (1.0 by default).
    #[serde(default = "default_creativity")]
    pub creativity_ppb: u64,
    /// Fraction of incoming revenue pushed upstream, in ppb. At most 1.0.
    #[serde(default)]
    pub propagation_ppb: u64,
    /// Estimated effort in whole minutes, if tracked.
    #[serde(default)]
    pub estimated_minutes: Option<u64>,
    /// Actual effort in whole minutes, if tracked.
    #[serde(default)]
    pub actual_minutes: Option<u64>,
}

impl Node {
    /// Create a node with default factors: zero citations, creativity 1.0,
    /// nothing propagated, no effort tracking.
    pub fn new(
        id: impl Into<String>,
        creator_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            creator_id: creator_id.into(),
            created_at,
            citation_count: 0,
            creativity_ppb: FACTOR_PRECISION,
            propagation_ppb: 0,
            estimated_minutes: None,
            actual_minutes: None,
        }
    }

    pub fn with_citations(mut self, count: u32) -> Self {
        self.citation_count = count;
        self
    }

    pub fn with_creativity_ppb(mut self, creativity_ppb: u64) -> Self {
        self.creativity_ppb = creativity_ppb;
        self
    }

    pub fn with_propagation_ppb(mut self, propagation_ppb: u64) -> Self {
        self.propagation_ppb = propagation_ppb;
        self
    }

    pub fn with_effort(mut self, estimated_minutes: u64, actual_minutes: u64) -> Self {
        self.estimated_minutes = Some(estimated_minutes);
        self.actual_minutes = Some(actual_minutes);
        self
    }

    /// Check field invariants: non-empty ids, propagation rate ≤ 1.0.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.id.is_empty() {
            return Err(GraphError::EmptyNodeId);
        }
        if self.creator_id.is_empty() {
            return Err(GraphError::EmptyCreatorId(self.id.clone()));
        }
        if self.propagation_ppb > FACTOR_PRECISION {
            return Err(GraphError::PropagationRateOutOfRange {
                node_id: self.id.clone(),
                rate_ppb: self.propagation_ppb,
            });
        }
        Ok(())
    }
}

/// A directed citation: `from` cites `to`. Revenue propagated out of `from`
/// flows toward `to`, scaled by `weight_ppb`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    /// Relative edge weight in ppb. Strictly positive.
    pub weight_ppb: u64,
}

impl Edge {
    /// Create an edge with the default weight of 1.0.
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            weight_ppb: FACTOR_PRECISION,
        }
    }

    pub fn with_weight_ppb(mut self, weight_ppb: u64) -> Self {
        self.weight_ppb = weight_ppb;
        self
    }

    /// Check field invariants: no self-loops, positive weight.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.from_id.is_empty() || self.to_id.is_empty() {
            return Err(GraphError::EmptyNodeId);
        }
        if self.from_id == self.to_id {
            return Err(GraphError::SelfLoop(self.from_id.clone()));
        }
        if self.weight_ppb == 0 {
            return Err(GraphError::ZeroEdgeWeight {
                from_id: self.from_id.clone(),
                to_id: self.to_id.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_id, self.to_id)
    }
}

/// Whether an allocation was produced at the trigger node or further up
/// the citation chain.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AllocationSource {
    Direct,
    Propagation,
}

impl AllocationSource {
    /// The source for a given propagation level: `Direct` only at level 0.
    pub fn at_level(level: u32) -> Self {
        if level == 0 {
            Self::Direct
        } else {
            Self::Propagation
        }
    }
}

impl fmt::Display for AllocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Propagation => write!(f, "propagation"),
        }
    }
}

/// One line of a distribution result: `amount` cents credited to `user_id`
/// for their node `node_id`, at `level` hops from the trigger.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// External event identifier shared by every allocation of one call.
    pub trigger_id: String,
    /// The graph node being credited.
    pub node_id: String,
    /// The node's creator.
    pub user_id: String,
    /// Amount in cents.
    pub amount: u64,
    pub source: AllocationSource,
    /// Hops from the trigger node; 0 is the trigger itself.
    pub level: u32,
}
