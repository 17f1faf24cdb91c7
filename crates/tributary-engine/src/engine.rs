//! The distribution engine.
//!
//! Walks the citation graph from a trigger node, splitting the amount at
//! each visited node into a retained share and an upstream pool. The core
//! invariant is conservation: every cent of the input appears in exactly
//! one allocation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use tributary_core::constants::FACTOR_PRECISION;
use tributary_core::error::{ConfigError, DistributionError};
use tributary_core::fixed::ratio_ppb;
use tributary_core::money;
use tributary_core::traits::WeightModel;
use tributary_core::types::{Allocation, AllocationSource, Node};
use tributary_weights::ReferenceModel;

use crate::apportion::split_pool;
use crate::config::EngineConfig;
use crate::graph::CitationGraph;

/// One cent, the smallest amount worth allocating.
const MIN_ALLOCATION_CENTS: u64 = 1;

/// Recursive revenue distributor over an immutable [`CitationGraph`].
///
/// The graph and weight model sit behind `Arc` and `distribute` takes
/// `&self`, so concurrent callers can issue independent distributions
/// against one shared instance without locking.
pub struct DistributionEngine {
    graph: Arc<CitationGraph>,
    weights: Arc<dyn WeightModel>,
    now: DateTime<Utc>,
    config: EngineConfig,
}

impl fmt::Debug for DistributionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionEngine")
            .field("now", &self.now)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DistributionEngine {
    /// Create an engine with the system clock, default configuration, and
    /// the production [`ReferenceModel`].
    pub fn new(graph: Arc<CitationGraph>) -> Self {
        Self::with_clock(graph, Utc::now())
    }

    /// Create an engine with a fixed evaluation instant.
    ///
    /// Distributions are deterministic in `now`; tests pin it.
    pub fn with_clock(graph: Arc<CitationGraph>, now: DateTime<Utc>) -> Self {
        Self {
            graph,
            weights: Arc::new(ReferenceModel::new()),
            now,
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration. Fails on invalid limits.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the weight model.
    pub fn with_weight_model(mut self, weights: Arc<dyn WeightModel>) -> Self {
        self.weights = weights;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &CitationGraph {
        &self.graph
    }

    /// Distribute `amount_cents` from `entry_node_id` across the graph.
    ///
    /// Every returned allocation carries `trigger_id`. The amounts sum to
    /// exactly `amount_cents`, and two identical calls return identical
    /// sequences. Fails only on graph defects (a visited id the graph does
    /// not contain) or arithmetic overflow in weight products.
    pub fn distribute(
        &self,
        trigger_id: &str,
        entry_node_id: &str,
        amount_cents: u64,
    ) -> Result<Vec<Allocation>, DistributionError> {
        debug!(
            trigger_id,
            entry_node_id, amount_cents, "starting distribution"
        );
        let mut allocations = Vec::new();
        self.visit(
            trigger_id,
            entry_node_id,
            amount_cents,
            0,
            &HashSet::new(),
            &mut allocations,
        )?;
        // Sub-cent entries cannot arise from apportionment; filter anyway.
        allocations.retain(|a| a.amount >= MIN_ALLOCATION_CENTS);
        Ok(allocations)
    }

    /// Propagation rate for one visit after difficulty compensation.
    ///
    /// A task that ran long against its estimate retains more (capped by
    /// `max_retention_multiplier_ppb`); one that ran short retains less,
    /// down to full propagation.
    fn effective_propagation_ppb(&self, node: &Node) -> u64 {
        let base_retention = (FACTOR_PRECISION - node.propagation_ppb) as u128;

        let difficulty_ppb = match (node.estimated_minutes, node.actual_minutes) {
            (Some(estimated), Some(actual)) if estimated > 0 && actual > 0 => {
                ratio_ppb(actual, estimated)
            }
            _ => FACTOR_PRECISION as u128,
        };
        let capped = difficulty_ppb.min(self.config.max_retention_multiplier_ppb as u128);

        let retention = (base_retention * capped / FACTOR_PRECISION as u128)
            .min(FACTOR_PRECISION as u128) as u64;
        FACTOR_PRECISION - retention
    }

    fn visit(
        &self,
        trigger_id: &str,
        node_id: &str,
        amount: u64,
        level: u32,
        path: &HashSet<String>,
        out: &mut Vec<Allocation>,
    ) -> Result<(), DistributionError> {
        if amount < MIN_ALLOCATION_CENTS {
            return Ok(());
        }

        let node = self.graph.node(node_id)?;

        let rate_ppb = if path.contains(node_id) {
            debug!(node_id, level, "cycle detected, retaining fully");
            0
        } else if level >= self.config.max_depth {
            debug!(node_id, level, "depth limit reached, retaining fully");
            0
        } else {
            self.effective_propagation_ppb(node)
        };

        let mut pool = money::scale_floor(amount, rate_ppb);
        if pool < self.config.min_propagation_cents {
            pool = 0;
        }
        let retention = amount - pool;

        if retention >= MIN_ALLOCATION_CENTS {
            out.push(Allocation {
                trigger_id: trigger_id.to_string(),
                node_id: node.id.clone(),
                user_id: node.creator_id.clone(),
                amount: retention,
                source: AllocationSource::at_level(level),
                level,
            });
        }

        if pool < MIN_ALLOCATION_CENTS {
            return Ok(());
        }

        let claimants = self.upstream_claimants(node_id)?;
        if claimants.is_empty() {
            // Nothing upstream worth crediting; the pool stays home.
            debug!(node_id, level, pool, "no weighted upstream, pool retained");
            out.push(Allocation {
                trigger_id: trigger_id.to_string(),
                node_id: node.id.clone(),
                user_id: node.creator_id.clone(),
                amount: pool,
                source: AllocationSource::at_level(level),
                level,
            });
            return Ok(());
        }

        let shares = split_pool(pool, &claimants)?;

        let mut branch_path = path.clone();
        branch_path.insert(node_id.to_string());
        for (upstream_id, share) in shares {
            if share < MIN_ALLOCATION_CENTS {
                continue;
            }
            self.visit(
                trigger_id,
                &upstream_id,
                share,
                level + 1,
                &branch_path,
                out,
            )?;
        }
        Ok(())
    }

    /// Weighted upstream set for a node's outgoing edges.
    ///
    /// Each edge contributes `reference_weight(upstream) × edge_weight`,
    /// with the upstream's citation count floored by the graph's observed
    /// incoming count. Parallel edges to the same target merge additively.
    /// Zero-weight items are dropped; the result preserves the graph's
    /// ascending target-id order.
    fn upstream_claimants(
        &self,
        node_id: &str,
    ) -> Result<Vec<(String, u128)>, DistributionError> {
        let mut claimants: Vec<(String, u128)> = Vec::new();
        for edge in self.graph.outgoing_edges(node_id) {
            let upstream = self.graph.node(&edge.to_id)?;
            let citation_floor = self.graph.incoming_citation_count(&upstream.id);
            let node_weight = self
                .weights
                .node_weight_ppb(upstream, citation_floor, self.now)?;
            let combined = node_weight
                .checked_mul(edge.weight_ppb as u128)
                .ok_or(DistributionError::ArithmeticOverflow)?
                / FACTOR_PRECISION as u128;
            if combined == 0 {
                continue;
            }
            match claimants.last_mut() {
                Some((id, weight)) if *id == upstream.id => {
                    *weight = weight
                        .checked_add(combined)
                        .ok_or(DistributionError::ArithmeticOverflow)?;
                }
                _ => claimants.push((upstream.id.clone(), combined)),
            }
        }
        Ok(claimants)
    }
}
