//! JSON snapshot parsing.
//!
//! Snapshot shape:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "design-doc", "creator_id": "alice",
//!       "created_at": "2025-11-02T00:00:00Z", "citation_count": 3,
//!       "creativity_factor": "1.5", "propagation_rate": "0.3",
//!       "estimated_hours": "40", "actual_hours": "55" }
//!   ],
//!   "edges": [ { "from": "impl", "to": "design-doc", "weight": "1" } ]
//! }
//! ```
//!
//! All fractional fields are decimal strings; they convert to ppb fixed
//! point exactly (up to nine digits). Hours convert to whole minutes.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use tributary_core::constants::{FACTOR_PRECISION, UNASSIGNED_CREATOR};
use tributary_core::fixed::parse_factor_ppb;
use tributary_core::types::{Edge, Node};

use crate::error::ImportError;

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    creator_id: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    citation_count: u32,
    #[serde(default)]
    creativity_factor: Option<String>,
    #[serde(default)]
    propagation_rate: Option<String>,
    #[serde(default)]
    estimated_hours: Option<String>,
    #[serde(default)]
    actual_hours: Option<String>,
}

#[derive(Deserialize)]
struct RawEdge {
    from: String,
    to: String,
    #[serde(default)]
    weight: Option<String>,
}

/// A recoverable defect found while importing. The snapshot still loads;
/// the offending row is repaired or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// A node id appeared more than once; the first occurrence wins.
    DuplicateNode { id: String },
    /// An edge referenced a node the snapshot does not contain; dropped.
    DanglingEdge { from: String, to: String },
    /// An edge cited its own source node; dropped.
    SelfLoopEdge { id: String },
    /// An edge carried a zero weight; dropped.
    ZeroWeightEdge { from: String, to: String },
    /// A node named no creator; assigned the unassigned placeholder.
    MissingCreator { id: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { id } => write!(f, "duplicate node id {id}, first kept"),
            Self::DanglingEdge { from, to } => {
                write!(f, "edge {from} -> {to} references an unknown node, dropped")
            }
            Self::SelfLoopEdge { id } => write!(f, "self-loop edge on {id}, dropped"),
            Self::ZeroWeightEdge { from, to } => {
                write!(f, "edge {from} -> {to} has zero weight, dropped")
            }
            Self::MissingCreator { id } => {
                write!(f, "node {id} has no creator, assigned {UNASSIGNED_CREATOR}")
            }
        }
    }
}

/// Result of a snapshot import: graph-ready values plus what was repaired.
#[derive(Debug, Clone)]
pub struct Imported {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub warnings: Vec<ImportWarning>,
}

fn factor_field(
    id: &str,
    field: &'static str,
    value: Option<&str>,
    default_ppb: u64,
) -> Result<u64, ImportError> {
    match value {
        None => Ok(default_ppb),
        Some(text) => parse_factor_ppb(text).map_err(|source| ImportError::InvalidFactor {
            id: id.to_string(),
            field,
            source,
        }),
    }
}

/// Decimal hours ("40", "0.5") to whole minutes, rounding down.
fn hours_to_minutes(
    id: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<u64>, ImportError> {
    let Some(text) = value else {
        return Ok(None);
    };
    let hours_ppb = parse_factor_ppb(text).map_err(|source| ImportError::InvalidFactor {
        id: id.to_string(),
        field,
        source,
    })?;
    Ok(Some(
        (hours_ppb as u128 * 60 / FACTOR_PRECISION as u128) as u64,
    ))
}

/// Parse a JSON snapshot into nodes, edges, and warnings.
pub fn parse_snapshot(json: &str) -> Result<Imported, ImportError> {
    let raw: RawSnapshot = serde_json::from_str(json)?;
    let mut warnings = Vec::new();

    let mut seen: HashSet<String> = HashSet::new();
    let mut nodes: Vec<Node> = Vec::with_capacity(raw.nodes.len());
    for raw_node in raw.nodes {
        if raw_node.id.is_empty() {
            return Err(ImportError::EmptyNodeId);
        }
        if !seen.insert(raw_node.id.clone()) {
            warnings.push(ImportWarning::DuplicateNode {
                id: raw_node.id.clone(),
            });
            continue;
        }

        let creator_id = match raw_node.creator_id.as_deref() {
            Some(creator) if !creator.is_empty() => creator.to_string(),
            _ => {
                warnings.push(ImportWarning::MissingCreator {
                    id: raw_node.id.clone(),
                });
                UNASSIGNED_CREATOR.to_string()
            }
        };

        let node = Node {
            creator_id,
            created_at: raw_node.created_at,
            citation_count: raw_node.citation_count,
            creativity_ppb: factor_field(
                &raw_node.id,
                "creativity_factor",
                raw_node.creativity_factor.as_deref(),
                FACTOR_PRECISION,
            )?,
            propagation_ppb: factor_field(
                &raw_node.id,
                "propagation_rate",
                raw_node.propagation_rate.as_deref(),
                0,
            )?,
            estimated_minutes: hours_to_minutes(
                &raw_node.id,
                "estimated_hours",
                raw_node.estimated_hours.as_deref(),
            )?,
            actual_minutes: hours_to_minutes(
                &raw_node.id,
                "actual_hours",
                raw_node.actual_hours.as_deref(),
            )?,
            id: raw_node.id,
        };
        nodes.push(node);
    }

    let mut edges: Vec<Edge> = Vec::with_capacity(raw.edges.len());
    for raw_edge in raw.edges {
        if raw_edge.from.is_empty() || raw_edge.to.is_empty() {
            return Err(ImportError::EmptyEdgeEndpoint {
                from: raw_edge.from,
                to: raw_edge.to,
            });
        }
        if raw_edge.from == raw_edge.to {
            warnings.push(ImportWarning::SelfLoopEdge { id: raw_edge.from });
            continue;
        }
        if !seen.contains(&raw_edge.from) || !seen.contains(&raw_edge.to) {
            warnings.push(ImportWarning::DanglingEdge {
                from: raw_edge.from,
                to: raw_edge.to,
            });
            continue;
        }
        let weight_ppb = match raw_edge.weight.as_deref() {
            None => FACTOR_PRECISION,
            Some(text) => match parse_factor_ppb(text) {
                Ok(0) => {
                    warnings.push(ImportWarning::ZeroWeightEdge {
                        from: raw_edge.from,
                        to: raw_edge.to,
                    });
                    continue;
                }
                Ok(ppb) => ppb,
                Err(source) => {
                    return Err(ImportError::InvalidEdgeWeight {
                        from: raw_edge.from,
                        to: raw_edge.to,
                        source,
                    });
                }
            },
        };
        edges.push(Edge {
            from_id: raw_edge.from,
            to_id: raw_edge.to,
            weight_ppb,
        });
    }

    for warning in &warnings {
        warn!(%warning, "snapshot defect repaired");
    }

    Ok(Imported {
        nodes,
        edges,
        warnings,
    })
}
