//! Validated citation graph.
//!
//! An immutable adjacency structure over nodes and directed citation edges.
//! All structural validation happens at construction; a successfully built
//! graph can be walked without re-checking invariants.

use std::collections::HashMap;

use tributary_core::error::GraphError;
use tributary_core::types::{Edge, Node};

/// Immutable citation graph snapshot.
///
/// Outgoing edges are stored per citer, sorted by `(to_id, weight_ppb)` for
/// deterministic iteration. Incoming citation counts are precomputed; the
/// engine uses them as a floor under each node's declared `citation_count`.
#[derive(Debug, Clone)]
pub struct CitationGraph {
    nodes: HashMap<String, Node>,
    outgoing: HashMap<String, Vec<Edge>>,
    incoming: HashMap<String, u32>,
    edge_count: usize,
}

impl CitationGraph {
    /// Build and validate a graph from node and edge sets.
    ///
    /// Fails on: any node/edge field invariant violation, a duplicate node
    /// id, an edge referencing a node not in the set, or a self-loop.
    /// There is no partial construction; the first defect aborts the build.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut by_id: HashMap<String, Node> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            node.validate()?;
            if by_id.contains_key(&node.id) {
                return Err(GraphError::DuplicateNodeId(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }

        let mut outgoing: HashMap<String, Vec<Edge>> = HashMap::new();
        let mut incoming: HashMap<String, u32> = HashMap::new();
        let edge_count = edges.len();
        for edge in edges {
            edge.validate()?;
            if !by_id.contains_key(&edge.from_id) {
                return Err(GraphError::UnknownEndpoint(edge.from_id));
            }
            if !by_id.contains_key(&edge.to_id) {
                return Err(GraphError::UnknownEndpoint(edge.to_id));
            }
            *incoming.entry(edge.to_id.clone()).or_insert(0) += 1;
            outgoing.entry(edge.from_id.clone()).or_default().push(edge);
        }

        for list in outgoing.values_mut() {
            list.sort_by(|a, b| {
                a.to_id
                    .cmp(&b.to_id)
                    .then(a.weight_ppb.cmp(&b.weight_ppb))
            });
        }

        Ok(Self {
            nodes: by_id,
            outgoing,
            incoming,
            edge_count,
        })
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Whether the graph contains a node with this id.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Edges citing out of `id`, in deterministic `(to_id, weight)` order.
    /// Empty slice for unknown ids or nodes that cite nothing.
    pub fn outgoing_edges(&self, id: &str) -> &[Edge] {
        self.outgoing.get(id).map_or(&[], Vec::as_slice)
    }

    /// Number of edges naming `id` as their cited target. 0 if none.
    pub fn incoming_citation_count(&self, id: &str) -> u32 {
        self.incoming.get(id).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterate all nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tributary_core::constants::FACTOR_PRECISION;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn node(id: &str) -> Node {
        Node::new(id, format!("user_{id}"), ts())
    }

    #[test]
    fn builds_and_indexes_edges() {
        let graph = CitationGraph::new(
            vec![node("a"), node("b"), node("c")],
            vec![Edge::new("a", "b"), Edge::new("a", "c"), Edge::new("b", "c")],
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.outgoing_edges("a").len(), 2);
        assert_eq!(graph.outgoing_edges("c").len(), 0);
        assert_eq!(graph.incoming_citation_count("c"), 2);
        assert_eq!(graph.incoming_citation_count("a"), 0);
    }

    #[test]
    fn outgoing_edges_sorted_by_target_then_weight() {
        let graph = CitationGraph::new(
            vec![node("a"), node("b"), node("c")],
            vec![
                Edge::new("a", "c").with_weight_ppb(2 * FACTOR_PRECISION),
                Edge::new("a", "b"),
                Edge::new("a", "c").with_weight_ppb(FACTOR_PRECISION),
            ],
        )
        .unwrap();

        let targets: Vec<(&str, u64)> = graph
            .outgoing_edges("a")
            .iter()
            .map(|e| (e.to_id.as_str(), e.weight_ppb))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("b", FACTOR_PRECISION),
                ("c", FACTOR_PRECISION),
                ("c", 2 * FACTOR_PRECISION),
            ]
        );
    }

    #[test]
    fn rejects_duplicate_node() {
        let err = CitationGraph::new(vec![node("a"), node("a")], vec![]).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNodeId(id) if id == "a"));
    }

    #[test]
    fn rejects_dangling_edge() {
        let err =
            CitationGraph::new(vec![node("a")], vec![Edge::new("a", "ghost")]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownEndpoint(id) if id == "ghost"));
    }

    #[test]
    fn rejects_self_loop() {
        let err = CitationGraph::new(vec![node("a")], vec![Edge::new("a", "a")]).unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop(_)));
    }

    #[test]
    fn rejects_invalid_node_fields() {
        let bad = Node::new("a", "ua", ts()).with_propagation_ppb(FACTOR_PRECISION + 1);
        assert!(matches!(
            CitationGraph::new(vec![bad], vec![]),
            Err(GraphError::PropagationRateOutOfRange { .. })
        ));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let graph = CitationGraph::new(vec![node("a")], vec![]).unwrap();
        assert!(matches!(
            graph.node("nope"),
            Err(GraphError::NodeNotFound(id)) if id == "nope"
        ));
    }
}
