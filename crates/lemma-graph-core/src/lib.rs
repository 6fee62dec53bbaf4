//! Core domain types shared across the Lemma-Graph workspace.
//!
//! A [`GraphDocument`] is the unit exchanged between the backend and the
//! renderer: extracted concepts (lemmas) as nodes, weighted relations as
//! edges. The types mirror the backend's JSON wire format field-for-field.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-node attributes as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    /// Display text for the node's label.
    pub lemma: String,
    /// Importance score driving rendered size. Non-negative in well-formed
    /// documents.
    pub betweenness_centrality: f64,
    /// Explicit color (`#rgb` / `#rrggbb`), highest precedence when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Cluster identifier used for derived coloring when no explicit color
    /// is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<u64>,
    /// Pre-computed layout x coordinate, if the backend ran a layout pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    /// Pre-computed layout y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
}

/// A single extracted concept in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier, key within one document.
    pub node_id: String,
    /// Display and encoding attributes.
    pub properties: NodeProperties,
}

/// A weighted relation between two concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Identifier of the originating node.
    pub source_node_id: String,
    /// Identifier of the destination node.
    pub target_node_id: String,
    /// Relation strength driving rendered thickness. Non-negative in
    /// well-formed documents.
    pub weight: f64,
}

/// The full graph payload served for one analyzed context.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// All nodes in the document.
    pub nodes: Vec<GraphNode>,
    /// All edges; endpoints must reference identifiers in `nodes`.
    pub edges: Vec<GraphEdge>,
}

/// Counts of items removed by [`GraphDocument::sanitize`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Nodes dropped for negative centrality.
    pub dropped_nodes: usize,
    /// Edges dropped for dangling endpoints or negative weight.
    pub dropped_edges: usize,
}

impl SanitizeReport {
    /// True when nothing was removed.
    pub fn is_clean(&self) -> bool {
        self.dropped_nodes == 0 && self.dropped_edges == 0
    }
}

impl GraphDocument {
    /// Creates an empty document with no nodes or edges.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of nodes currently tracked.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges currently tracked.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when the document holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Produce a copy with malformed pieces removed.
    ///
    /// Dropped, with a warning per category:
    /// - nodes with negative betweenness centrality (and their incident edges),
    /// - edges referencing a node id not present in the document,
    /// - edges with negative weight.
    ///
    /// A well-formed document comes back unchanged with a clean report. The
    /// remaining order of nodes and edges is preserved.
    pub fn sanitize(&self) -> (GraphDocument, SanitizeReport) {
        let mut report = SanitizeReport::default();

        let nodes: Vec<GraphNode> = self
            .nodes
            .iter()
            .filter(|n| n.properties.betweenness_centrality >= 0.0)
            .cloned()
            .collect();
        report.dropped_nodes = self.nodes.len() - nodes.len();

        let known_ids: HashSet<&str> = nodes.iter().map(|n| n.node_id.as_str()).collect();
        let edges: Vec<GraphEdge> = self
            .edges
            .iter()
            .filter(|e| {
                e.weight >= 0.0
                    && known_ids.contains(e.source_node_id.as_str())
                    && known_ids.contains(e.target_node_id.as_str())
            })
            .cloned()
            .collect();
        report.dropped_edges = self.edges.len() - edges.len();

        if report.dropped_nodes > 0 {
            warn!(
                count = report.dropped_nodes,
                "dropping nodes with negative betweenness centrality"
            );
        }
        if report.dropped_edges > 0 {
            warn!(
                count = report.dropped_edges,
                "dropping edges with dangling endpoints or negative weight"
            );
        }

        (GraphDocument { nodes, edges }, report)
    }
}
