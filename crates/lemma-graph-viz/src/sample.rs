//! Sample graph document for demonstration purposes.

use lemma_graph_core::{GraphDocument, GraphEdge, GraphNode, NodeProperties};

fn node(
    id: &str,
    lemma: &str,
    bc: f64,
    color: Option<&str>,
    community: Option<u64>,
) -> GraphNode {
    GraphNode {
        node_id: id.to_string(),
        properties: NodeProperties {
            lemma: lemma.to_string(),
            betweenness_centrality: bc,
            color: color.map(str::to_string),
            community,
            position_x: None,
            position_y: None,
        },
    }
}

fn edge(from: &str, to: &str, weight: f64) -> GraphEdge {
    GraphEdge {
        source_node_id: from.to_string(),
        target_node_id: to.to_string(),
        weight,
    }
}

/// Create a small concept graph for the native runner and demos.
///
/// Centralities span the full size range so the sizing and label rules are
/// visible, one cluster is community-colored, and one node carries an
/// explicit color.
pub fn create_sample_document() -> GraphDocument {
    GraphDocument {
        nodes: vec![
            node("n0", "thermodynamics", 0.92, None, Some(1)),
            node("n1", "entropy", 0.75, None, Some(1)),
            node("n2", "enthalpy", 0.31, None, Some(1)),
            node("n3", "free energy", 0.48, None, Some(1)),
            node("n4", "statistical mechanics", 0.88, None, Some(2)),
            node("n5", "partition function", 0.22, None, Some(2)),
            node("n6", "microstate", 0.05, None, Some(2)),
            node("n7", "temperature", 0.55, Some("#d97706"), None),
            node("n8", "heat capacity", 0.0, None, None),
        ],
        edges: vec![
            edge("n0", "n1", 12.0),
            edge("n0", "n2", 6.0),
            edge("n0", "n3", 8.0),
            edge("n1", "n4", 9.0),
            edge("n4", "n5", 5.0),
            edge("n5", "n6", 2.0),
            edge("n0", "n7", 10.0),
            edge("n7", "n8", 1.0),
            edge("n1", "n3", 3.0),
        ],
    }
}
