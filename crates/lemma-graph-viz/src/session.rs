//! Render sessions: one committed set of visual attributes bound to a
//! mounted drawing surface.
//!
//! A [`RenderSession`] is built in full from one document (no incremental
//! diffing) and torn down before any replacement exists. The [`SessionSlot`]
//! is the single owned handle enforcing that discipline.

use std::collections::HashMap;

use egui::{Align2, FontId, Pos2, Stroke};
use lemma_graph_core::{GraphDocument, SanitizeReport};
use petgraph::stable_graph::StableDiGraph;
use tracing::debug;

use crate::encode::{
    edge_base_color, label_color, resolve_edge_visuals, resolve_node_visuals, CentralityRange,
    EdgeVisuals, NodeVisuals, ScatterRng,
};

/// Padding between the panel border and the outermost node centers.
const SURFACE_MARGIN: f32 = 32.0;

/// A live rendering instance for one document.
///
/// Holds the fully computed scene; drawing maps document coordinates into
/// whatever rect the surface currently occupies, so surface resizes need no
/// rebuild.
pub struct RenderSession {
    scene: StableDiGraph<NodeVisuals, EdgeVisuals>,
    report: SanitizeReport,
}

impl RenderSession {
    /// Compute all visual attributes for `document` in one pass.
    ///
    /// The document is sanitized first: dangling edges and negative values
    /// are dropped (with warnings) rather than aborting the pass. A document
    /// with zero nodes yields an empty session.
    pub fn build(document: &GraphDocument, rng: &mut ScatterRng) -> Self {
        let (clean, report) = document.sanitize();
        let mut scene = StableDiGraph::new();

        if let Some(range) = CentralityRange::from_nodes(&clean.nodes) {
            let mut id_to_index = HashMap::new();
            for node in &clean.nodes {
                let idx = scene.add_node(resolve_node_visuals(node, &range, rng));
                id_to_index.insert(node.node_id.as_str(), idx);
            }
            for edge in &clean.edges {
                if let (Some(&from), Some(&to)) = (
                    id_to_index.get(edge.source_node_id.as_str()),
                    id_to_index.get(edge.target_node_id.as_str()),
                ) {
                    scene.add_edge(from, to, resolve_edge_visuals(edge.weight));
                }
            }
        }

        debug!(
            nodes = scene.node_count(),
            edges = scene.edge_count(),
            "render session built"
        );
        Self { scene, report }
    }

    /// Number of nodes committed to the scene.
    pub fn node_count(&self) -> usize {
        self.scene.node_count()
    }

    /// Number of edges committed to the scene.
    pub fn edge_count(&self) -> usize {
        self.scene.edge_count()
    }

    /// What the sanitize pass removed while building this session.
    pub fn sanitize_report(&self) -> SanitizeReport {
        self.report
    }

    /// Computed node visuals, in document node order.
    pub fn node_visuals(&self) -> impl Iterator<Item = &NodeVisuals> {
        self.scene.node_indices().map(|idx| &self.scene[idx])
    }

    /// Computed edge visuals, in document edge order.
    pub fn edge_visuals(&self) -> impl Iterator<Item = &EdgeVisuals> {
        self.scene.edge_indices().map(|idx| &self.scene[idx])
    }

    /// Paint the scene into the surface: edges under nodes, labels on top.
    pub fn draw(&self, ui: &mut egui::Ui, dark_mode: bool) {
        let Some(bounds) = self.document_bounds() else {
            return;
        };
        let rect = ui.max_rect();
        let painter = ui.painter();

        let span_x = (bounds.1.x - bounds.0.x).max(f32::EPSILON);
        let span_y = (bounds.1.y - bounds.0.y).max(f32::EPSILON);
        let usable_w = (rect.width() - 2.0 * SURFACE_MARGIN).max(1.0);
        let usable_h = (rect.height() - 2.0 * SURFACE_MARGIN).max(1.0);
        let to_screen = |p: Pos2| {
            egui::pos2(
                rect.left() + SURFACE_MARGIN + (p.x - bounds.0.x) / span_x * usable_w,
                rect.top() + SURFACE_MARGIN + (p.y - bounds.0.y) / span_y * usable_h,
            )
        };

        let edge_color = edge_base_color(dark_mode);
        for edge_idx in self.scene.edge_indices() {
            let thickness = self.scene[edge_idx].thickness;
            if thickness <= 0.0 {
                continue;
            }
            if let Some((from, to)) = self.scene.edge_endpoints(edge_idx) {
                painter.line_segment(
                    [to_screen(self.scene[from].pos), to_screen(self.scene[to].pos)],
                    Stroke::new(thickness, edge_color),
                );
            }
        }

        for idx in self.scene.node_indices() {
            let visuals = &self.scene[idx];
            let center = to_screen(visuals.pos);
            painter.circle_filled(center, visuals.size, visuals.fill);
        }

        let text_color = label_color(dark_mode);
        for idx in self.scene.node_indices() {
            let visuals = &self.scene[idx];
            if visuals.label.is_empty() {
                continue;
            }
            let center = to_screen(visuals.pos);
            painter.text(
                center - egui::vec2(0.0, visuals.size + 4.0),
                Align2::CENTER_BOTTOM,
                &visuals.label,
                FontId::proportional(12.0),
                text_color,
            );
        }
    }

    fn document_bounds(&self) -> Option<(Pos2, Pos2)> {
        let mut iter = self.scene.node_indices().map(|idx| self.scene[idx].pos);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| {
            (
                egui::pos2(lo.x.min(p.x), lo.y.min(p.y)),
                egui::pos2(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Some((min, max))
    }
}

/// Single-slot owner of the current session per surface.
///
/// At most one session is alive at any observation point. Replacement always
/// tears the previous session down first, so a panic during a rebuild leaves
/// the slot empty rather than holding a stale binding.
#[derive(Default)]
pub struct SessionSlot {
    current: Option<RenderSession>,
}

impl SessionSlot {
    /// Tear down the previous session, then build one for `document`.
    pub fn rebuild(&mut self, document: &GraphDocument, rng: &mut ScatterRng) {
        self.current = None;
        self.current = Some(RenderSession::build(document, rng));
    }

    /// Release the active session, if any.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The active session, if one exists.
    pub fn active(&self) -> Option<&RenderSession> {
        self.current.as_ref()
    }

    /// True when a session is bound.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_graph_core::{GraphEdge, GraphNode, NodeProperties};

    fn node(id: &str, bc: f64) -> GraphNode {
        GraphNode {
            node_id: id.to_string(),
            properties: NodeProperties {
                lemma: format!("lemma-{id}"),
                betweenness_centrality: bc,
                color: None,
                community: None,
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

    #[test]
    fn two_node_scenario_matches_encoding_rules() {
        // nodes bc {0, 10}, one zero-weight edge
        let doc = GraphDocument {
            nodes: vec![node("1", 0.0), node("2", 10.0)],
            edges: vec![edge("1", "2", 0.0)],
        };
        let session = RenderSession::build(&doc, &mut ScatterRng::default());

        let visuals: Vec<_> = session.node_visuals().collect();
        assert_eq!(visuals[0].size, 5.0);
        assert_eq!(visuals[1].size, 40.0);
        assert_eq!(visuals[0].label, "");
        assert_eq!(visuals[1].label, "lemma-2");

        let edges: Vec<_> = session.edge_visuals().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].thickness, 0.0);
    }

    #[test]
    fn dangling_edge_is_dropped_without_aborting() {
        let doc = GraphDocument {
            nodes: vec![node("1", 1.0), node("2", 2.0)],
            edges: vec![edge("1", "999", 4.0), edge("1", "2", 4.0)],
        };
        let session = RenderSession::build(&doc, &mut ScatterRng::default());
        assert_eq!(session.node_count(), 2);
        assert_eq!(session.edge_count(), 1);
        assert_eq!(session.sanitize_report().dropped_edges, 1);
    }

    #[test]
    fn empty_document_yields_empty_session() {
        let session = RenderSession::build(&GraphDocument::empty(), &mut ScatterRng::default());
        assert_eq!(session.node_count(), 0);
        assert_eq!(session.edge_count(), 0);
    }

    #[test]
    fn supplied_positions_survive_to_the_scene() {
        let mut a = node("a", 1.0);
        a.properties.position_x = Some(10.0);
        a.properties.position_y = Some(20.0);
        let doc = GraphDocument {
            nodes: vec![a, node("b", 2.0)],
            edges: vec![],
        };
        let session = RenderSession::build(&doc, &mut ScatterRng::new(3));
        let visuals: Vec<_> = session.node_visuals().collect();
        assert_eq!(visuals[0].pos, egui::pos2(10.0, 20.0));
        // the other node was scattered into the bounded range
        assert!((0.0..crate::encode::SCATTER_RANGE).contains(&visuals[1].pos.x));
        assert!((0.0..crate::encode::SCATTER_RANGE).contains(&visuals[1].pos.y));
    }

    #[test]
    fn slot_holds_at_most_one_session() {
        let mut slot = SessionSlot::default();
        assert!(!slot.is_active());

        let doc_a = GraphDocument {
            nodes: vec![node("a", 1.0)],
            edges: vec![],
        };
        let mut rng = ScatterRng::default();
        slot.rebuild(&doc_a, &mut rng);
        assert!(slot.is_active());
        assert_eq!(slot.active().unwrap().node_count(), 1);

        let doc_b = GraphDocument {
            nodes: vec![node("a", 1.0), node("b", 2.0)],
            edges: vec![],
        };
        slot.rebuild(&doc_b, &mut rng);
        assert_eq!(slot.active().unwrap().node_count(), 2);

        slot.clear();
        assert!(!slot.is_active());
        assert!(slot.active().is_none());
    }
}
