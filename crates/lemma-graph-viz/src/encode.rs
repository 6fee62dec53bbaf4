//! Deterministic visual encoding: document attributes to pixel attributes.
//!
//! The rules are fixed so that importance and connection strength read the
//! same way on every render: node size is a linear map of betweenness
//! centrality into [5, 40] pixels, labels appear only above 20 pixels, and
//! edge thickness is `ln(weight + 1)`.

use egui::Color32;
use lemma_graph_core::{GraphNode, NodeProperties};

/// Smallest rendered node size in pixels.
pub const MIN_NODE_SIZE: f32 = 5.0;
/// Largest rendered node size in pixels.
pub const MAX_NODE_SIZE: f32 = 40.0;
/// Labels are shown only for nodes strictly larger than this.
pub const LABEL_SIZE_THRESHOLD: f32 = 20.0;
/// Synthesized fallback coordinates land in `[0, SCATTER_RANGE)` per axis.
pub const SCATTER_RANGE: f32 = 100.0;

/// Neutral fill used when a node carries no explicit or derived color.
const NEUTRAL_NODE_COLOR: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);

/// Fixed saturation for community-derived colors.
const COMMUNITY_SATURATION: f32 = 0.65;
/// Fixed lightness for community-derived colors.
const COMMUNITY_LIGHTNESS: f32 = 0.55;

/// Computed per-node attributes, ready to bind to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisuals {
    /// Position in document space.
    pub pos: egui::Pos2,
    /// Rendered size (circle radius) in pixels, in `[5, 40]`.
    pub size: f32,
    /// Fill color after the explicit/community/neutral precedence.
    pub fill: Color32,
    /// Label text; empty when the node is below the size threshold.
    pub label: String,
}

/// Computed per-edge attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeVisuals {
    /// Stroke thickness, `ln(weight + 1)`. Zero is valid and invisible.
    pub thickness: f32,
}

/// Observed betweenness-centrality range across one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralityRange {
    min: f64,
    max: f64,
}

impl CentralityRange {
    /// Scan the document's nodes; `None` when there are no nodes.
    pub fn from_nodes(nodes: &[GraphNode]) -> Option<Self> {
        let mut iter = nodes.iter().map(|n| n.properties.betweenness_centrality);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), bc| (lo.min(bc), hi.max(bc)));
        Some(Self { min, max })
    }

    /// Linear map of a centrality value into `[MIN_NODE_SIZE, MAX_NODE_SIZE]`.
    ///
    /// A degenerate range (all values equal, including one node) maps every
    /// value to the minimum size rather than dividing by zero.
    pub fn size_for(&self, bc: f64) -> f32 {
        if self.max == self.min {
            return MIN_NODE_SIZE;
        }
        let normalized = (bc - self.min) / (self.max - self.min);
        MIN_NODE_SIZE + (normalized as f32) * (MAX_NODE_SIZE - MIN_NODE_SIZE)
    }
}

/// Label text for a node of the given size; hidden at the threshold itself.
pub fn label_for(size: f32, lemma: &str) -> String {
    if size > LABEL_SIZE_THRESHOLD {
        lemma.to_string()
    } else {
        String::new()
    }
}

/// Logarithmic edge thickness. Non-negative for any weight >= 0.
pub fn edge_thickness(weight: f64) -> f32 {
    (weight + 1.0).ln() as f32
}

/// Compute the full visual attribute set for one node.
pub fn resolve_node_visuals(
    node: &GraphNode,
    range: &CentralityRange,
    rng: &mut ScatterRng,
) -> NodeVisuals {
    let props = &node.properties;
    let size = range.size_for(props.betweenness_centrality);
    let x = props
        .position_x
        .map(|v| v as f32)
        .unwrap_or_else(|| rng.next_coord());
    let y = props
        .position_y
        .map(|v| v as f32)
        .unwrap_or_else(|| rng.next_coord());

    NodeVisuals {
        pos: egui::pos2(x, y),
        size,
        fill: node_fill(props),
        label: label_for(size, &props.lemma),
    }
}

/// Compute the visual attribute set for one edge.
pub fn resolve_edge_visuals(weight: f64) -> EdgeVisuals {
    EdgeVisuals {
        thickness: edge_thickness(weight),
    }
}

/// Node fill precedence: explicit color, then community hue, then neutral.
pub fn node_fill(props: &NodeProperties) -> Color32 {
    if let Some(explicit) = props.color.as_deref().filter(|c| !c.is_empty()) {
        if let Some(color) = parse_hex_color(explicit) {
            return color;
        }
    }
    match props.community {
        Some(community) => community_color(community),
        None => NEUTRAL_NODE_COLOR,
    }
}

/// Derived color for a community cluster.
///
/// Hue steps by the golden angle so nearby community ids stay visually
/// distinct; saturation and lightness are fixed.
pub fn community_color(community: u64) -> Color32 {
    // Reduce before multiplying so huge community ids cannot overflow.
    let hue = (((community % 360) * 137) % 360) as f32;
    hsl_to_color(hue, COMMUNITY_SATURATION, COMMUNITY_LIGHTNESS)
}

/// Parse `#rgb` or `#rrggbb` into a color.
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 16 + v;
            }
            Some(Color32::from_rgb(channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        _ => None,
    }
}

/// Convert HSL (hue in degrees, s/l in [0,1]) to an egui color.
fn hsl_to_color(h: f32, s: f32, l: f32) -> Color32 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h % 360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color32::from_rgb(
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

/// Base stroke color for edges.
pub fn edge_base_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgba_unmultiplied(160, 160, 180, 140)
    } else {
        Color32::from_rgba_unmultiplied(110, 110, 130, 160)
    }
}

/// Label text color.
pub fn label_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(230, 230, 230)
    } else {
        Color32::from_rgb(30, 30, 30)
    }
}

/// Seedable pseudo-random source for fallback coordinates.
///
/// A plain xorshift; reproducibility across renders is not required, only
/// that synthesized nodes end up visually separated and that tests can pin a
/// seed.
#[derive(Debug, Clone)]
pub struct ScatterRng {
    state: u64,
}

impl ScatterRng {
    /// Create a generator from a non-zero seed (zero is remapped).
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next coordinate in `[0, SCATTER_RANGE)`.
    pub fn next_coord(&mut self) -> f32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.state = s;
        unit_from_bits(s) * SCATTER_RANGE
    }
}

/// Map state bits to `[0, 1)`. Uses only 24 bits so the f32 quotient can
/// never round up to 1.0.
fn unit_from_bits(s: u64) -> f32 {
    (s >> 40) as f32 / (1u32 << 24) as f32
}

impl Default for ScatterRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_graph_core::GraphNode;

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

    #[test]
    fn size_is_exact_linear_map() {
        let nodes = vec![node("a", 0.0), node("b", 4.0), node("c", 10.0)];
        let range = CentralityRange::from_nodes(&nodes).unwrap();
        assert_eq!(range.size_for(0.0), 5.0);
        assert_eq!(range.size_for(10.0), 40.0);
        // 5 + (4 - 0) / (10 - 0) * 35
        assert!((range.size_for(4.0) - 19.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_range_maps_everything_to_minimum() {
        let nodes = vec![node("a", 7.0), node("b", 7.0)];
        let range = CentralityRange::from_nodes(&nodes).unwrap();
        assert_eq!(range.size_for(7.0), MIN_NODE_SIZE);

        let single = vec![node("only", 3.0)];
        let range = CentralityRange::from_nodes(&single).unwrap();
        assert_eq!(range.size_for(3.0), MIN_NODE_SIZE);
    }

    #[test]
    fn empty_document_has_no_range() {
        assert!(CentralityRange::from_nodes(&[]).is_none());
    }

    #[test]
    fn label_hidden_at_threshold_shown_above() {
        assert_eq!(label_for(20.0, "boundary"), "");
        assert_eq!(label_for(20.001, "shown"), "shown");
        assert_eq!(label_for(5.0, "tiny"), "");
        assert_eq!(label_for(40.0, "big"), "big");
    }

    #[test]
    fn edge_thickness_is_log_of_weight_plus_one() {
        assert_eq!(edge_thickness(0.0), 0.0);
        assert!((edge_thickness(1.0) - std::f32::consts::LN_2).abs() < 1e-6);
        assert!(edge_thickness(100.0) > edge_thickness(10.0));
        assert!(edge_thickness(0.5) >= 0.0);
    }

    #[test]
    fn explicit_color_takes_precedence() {
        let mut props = node("a", 0.0).properties;
        props.color = Some("#ff0000".to_string());
        props.community = Some(4);
        assert_eq!(node_fill(&props), Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn empty_or_invalid_explicit_color_falls_through() {
        let mut props = node("a", 0.0).properties;
        props.color = Some(String::new());
        assert_eq!(node_fill(&props), NEUTRAL_NODE_COLOR);

        props.color = Some("not-a-color".to_string());
        props.community = Some(2);
        assert_eq!(node_fill(&props), community_color(2));
    }

    #[test]
    fn no_color_no_community_is_neutral() {
        let props = node("a", 0.0).properties;
        assert_eq!(node_fill(&props), NEUTRAL_NODE_COLOR);
    }

    #[test]
    fn hex_parsing_accepts_short_and_long_forms() {
        assert_eq!(parse_hex_color("#666"), Some(NEUTRAL_NODE_COLOR));
        assert_eq!(parse_hex_color("#666666"), Some(NEUTRAL_NODE_COLOR));
        assert_eq!(parse_hex_color("#00ff88"), Some(Color32::from_rgb(0, 255, 136)));
        assert_eq!(parse_hex_color("666"), None);
        assert_eq!(parse_hex_color("#66"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn community_colors_are_deterministic_and_distinct() {
        assert_eq!(community_color(1), community_color(1));
        assert_ne!(community_color(1), community_color(2));
        // hue stride wraps modulo 360, so id 360 aliases id 0
        assert_eq!(community_color(0), community_color(360));
    }

    #[test]
    fn community_color_handles_huge_ids() {
        // Must not overflow; u64::MAX reduces like its residue mod 360.
        assert_eq!(community_color(u64::MAX), community_color(u64::MAX % 360));
    }

    #[test]
    fn scatter_rng_stays_in_range_and_is_seedable() {
        let mut rng = ScatterRng::new(42);
        for _ in 0..1000 {
            let v = rng.next_coord();
            assert!((0.0..SCATTER_RANGE).contains(&v));
        }
        let mut a = ScatterRng::new(7);
        let mut b = ScatterRng::new(7);
        assert_eq!(a.next_coord(), b.next_coord());
    }

    #[test]
    fn unit_stays_strictly_below_one_at_the_extreme() {
        assert!(unit_from_bits(u64::MAX) < 1.0);
        assert!(unit_from_bits(u64::MAX) * SCATTER_RANGE < SCATTER_RANGE);
        assert_eq!(unit_from_bits(0), 0.0);
    }

    #[test]
    fn resolved_visuals_use_supplied_positions_verbatim() {
        let mut n = node("a", 1.0);
        n.properties.position_x = Some(12.5);
        n.properties.position_y = Some(99.0);
        let range = CentralityRange::from_nodes(std::slice::from_ref(&n)).unwrap();
        let visuals = resolve_node_visuals(&n, &range, &mut ScatterRng::default());
        assert_eq!(visuals.pos, egui::pos2(12.5, 99.0));
    }

    #[test]
    fn resolved_visuals_scatter_missing_axes() {
        let n = node("a", 1.0);
        let range = CentralityRange::from_nodes(std::slice::from_ref(&n)).unwrap();
        let visuals = resolve_node_visuals(&n, &range, &mut ScatterRng::new(9));
        assert!((0.0..SCATTER_RANGE).contains(&visuals.pos.x));
        assert!((0.0..SCATTER_RANGE).contains(&visuals.pos.y));
    }
}
