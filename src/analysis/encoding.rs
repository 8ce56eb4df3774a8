//! Visual encoding for the rendered graph.
//!
//! Styles are derived from node and edge fields on demand; nothing here is
//! stored back into the dataset.

use crate::models::{Edge, Node};
use serde::{Deserialize, Serialize};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Piecewise-linear color ramp over evenly spaced stops.
#[derive(Debug, Clone, Copy)]
pub struct Ramp(&'static [Rgb]);

/// Light to dark blue, for edges inside a community.
pub const BLUES: Ramp = Ramp(&[Rgb(247, 251, 255), Rgb(107, 174, 214), Rgb(8, 48, 107)]);

/// White to black, for edges between communities.
pub const GREYS: Ramp = Ramp(&[Rgb(255, 255, 255), Rgb(115, 115, 115), Rgb(0, 0, 0)]);

/// Red through yellow to green.
pub const RD_YL_GN: Ramp = Ramp(&[
    Rgb(165, 0, 38),
    Rgb(244, 109, 67),
    Rgb(255, 255, 191),
    Rgb(102, 189, 99),
    Rgb(0, 104, 55),
]);

/// Rainbow ramp used for community fills.
pub const TURBO: Ramp = Ramp(&[
    Rgb(48, 18, 59),
    Rgb(70, 134, 251),
    Rgb(26, 228, 182),
    Rgb(162, 252, 60),
    Rgb(250, 186, 57),
    Rgb(228, 70, 10),
    Rgb(122, 4, 3),
]);

impl Ramp {
    /// Color at `t`, clamped to [0, 1].
    pub fn at(&self, t: f64) -> Rgb {
        let stops = self.0;
        if stops.len() == 1 {
            return stops[0];
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f64;

        let (a, b) = (stops[i], stops[i + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Maps community ids onto the fill ramp over the partition's extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityScale {
    pub min: f64,
    pub max: f64,
}

impl CommunityScale {
    /// Build the scale over every node of a partition; no community counts as 0.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let values = nodes.iter().map(|n| n.community.unwrap_or(0) as f64);
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        if min.is_finite() {
            Self { min, max }
        } else {
            Self { min: 0.0, max: 0.0 }
        }
    }

    pub fn position(&self, community: Option<i64>) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.5;
        }
        (community.unwrap_or(0) as f64 - self.min) / span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub radius: f64,
    pub fill: String,
    pub fill_opacity: f64,
    pub stroke: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
    pub width: f64,
    pub opacity: f64,
    /// Both endpoints share a community (two unassigned endpoints count as shared).
    pub intra_community: bool,
}

/// Style for a node: size by pagerank, fill by community, stroke by risk.
pub fn node_style(node: &Node, scale: &CommunityScale) -> NodeStyle {
    NodeStyle {
        radius: 10.0 + 8000.0 * node.pagerank,
        fill: TURBO.at(scale.position(node.community)).hex(),
        fill_opacity: 0.4 + 0.6 * node.sentiment_intensity,
        // High risk is red: the ramp runs from risk 1 down to 0.
        stroke: RD_YL_GN.at(1.0 - node.risk_intensity).hex(),
        stroke_width: 0.5 + 2.5 * node.risk_intensity,
    }
}

/// Style for an edge: color by sentiment, width and opacity by weight.
pub fn edge_style(edge: &Edge, source: &Node, target: &Node) -> EdgeStyle {
    let intra_community = source.community == target.community;
    let t = (edge.sentiment_score + 1.0) / 2.0;
    let strength = edge.weight.ln_1p();
    let w = (strength / 5.0).min(1.0);

    let (ramp, opacity) = if intra_community {
        (BLUES, 0.3 + 0.7 * w)
    } else {
        (GREYS, 0.05 + 0.4 * w)
    };

    EdgeStyle {
        stroke: ramp.at(t).hex(),
        width: 0.4 + 0.5 * strength,
        opacity,
        intra_community,
    }
}
