//! Render-ready export of the visible subgraph.
//!
//! The force-layout front end reads this file as-is: every node and edge
//! carries its precomputed style and hover card.

use crate::analysis::encoding::{edge_style, node_style, CommunityScale, EdgeStyle, NodeStyle};
use crate::analysis::{GraphStats, VisibleGraph};
use crate::models::Node;
use crate::report::cards::{edge_hover_card, node_hover_card};
use crate::report::ReportMetadata;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub community: Option<i64>,
    pub style: NodeStyle,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub sentiment_score: f64,
    pub years: Vec<i32>,
    pub style: EdgeStyle,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderExport {
    pub metadata: ReportMetadata,
    pub stats: GraphStats,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

/// Build the export. `all_nodes` is the whole partition so community colors
/// stay stable as filters change.
pub fn build_export(
    metadata: ReportMetadata,
    all_nodes: &[Node],
    visible: &VisibleGraph<'_>,
) -> RenderExport {
    let scale = CommunityScale::from_nodes(all_nodes);
    let by_id: HashMap<&str, &Node> = visible.nodes.iter().map(|n| (n.id.as_str(), *n)).collect();

    let nodes = visible
        .nodes
        .iter()
        .map(|n| RenderNode {
            id: n.id.clone(),
            community: n.community,
            style: node_style(n, &scale),
            tooltip: node_hover_card(n),
        })
        .collect();

    // Every visible edge has both endpoints among the visible nodes.
    let edges = visible
        .edges
        .iter()
        .filter_map(|e| {
            let source = by_id.get(e.source.as_str())?;
            let target = by_id.get(e.target.as_str())?;
            Some(RenderEdge {
                source: e.source.clone(),
                target: e.target.clone(),
                weight: e.weight,
                sentiment_score: e.sentiment_score,
                years: e.years.clone(),
                style: edge_style(e, source, target),
                tooltip: edge_hover_card(e),
            })
        })
        .collect();

    RenderExport {
        metadata,
        stats: visible.stats.clone(),
        nodes,
        edges,
    }
}

pub fn generate_export_json(export: &RenderExport) -> Result<String> {
    serde_json::to_string_pretty(export).map_err(Into::into)
}
