//! Filter and aggregation pipeline.
//!
//! Turns the full node/edge lists of a partition plus the user's filter
//! thresholds into the visible subgraph and its summary statistics. The
//! pipeline is pure: the same inputs always produce the same output.

use crate::models::{Edge, Measure, Node};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Label used to group nodes that carry no label for a measure.
pub const MISSING_LABEL: &str = "None";

/// Which communities pass the community predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CommunitySelector {
    /// No community filter.
    #[default]
    All,
    /// Any node that was assigned a community.
    NonNull,
    /// Exactly this community.
    Id(i64),
}

impl FromStr for CommunitySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CommunitySelector::All),
            "nonnull" | "non-null" => Ok(CommunitySelector::NonNull),
            other => other.parse::<i64>().map(CommunitySelector::Id).map_err(|_| {
                format!(
                    "Invalid community '{}': expected 'all', 'nonnull' or a community id",
                    s
                )
            }),
        }
    }
}

impl TryFrom<String> for CommunitySelector {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CommunitySelector> for String {
    fn from(value: CommunitySelector) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CommunitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunitySelector::All => write!(f, "all"),
            CommunitySelector::NonNull => write!(f, "nonnull"),
            CommunitySelector::Id(id) => write!(f, "{}", id),
        }
    }
}

impl CommunitySelector {
    /// Whether a node's community passes this selector.
    pub fn matches(&self, community: Option<i64>) -> bool {
        match self {
            CommunitySelector::All => true,
            CommunitySelector::NonNull => community.is_some(),
            CommunitySelector::Id(id) => community == Some(*id),
        }
    }
}

/// Filter thresholds chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Maximum number of visible nodes (at least 1).
    pub node_limit: usize,
    pub community: CommunitySelector,
    pub min_risk: f64,
    pub min_sentiment: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            node_limit: 500,
            community: CommunitySelector::All,
            min_risk: 0.0,
            min_sentiment: 0.0,
        }
    }
}

impl FilterParams {
    /// Whether a node passes the community, risk and sentiment predicates.
    pub fn admits(&self, node: &Node) -> bool {
        self.community.matches(node.community)
            && node.risk_intensity >= self.min_risk
            && node.sentiment_intensity >= self.min_sentiment
    }
}

/// Mean scores over the visible nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanScores {
    pub risk: f64,
    pub sentiment: f64,
    pub degree: f64,
}

/// Nodes sharing one dominant label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub label: String,
    pub count: usize,
    /// Share of the visible nodes, 0-100.
    pub percentage: f64,
    pub mean_intensity: f64,
}

/// Per-label breakdown for one measure, highest mean intensity first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBreakdown {
    pub measure: Measure,
    pub groups: Vec<LabelGroup>,
}

/// Summary statistics over the visible nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Distinct community values, counting "no community" as one group.
    pub community_count: usize,
    /// `None` when no node matches; there is no mean of nothing.
    pub means: Option<MeanScores>,
    pub breakdowns: Vec<LabelBreakdown>,
}

impl GraphStats {
    /// True when no node passed the filters.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn breakdown(&self, measure: Measure) -> Option<&LabelBreakdown> {
        self.breakdowns.iter().find(|b| b.measure == measure)
    }
}

/// The render-ready subgraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleGraph<'a> {
    pub nodes: Vec<&'a Node>,
    pub edges: Vec<&'a Edge>,
    pub stats: GraphStats,
}

/// Compute the visible nodes, edges and statistics for a set of filters.
///
/// Nodes without any incident edge are never shown. Truncation keeps the
/// first `node_limit` survivors in input order; rank upstream for a top-N.
pub fn compute_visible_graph<'a>(
    nodes: &'a [Node],
    edges: &'a [Edge],
    params: &FilterParams,
) -> VisibleGraph<'a> {
    let connected: HashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    let visible_nodes: Vec<&Node> = nodes
        .iter()
        .filter(|n| connected.contains(n.id.as_str()))
        .filter(|n| params.admits(n))
        .take(params.node_limit)
        .collect();

    let visible_ids: HashSet<&str> = visible_nodes.iter().map(|n| n.id.as_str()).collect();

    let visible_edges: Vec<&Edge> = edges
        .iter()
        .filter(|e| visible_ids.contains(e.source.as_str()) && visible_ids.contains(e.target.as_str()))
        .collect();

    let stats = summarize(&visible_nodes, visible_edges.len());

    VisibleGraph {
        nodes: visible_nodes,
        edges: visible_edges,
        stats,
    }
}

/// Summary statistics over an already filtered node list.
pub fn summarize(nodes: &[&Node], edge_count: usize) -> GraphStats {
    let community_count = nodes
        .iter()
        .map(|n| n.community)
        .collect::<BTreeSet<_>>()
        .len();

    GraphStats {
        node_count: nodes.len(),
        edge_count,
        community_count,
        means: mean_scores(nodes),
        breakdowns: Measure::ALL
            .iter()
            .map(|&measure| label_breakdown(nodes, measure))
            .collect(),
    }
}

fn mean_scores(nodes: &[&Node]) -> Option<MeanScores> {
    if nodes.is_empty() {
        return None;
    }

    let n = nodes.len() as f64;
    Some(MeanScores {
        risk: nodes.iter().map(|d| d.risk_intensity).sum::<f64>() / n,
        sentiment: nodes.iter().map(|d| d.sentiment_intensity).sum::<f64>() / n,
        degree: nodes.iter().map(|d| d.degree as f64).sum::<f64>() / n,
    })
}

/// Group nodes by their label for `measure`.
pub fn label_breakdown(nodes: &[&Node], measure: Measure) -> LabelBreakdown {
    let total = nodes.len();
    let mut grouped: BTreeMap<&str, (usize, f64)> = BTreeMap::new();

    for node in nodes {
        let label = node.label(measure).unwrap_or(MISSING_LABEL);
        let entry = grouped.entry(label).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += node.intensity(measure);
    }

    let mut groups: Vec<LabelGroup> = grouped
        .into_iter()
        .map(|(label, (count, sum))| LabelGroup {
            label: label.to_string(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
            mean_intensity: sum / count as f64,
        })
        .collect();

    // Label order breaks ties so output does not depend on hashing.
    groups.sort_by(|a, b| {
        b.mean_intensity
            .total_cmp(&a.mean_intensity)
            .then_with(|| a.label.cmp(&b.label))
    });

    LabelBreakdown { measure, groups }
}

/// Choices for the community selector, with node counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityOptions {
    /// Every node in the partition.
    pub total: usize,
    /// Nodes assigned to any community.
    pub non_null: usize,
    /// `(community id, node count)` sorted by id.
    pub communities: Vec<(i64, usize)>,
}

/// Count nodes per community for the selector.
pub fn community_options(nodes: &[Node]) -> CommunityOptions {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for community in nodes.iter().filter_map(|n| n.community) {
        *counts.entry(community).or_default() += 1;
    }

    CommunityOptions {
        total: nodes.len(),
        non_null: counts.values().sum(),
        communities: counts.into_iter().collect(),
    }
}

/// The `n` largest communities, biggest first.
pub fn top_communities(nodes: &[Node], n: usize) -> Vec<(i64, usize)> {
    let mut communities = community_options(nodes).communities;
    communities.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    communities.truncate(n);
    communities
}
