//! Graph summary report generation.
//!
//! This module renders the statistics of a filtered partition as Markdown
//! or JSON.

use crate::analysis::{
    top_communities, CommunityOptions, FilterParams, GraphStats, LabelBreakdown, VisibleGraph,
};
use crate::models::{GraphData, Measure};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message shown when the filters leave nothing to summarize.
pub const NO_MATCHES: &str = "No nodes match current filters.";

/// Number of communities listed in the report.
const TOP_COMMUNITIES: usize = 10;

/// Metadata about a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Dataset partition (`all` or a year).
    pub partition: String,
    pub generated_at: DateTime<Utc>,
    /// Nodes in the partition before filtering.
    pub dataset_nodes: usize,
    /// Edges in the partition before filtering.
    pub dataset_edges: usize,
    /// Upstream ranking applied before truncation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked_by: Option<String>,
}

impl ReportMetadata {
    pub fn new(partition: &str, graph: &GraphData, ranked_by: Option<String>) -> Self {
        Self {
            partition: partition.to_string(),
            generated_at: Utc::now(),
            dataset_nodes: graph.nodes.len(),
            dataset_edges: graph.edges.len(),
            ranked_by,
        }
    }
}

/// Summary of one filtered partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub metadata: ReportMetadata,
    pub filters: FilterParams,
    pub stats: GraphStats,
    pub communities: CommunityOptions,
    /// Largest communities in the partition, `(id, nodes)`.
    pub top_communities: Vec<(i64, usize)>,
}

impl GraphReport {
    /// Assemble a report from a partition and its visible subgraph.
    pub fn build(
        metadata: ReportMetadata,
        graph: &GraphData,
        filters: &FilterParams,
        visible: &VisibleGraph<'_>,
    ) -> Self {
        Self {
            metadata,
            filters: filters.clone(),
            stats: visible.stats.clone(),
            communities: crate::analysis::community_options(&graph.nodes),
            top_communities: top_communities(&graph.nodes, TOP_COMMUNITIES),
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &GraphReport) -> String {
    let mut output = String::new();

    output.push_str("# Mailgraph Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_filters_section(&report.filters));
    output.push_str(&generate_summary_section(&report.stats));
    output.push_str(&generate_communities_section(report));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Partition:** {}\n", metadata.partition));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Dataset:** {} nodes, {} edges\n",
        metadata.dataset_nodes, metadata.dataset_edges
    ));
    if let Some(ref key) = metadata.ranked_by {
        section.push_str(&format!("- **Ranked By:** {}\n", key));
    }
    section.push('\n');

    section
}

fn generate_filters_section(filters: &FilterParams) -> String {
    let mut section = String::new();

    section.push_str("## Filters\n\n");
    section.push_str("| Node Limit | Community | Min Risk | Min Sentiment |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {:.2} | {:.2} |\n\n",
        filters.node_limit, filters.community, filters.min_risk, filters.min_sentiment
    ));

    section
}

/// Generate the summary section; never prints a mean of zero nodes.
pub fn generate_summary_section(stats: &GraphStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    let Some(means) = stats.means else {
        section.push_str(NO_MATCHES);
        section.push_str("\n\n");
        return section;
    };

    section.push_str(&format!("- **Communities:** {}\n", stats.community_count));
    section.push_str(&format!("- **Nodes:** {}\n", stats.node_count));
    section.push_str(&format!("- **Edges:** {}\n", stats.edge_count));
    section.push_str(&format!("- **Avg Risk:** {:.2}\n", means.risk));
    section.push_str(&format!("- **Avg Sentiment:** {:.2}\n", means.sentiment));
    section.push_str(&format!("- **Avg Degree:** {:.2}\n\n", means.degree));

    for measure in Measure::ALL {
        if let Some(breakdown) = stats.breakdown(measure) {
            section.push_str(&generate_breakdown_table(breakdown));
        }
    }

    section
}

fn generate_breakdown_table(breakdown: &LabelBreakdown) -> String {
    if breakdown.groups.is_empty() {
        return String::new();
    }

    let mut table = String::new();

    let heading = match breakdown.measure {
        Measure::Risk => "Risk Labels",
        Measure::Sentiment => "Sentiment Labels",
        Measure::Emotion => "Emotion Labels",
    };
    table.push_str(&format!("### {}\n\n", heading));
    table.push_str("| Label | Nodes | Share | Mean Intensity |\n");
    table.push_str("|:---|:---:|:---:|:---:|\n");

    for group in &breakdown.groups {
        table.push_str(&format!(
            "| {} | {} | {:.1}% | {:.3} |\n",
            group.label, group.count, group.percentage, group.mean_intensity
        ));
    }
    table.push('\n');

    table
}

fn generate_communities_section(report: &GraphReport) -> String {
    let mut section = String::new();

    section.push_str("## Communities\n\n");
    section.push_str(&format!(
        "- **All:** {} nodes\n- **Non-null:** {} nodes\n- **Distinct:** {}\n\n",
        report.communities.total,
        report.communities.non_null,
        report.communities.communities.len()
    ));

    if !report.top_communities.is_empty() {
        section.push_str("| Community | Nodes |\n");
        section.push_str("|:---|:---:|\n");
        for (id, count) in &report.top_communities {
            section.push_str(&format!("| {} | {} |\n", id, count));
        }
        section.push('\n');
    }

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by mailgraph*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &GraphReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_visible_graph, CommunitySelector};
    use crate::models::{Edge, Node};

    fn sample_graph() -> GraphData {
        let mut a = Node::new("A");
        a.community = Some(1);
        a.risk_intensity = 0.9;
        a.risk_label = Some("fraud".to_string());
        a.degree = 2;
        let mut b = Node::new("B");
        b.community = Some(1);
        b.risk_intensity = 0.1;
        b.degree = 4;
        let mut c = Node::new("C");
        c.community = Some(2);
        c.risk_intensity = 0.5;

        GraphData {
            directed: true,
            nodes: vec![a, b, c],
            edges: vec![
                Edge::new("A", "B").with_weight(2.0),
                Edge::new("B", "C"),
            ],
        }
    }

    fn report_for(filters: FilterParams) -> GraphReport {
        let graph = sample_graph();
        let visible = compute_visible_graph(&graph.nodes, &graph.edges, &filters);
        let metadata = ReportMetadata::new("all", &graph, None);
        GraphReport::build(metadata, &graph, &filters, &visible)
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = report_for(FilterParams {
            community: CommunitySelector::NonNull,
            ..FilterParams::default()
        });
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Mailgraph Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Partition:** all"));
        assert!(markdown.contains("| 500 | nonnull | 0.00 | 0.00 |"));
        assert!(markdown.contains("- **Avg Risk:** 0.50"));
        assert!(markdown.contains("- **Avg Degree:** 2.00"));
        assert!(markdown.contains("### Risk Labels"));
        assert!(markdown.contains("| fraud | 1 | 33.3% | 0.900 |"));
        assert!(markdown.contains("| 1 | 2 |"));
        assert!(!markdown.contains("NaN"));
    }

    #[test]
    fn test_empty_report_skips_means() {
        let report = report_for(FilterParams {
            community: CommunitySelector::Id(99),
            ..FilterParams::default()
        });
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains(NO_MATCHES));
        assert!(!markdown.contains("Avg Risk"));
        assert!(!markdown.contains("NaN"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = report_for(FilterParams::default());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"partition\": \"all\""));
        assert!(json.contains("\"community\": \"all\""));
        assert!(json.contains("\"breakdowns\""));

        let empty = report_for(FilterParams {
            min_risk: 2.0,
            ..FilterParams::default()
        });
        let json = generate_json_report(&empty).unwrap();
        assert!(json.contains("\"means\": null"));
    }
}
