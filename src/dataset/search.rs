//! Lookups over a loaded dataset.

use crate::models::{GraphData, Node, Thread, ThreadText};

/// Default cap on search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 25;

/// Find a node by exact id.
pub fn find_node<'a>(graph: &'a GraphData, id: &str) -> Option<&'a Node> {
    graph.nodes.iter().find(|n| n.id == id)
}

/// Case-insensitive substring search over node ids and aliases.
pub fn search_nodes<'a>(graph: &'a GraphData, query: &str, limit: usize) -> Vec<&'a Node> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    graph
        .nodes
        .iter()
        .filter(|n| {
            n.id.to_lowercase().contains(&query)
                || n.aliases.iter().any(|a| a.to_lowercase().contains(&query))
        })
        .take(limit)
        .collect()
}

/// Find thread metadata by id.
pub fn find_thread<'a>(threads: &'a [Thread], id: &str) -> Option<&'a Thread> {
    threads.iter().find(|t| t.id == id)
}

/// Find the text of a thread by id.
pub fn find_thread_text<'a>(texts: &'a [ThreadText], id: &str) -> Option<&'a ThreadText> {
    texts.iter().find(|t| t.thread_id == id)
}

/// Threads sorted by mean risk, highest first.
pub fn threads_by_risk(threads: &[Thread]) -> Vec<&Thread> {
    let mut sorted: Vec<&Thread> = threads.iter().collect();
    sorted.sort_by(|a, b| b.mean_risk.total_cmp(&a.mean_risk));
    sorted
}

/// Key for ranking nodes ahead of truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RankKey {
    Pagerank,
    Risk,
    Degree,
}

/// Sort nodes descending by `key`. Ties keep dataset order.
pub fn rank_nodes(nodes: &mut [Node], key: RankKey) {
    let score = |n: &Node| match key {
        RankKey::Pagerank => n.pagerank,
        RankKey::Risk => n.risk_intensity,
        RankKey::Degree => n.degree as f64,
    };
    nodes.sort_by(|a, b| score(b).total_cmp(&score(a)));
}
