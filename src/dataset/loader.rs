//! Dataset file loading.
//!
//! Graph partitions live at `<data_dir>/<partition>/graph_internal.json`,
//! thread files under `<data_dir>/threads/`.

use crate::dataset::{DatasetError, Result};
use crate::models::{GraphData, Thread, ThreadIndex, ThreadText, ThreadTextFile};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File name of a graph partition.
pub const GRAPH_FILE: &str = "graph_internal.json";

/// Partition that covers every year.
pub const ALL_PARTITION: &str = "all";

/// Directory holding the thread files.
pub const THREADS_DIR: &str = "threads";

/// Path of the graph file for a partition.
pub fn graph_path(data_dir: &Path, partition: &str) -> PathBuf {
    data_dir.join(partition).join(GRAPH_FILE)
}

/// Path of a file inside the threads directory.
pub fn threads_path(data_dir: &Path, file_name: &str) -> PathBuf {
    data_dir.join(THREADS_DIR).join(file_name)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject partition names that would resolve outside the data directory.
pub fn validate_partition(partition: &str) -> Result<()> {
    let trimmed = partition.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains(['/', '\\'])
    {
        return Err(DatasetError::InvalidPartition(partition.to_string()));
    }
    Ok(())
}

/// Load one graph partition and drop edges that point at unknown nodes.
pub fn load_graph(data_dir: &Path, partition: &str) -> Result<GraphData> {
    validate_partition(partition)?;
    let path = graph_path(data_dir, partition);
    debug!("Loading graph from {}", path.display());

    let graph: GraphData = read_json(&path)?;
    let graph = sanitize_graph(graph);

    info!(
        "Loaded {}: {} nodes, {} edges",
        partition,
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(graph)
}

/// Drop dangling edges and report duplicate node ids.
pub fn sanitize_graph(mut graph: GraphData) -> GraphData {
    let mut ids: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    let mut duplicates = 0usize;
    for node in &graph.nodes {
        if !ids.insert(node.id.as_str()) {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!("{} duplicate node ids in dataset; first occurrence wins", duplicates);
    }

    let ids: HashSet<String> = ids.into_iter().map(str::to_string).collect();
    let before = graph.edges.len();
    graph
        .edges
        .retain(|e| ids.contains(&e.source) && ids.contains(&e.target));

    let dropped = before - graph.edges.len();
    if dropped > 0 {
        debug!("Dropped {} edges with a missing endpoint", dropped);
    }

    graph
}

/// Load the thread metadata file.
pub fn load_threads(data_dir: &Path, file_name: &str) -> Result<Vec<Thread>> {
    let path = threads_path(data_dir, file_name);
    let index: ThreadIndex = read_json(&path)?;
    info!("Loaded {} threads", index.threads.len());
    Ok(index.threads)
}

/// Load the thread text file.
pub fn load_thread_texts(data_dir: &Path, file_name: &str) -> Result<Vec<ThreadText>> {
    let path = threads_path(data_dir, file_name);
    let file: ThreadTextFile = read_json(&path)?;
    let texts = file.into_texts();
    debug!("Loaded {} thread texts", texts.len());
    Ok(texts)
}

/// List partitions that have a graph file, `all` first and the rest sorted.
pub fn discover_partitions(data_dir: &Path) -> Result<Vec<String>> {
    if !data_dir.is_dir() {
        return Err(DatasetError::MissingDataDir(data_dir.to_path_buf()));
    }

    let mut partitions: Vec<String> = WalkDir::new(data_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && e.file_name() == GRAPH_FILE)
        .filter_map(|e| {
            e.path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
        })
        .collect();

    partitions.sort_by(|a, b| {
        (a != ALL_PARTITION)
            .cmp(&(b != ALL_PARTITION))
            .then_with(|| a.cmp(b))
    });
    partitions.dedup();

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_graph(dir: &Path, partition: &str, json: &str) {
        let part = dir.join(partition);
        fs::create_dir_all(&part).unwrap();
        fs::write(part.join(GRAPH_FILE), json).unwrap();
    }

    #[test]
    fn test_graph_path_convention() {
        let path = graph_path(Path::new("data"), "2001");
        assert_eq!(path, PathBuf::from("data/2001/graph_internal.json"));
    }

    #[test]
    fn test_load_graph_drops_dangling_edges() {
        let temp_dir = TempDir::new().unwrap();
        write_graph(
            temp_dir.path(),
            "all",
            r#"{
                "directed": true,
                "nodes": [{"id": "a"}, {"id": "b"}],
                "edges": [
                    {"source": "a", "target": "b", "weight": 3},
                    {"source": "a", "target": "ghost"}
                ]
            }"#,
        );

        let graph = load_graph(temp_dir.path(), "all").unwrap();
        assert!(graph.directed);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].weight, 3.0);
    }

    #[test]
    fn test_load_graph_rejects_escaping_partition() {
        let temp_dir = TempDir::new().unwrap();
        write_graph(temp_dir.path(), "all", r#"{"nodes": [{"id": "a"}]}"#);

        for bad in ["../all", "..", "all/../all", r"..\all", "", "."] {
            let err = load_graph(temp_dir.path(), bad).unwrap_err();
            assert!(
                matches!(err, DatasetError::InvalidPartition(_)),
                "accepted {:?}",
                bad
            );
        }

        assert!(validate_partition("2001").is_ok());
        assert!(validate_partition("all").is_ok());
    }

    #[test]
    fn test_load_graph_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_graph(temp_dir.path(), "1999").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("graph_internal.json"));
    }

    #[test]
    fn test_load_graph_malformed() {
        let temp_dir = TempDir::new().unwrap();
        write_graph(temp_dir.path(), "all", "{ not json");
        let err = load_graph(temp_dir.path(), "all").unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));
    }

    #[test]
    fn test_load_threads_and_texts() {
        let temp_dir = TempDir::new().unwrap();
        let threads_dir = temp_dir.path().join(THREADS_DIR);
        fs::create_dir_all(&threads_dir).unwrap();
        fs::write(
            threads_dir.join("threads.json"),
            r#"{"threads": [{"id": "t1", "mean_risk": 0.4, "n_emails": 3}]}"#,
        )
        .unwrap();
        fs::write(
            threads_dir.join("texts.json"),
            r#"[{"thread_id": "t1", "subject_norm": "q3 numbers", "body_concat": "...", "n_tokens": 12, "has_text": true}]"#,
        )
        .unwrap();

        let threads = load_threads(temp_dir.path(), "threads.json").unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].n_emails, 3);

        let texts = load_thread_texts(temp_dir.path(), "texts.json").unwrap();
        assert_eq!(texts[0].n_tokens, 12);
        assert!(texts[0].has_text);
    }

    #[test]
    fn test_discover_partitions() {
        let temp_dir = TempDir::new().unwrap();
        write_graph(temp_dir.path(), "2001", "{}");
        write_graph(temp_dir.path(), "1999", "{}");
        write_graph(temp_dir.path(), "all", "{}");
        fs::create_dir_all(temp_dir.path().join("threads")).unwrap();

        let partitions = discover_partitions(temp_dir.path()).unwrap();
        assert_eq!(partitions, vec!["all", "1999", "2001"]);
    }

    #[test]
    fn test_discover_partitions_missing_dir() {
        let err = discover_partitions(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingDataDir(_)));
    }
}
