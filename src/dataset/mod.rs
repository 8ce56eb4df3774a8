//! Dataset access: file conventions, loading and lookups.

pub mod loader;
pub mod search;

pub use loader::*;
pub use search::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading dataset files.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("data directory not found: {}", .0.display())]
    MissingDataDir(PathBuf),

    #[error("invalid partition name: {0:?}")]
    InvalidPartition(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
