//! Error types for corpus loading and table persistence.

use std::path::PathBuf;

use amrgen_core::GraphError;
use thiserror::Error;

/// Result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Errors that can occur while reading corpora or persisting tables.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A corpus or table file does not exist.
    #[error("no such file: {path}")]
    NotFound { path: PathBuf },

    /// A graph in the corpus violates a structural invariant.
    #[error("invalid graph '{amr}': {source}")]
    InvalidGraph {
        amr: String,
        #[source]
        source: GraphError,
    },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
