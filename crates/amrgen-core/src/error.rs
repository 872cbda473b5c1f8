//! Error types for graph construction and validation.

use thiserror::Error;

use crate::graph::{EdgeId, VertexId};

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Invariant violations detected while assembling or mutating an [`crate::Amr`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Two vertices share the same identifier.
    #[error("duplicate vertex id {vertex}")]
    DuplicateVertex { vertex: VertexId },

    /// Two edges share the same identifier.
    #[error("duplicate edge id {edge}")]
    DuplicateEdge { edge: EdgeId },

    /// A vertex referenced by an edge, link or lookup does not exist.
    #[error("unknown vertex {vertex}")]
    UnknownVertex { vertex: VertexId },

    /// An edge referenced by an alignment or lookup does not exist.
    #[error("unknown edge {edge}")]
    UnknownEdge { edge: EdgeId },

    /// The instance edge of a vertex is missing or is not a self-loop.
    #[error("vertex {vertex} has no valid instance edge")]
    InvalidInstanceEdge { vertex: VertexId },

    /// A vertex has more than one relational parent in the tree view.
    #[error("vertex {vertex} has {count} incoming relations, expected at most one")]
    MultipleParents { vertex: VertexId, count: usize },

    /// The graph does not have exactly one root.
    #[error("graph has {count} roots, expected exactly one")]
    RootCount { count: usize },

    /// Following parents from a vertex never reaches the root.
    #[error("vertex {vertex} lies on a cycle")]
    Cycle { vertex: VertexId },

    /// A link vertex points at a missing vertex or at another link.
    #[error("link vertex {vertex} has an invalid original {original}")]
    InvalidLink { vertex: VertexId, original: VertexId },

    /// An aligned token index lies outside the sentence.
    #[error("alignment of edge {edge} references token {index}, sentence has {len} tokens")]
    AlignmentOutOfRange { edge: EdgeId, index: usize, len: usize },

    /// The POS tag sequence is not parallel to the sentence.
    #[error("{tags} POS tags for a sentence of {tokens} tokens")]
    PosLengthMismatch { tags: usize, tokens: usize },
}
