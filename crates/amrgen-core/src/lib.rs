//! Core graph model for AMR surface realization.
//!
//! An [`Amr`] is a rooted semantic graph of concept vertices joined by labeled
//! relations, paired with the tokens of its source sentence and an alignment
//! from edges to token indices. Re-entrant vertices appear as link vertices so
//! every vertex has a single rendering parent.
//!
//! The [`GoldAnnotations`] trait supplies ground truth during training.

pub mod error;
pub mod gold;
pub mod graph;
pub mod span;

pub use error::{GraphError, GraphResult};
pub use gold::{GoldAnnotations, GoldTable};
pub use graph::{
    instance_or_numeric, Alignment, Amr, AmrBuilder, AmrParts, Edge, EdgeId, Vertex, VertexId,
    INSTANCE_LABEL, NUMERIC,
};
pub use span::{is_contiguous, leftmost_contiguous};
