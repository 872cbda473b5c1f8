//! Error types for feature extraction and prediction.

use amrgen_core::{GraphError, VertexId};
use thiserror::Error;

use crate::aspect::Aspect;

/// Result type alias for feature operations.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Errors that can occur while extracting contexts or applying predictions.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Training extraction found no gold label for an eligible vertex.
    #[error("no gold {aspect} label for vertex {vertex} of graph '{amr}'")]
    MissingGoldLabel {
        aspect: Aspect,
        vertex: VertexId,
        amr: String,
    },

    /// An aspect read a prediction that has not been made for this vertex.
    #[error("{aspect} requires a {required} prediction for vertex {vertex}")]
    MissingPrediction {
        aspect: Aspect,
        required: Aspect,
        vertex: VertexId,
    },

    /// An aspect read a prediction of an aspect that runs after it.
    #[error("{aspect} cannot depend on {required}, which runs later in the pipeline")]
    OutOfOrder { aspect: Aspect, required: Aspect },

    /// No classifier was supplied for an aspect of the pipeline.
    #[error("no classifier registered for {aspect}")]
    MissingClassifier { aspect: Aspect },

    /// The pipeline has no model for an aspect.
    #[error("no model registered for {aspect}")]
    MissingModel { aspect: Aspect },

    /// An aspect name did not match any known aspect.
    #[error("unknown aspect: {name}")]
    UnknownAspect { name: String },

    /// An unknown named-entity order label.
    #[error("unknown name order: {label}")]
    UnknownNameOrder { label: String },

    /// Graph lookup error.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
