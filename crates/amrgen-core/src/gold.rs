//! Ground-truth lookups consumed during training and corpus aggregation.

use std::collections::HashMap;

use crate::graph::{Amr, VertexId};

/// Source of gold labels for a labeled corpus.
///
/// Only training-mode extraction and the corpus tables call this; inference
/// never does.
pub trait GoldAnnotations {
    /// The gold label of `vertex` for the named aspect.
    fn label(&self, amr: &Amr, vertex: VertexId, aspect: &str) -> Option<String>;

    /// The gold surface realization of the vertex's concept.
    fn realization(&self, amr: &Amr, vertex: VertexId) -> Option<String> {
        amr.vertex(vertex)
            .and_then(|v| amr.aligned_realization(v.instance_edge))
    }

    /// The merged concept two siblings collapse into, if they merge.
    fn sibling_merge(&self, _amr: &Amr, _left: VertexId, _right: VertexId) -> Option<String> {
        None
    }
}

/// In-memory gold annotations keyed by graph id and vertex.
#[derive(Debug, Clone, Default)]
pub struct GoldTable {
    labels: HashMap<(String, VertexId, String), String>,
    realizations: HashMap<(String, VertexId), String>,
    sibling_merges: HashMap<(String, VertexId, VertexId), String>,
}

impl GoldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the gold label of a vertex for an aspect.
    pub fn with_label(
        mut self,
        amr_id: impl Into<String>,
        vertex: VertexId,
        aspect: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.insert_label(amr_id, vertex, aspect, label);
        self
    }

    /// Override the realization derived from alignments.
    pub fn with_realization(
        mut self,
        amr_id: impl Into<String>,
        vertex: VertexId,
        realization: impl Into<String>,
    ) -> Self {
        self.realizations
            .insert((amr_id.into(), vertex), realization.into());
        self
    }

    /// Record that two siblings merge into one concept.
    pub fn with_sibling_merge(
        mut self,
        amr_id: impl Into<String>,
        left: VertexId,
        right: VertexId,
        merged: impl Into<String>,
    ) -> Self {
        self.sibling_merges
            .insert((amr_id.into(), left, right), merged.into());
        self
    }

    pub fn insert_label(
        &mut self,
        amr_id: impl Into<String>,
        vertex: VertexId,
        aspect: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.labels
            .insert((amr_id.into(), vertex, aspect.into()), label.into());
    }

    /// Number of recorded labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl GoldAnnotations for GoldTable {
    fn label(&self, amr: &Amr, vertex: VertexId, aspect: &str) -> Option<String> {
        self.labels
            .get(&(amr.id().to_string(), vertex, aspect.to_string()))
            .cloned()
    }

    fn realization(&self, amr: &Amr, vertex: VertexId) -> Option<String> {
        self.realizations
            .get(&(amr.id().to_string(), vertex))
            .cloned()
            .or_else(|| {
                amr.vertex(vertex)
                    .and_then(|v| amr.aligned_realization(v.instance_edge))
            })
    }

    fn sibling_merge(&self, amr: &Amr, left: VertexId, right: VertexId) -> Option<String> {
        self.sibling_merges
            .get(&(amr.id().to_string(), left, right))
            .cloned()
    }
}
