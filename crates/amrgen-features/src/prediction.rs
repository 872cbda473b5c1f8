//! Ranked predictions and the side-table that holds them per vertex.

use std::collections::BTreeMap;

use amrgen_core::VertexId;
use serde::{Deserialize, Serialize};

use crate::aspect::Aspect;

/// One candidate label with its classifier score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Ranked predictions keyed by vertex, then aspect, most likely first.
///
/// Owned by the driver and passed to each model call; the graph itself is
/// never mutated by prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionStore {
    entries: BTreeMap<VertexId, BTreeMap<Aspect, Vec<Prediction>>>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the ranked labels of `aspect` for a vertex, replacing any
    /// previous ranking.
    pub fn apply(&mut self, vertex: VertexId, aspect: Aspect, ranked: Vec<Prediction>) {
        self.entries.entry(vertex).or_default().insert(aspect, ranked);
    }

    /// Ranked labels of `aspect` for a vertex.
    pub fn get(&self, vertex: VertexId, aspect: Aspect) -> Option<&[Prediction]> {
        self.entries
            .get(&vertex)
            .and_then(|aspects| aspects.get(&aspect))
            .map(Vec::as_slice)
    }

    /// The most likely label of `aspect` for a vertex.
    pub fn best(&self, vertex: VertexId, aspect: Aspect) -> Option<&str> {
        self.get(vertex, aspect)
            .and_then(|ranked| ranked.first())
            .map(|p| p.label.as_str())
    }

    pub fn contains(&self, vertex: VertexId, aspect: Aspect) -> bool {
        self.get(vertex, aspect).is_some()
    }

    /// Aspects predicted so far for a vertex, in pipeline order.
    pub fn aspects(&self, vertex: VertexId) -> Vec<Aspect> {
        self.entries
            .get(&vertex)
            .map(|aspects| aspects.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Vertices with at least one prediction.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.entries.keys().copied()
    }

    /// Drop all predictions of a vertex.
    pub fn clear_vertex(&mut self, vertex: VertexId) {
        self.entries.remove(&vertex);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of (vertex, aspect) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked() -> Vec<Prediction> {
        vec![Prediction::new("pl", 0.7), Prediction::new("sg", 0.3)]
    }

    #[test]
    fn test_apply_and_best() {
        let mut store = PredictionStore::new();
        store.apply(VertexId(1), Aspect::Number, ranked());

        assert_eq!(store.best(VertexId(1), Aspect::Number), Some("pl"));
        assert_eq!(store.get(VertexId(1), Aspect::Number).map(|r| r.len()), Some(2));
        assert!(store.best(VertexId(1), Aspect::Article).is_none());
        assert!(store.best(VertexId(2), Aspect::Number).is_none());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut once = PredictionStore::new();
        once.apply(VertexId(1), Aspect::Number, ranked());

        let mut twice = once.clone();
        twice.apply(VertexId(1), Aspect::Number, ranked());

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_apply_overwrites() {
        let mut store = PredictionStore::new();
        store.apply(VertexId(1), Aspect::Number, ranked());
        store.apply(VertexId(1), Aspect::Number, vec![Prediction::new("sg", 1.0)]);
        assert_eq!(store.best(VertexId(1), Aspect::Number), Some("sg"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_aspects_follow_pipeline_order() {
        let mut store = PredictionStore::new();
        store.apply(VertexId(4), Aspect::Article, vec![Prediction::new("the", 1.0)]);
        store.apply(VertexId(4), Aspect::Merge, vec![Prediction::new("NO_MERGE", 1.0)]);
        assert_eq!(store.aspects(VertexId(4)), vec![Aspect::Merge, Aspect::Article]);

        store.clear_vertex(VertexId(4));
        assert!(store.is_empty());
    }
}
