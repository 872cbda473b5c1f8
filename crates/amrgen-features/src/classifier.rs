//! The classifier contract consumed by the pipeline.
//!
//! Training algorithms live behind [`Classifier`]; this crate only ships
//! [`PriorClassifier`], a label-frequency baseline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::FeatureContext;
use crate::prediction::Prediction;

/// One labeled training instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub label: String,
    pub context: FeatureContext,
}

impl Event {
    pub fn new(label: impl Into<String>, context: FeatureContext) -> Self {
        Self {
            label: label.into(),
            context,
        }
    }
}

/// A trainable classifier returning ranked labels.
pub trait Classifier: Send {
    /// Fit the classifier to labeled events.
    fn train(&mut self, events: &[Event]);

    /// Ranked predictions for a context, most likely first.
    fn predict(&self, context: &FeatureContext) -> Vec<Prediction>;
}

/// Predicts labels by their training frequency, ignoring the context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriorClassifier {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl PriorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of training events seen.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Classifier for PriorClassifier {
    fn train(&mut self, events: &[Event]) {
        for event in events {
            *self.counts.entry(event.label.clone()).or_insert(0) += 1;
            self.total += 1;
        }
    }

    fn predict(&self, _context: &FeatureContext) -> Vec<Prediction> {
        if self.total == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(&String, &usize)> = self.counts.iter().collect();
        // Higher count first; the map already yields labels in ascending order.
        ranked.sort_by(|a, b| b.1.cmp(a.1));
        ranked
            .into_iter()
            .map(|(label, count)| Prediction::new(label.clone(), *count as f64 / self.total as f64))
            .collect()
    }
}
