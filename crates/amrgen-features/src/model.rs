//! The contract every aspect-specific prediction model implements.

use amrgen_core::{Amr, GoldAnnotations, Vertex, VertexId};
use tracing::debug;

use crate::aspect::Aspect;
use crate::context::FeatureContext;
use crate::error::{FeatureError, FeatureResult};
use crate::feature::Feature;
use crate::prediction::{Prediction, PredictionStore};

/// Whether extraction runs against gold annotations or earlier predictions.
#[derive(Clone, Copy)]
pub enum ExtractionMode<'a> {
    /// Training: gold labels are looked up and attached to the context.
    Training { gold: &'a dyn GoldAnnotations },
    /// Inference: features may read predictions already made for the vertex.
    Inference { predictions: &'a PredictionStore },
}

impl<'a> ExtractionMode<'a> {
    pub fn is_training(&self) -> bool {
        matches!(self, ExtractionMode::Training { .. })
    }

    /// The label of an earlier aspect that `aspect`'s features depend on.
    ///
    /// Training reads the gold label, inference reads the best prediction.
    /// Fails if `required` does not run before `aspect` or the label is
    /// missing.
    pub fn prior_label(
        &self,
        amr: &Amr,
        vertex: VertexId,
        aspect: Aspect,
        required: Aspect,
    ) -> FeatureResult<String> {
        if !aspect.runs_after(required) {
            return Err(FeatureError::OutOfOrder { aspect, required });
        }

        match self {
            ExtractionMode::Training { gold } => gold
                .label(amr, vertex, required.name())
                .ok_or_else(|| FeatureError::MissingGoldLabel {
                    aspect: required,
                    vertex,
                    amr: amr.id().to_string(),
                }),
            ExtractionMode::Inference { predictions } => predictions
                .best(vertex, required)
                .map(str::to_string)
                .ok_or(FeatureError::MissingPrediction {
                    aspect,
                    required,
                    vertex,
                }),
        }
    }

    /// The gold realization of a vertex's concept; `None` at inference.
    pub fn realization(&self, amr: &Amr, vertex: VertexId) -> Option<String> {
        match self {
            ExtractionMode::Training { gold } => gold.realization(amr, vertex),
            ExtractionMode::Inference { .. } => None,
        }
    }
}

/// A feature context with its gold label, if extracted for training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub context: FeatureContext,
    pub label: Option<String>,
}

/// A stateless feature extractor bound to one aspect.
pub trait AspectModel: Send + Sync {
    /// The aspect this model predicts.
    fn aspect(&self) -> Aspect;

    /// Whether the aspect applies to this vertex at all.
    fn is_eligible(&self, amr: &Amr, vertex: &Vertex) -> bool;

    /// Features of an eligible vertex in declaration order.
    fn features(
        &self,
        amr: &Amr,
        vertex: &Vertex,
        mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<Feature>>;

    /// Build the classifier context for a vertex.
    ///
    /// Returns `Ok(None)` for ineligible vertices. In training mode the gold
    /// label must exist for every eligible vertex.
    fn extract(
        &self,
        amr: &Amr,
        vertex: VertexId,
        mode: ExtractionMode<'_>,
    ) -> FeatureResult<Option<Extraction>> {
        let aspect = self.aspect();
        let v = amr.try_vertex(vertex)?;
        if !self.is_eligible(amr, v) {
            debug!(aspect = %aspect, vertex = %vertex, "vertex not eligible, skipping");
            return Ok(None);
        }

        let label = match mode {
            ExtractionMode::Training { gold } => Some(
                gold.label(amr, vertex, aspect.name())
                    .ok_or_else(|| FeatureError::MissingGoldLabel {
                        aspect,
                        vertex,
                        amr: amr.id().to_string(),
                    })?,
            ),
            ExtractionMode::Inference { .. } => None,
        };

        let features = self.features(amr, v, mode)?;
        Ok(Some(Extraction {
            context: FeatureContext::from_features(&features),
            label,
        }))
    }

    /// Write ranked labels for this aspect into the store.
    fn apply_prediction(
        &self,
        store: &mut PredictionStore,
        vertex: VertexId,
        ranked: Vec<Prediction>,
    ) {
        store.apply(vertex, self.aspect(), ranked);
    }
}
