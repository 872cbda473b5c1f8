//! Runs every aspect model over a graph in pipeline order.

use std::collections::BTreeMap;
use std::fmt;

use amrgen_core::{Amr, GoldAnnotations, VertexId};
use tracing::{debug, info};

use crate::aspect::Aspect;
use crate::classifier::{Classifier, Event};
use crate::error::{FeatureError, FeatureResult};
use crate::model::{AspectModel, ExtractionMode, Extraction};
use crate::models::model_for;
use crate::prediction::PredictionStore;

/// One trained classifier per aspect.
pub type Classifiers = BTreeMap<Aspect, Box<dyn Classifier>>;

/// Aspect models kept in pipeline order.
pub struct AspectPipeline {
    models: Vec<Box<dyn AspectModel>>,
}

impl Default for AspectPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl AspectPipeline {
    /// Create a pipeline without models.
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// A pipeline with the built-in model of every aspect.
    pub fn standard() -> Self {
        Aspect::PIPELINE
            .into_iter()
            .fold(Self::new(), |pipeline, aspect| pipeline.with_model(model_for(aspect)))
    }

    /// Add a model, replacing any model registered for the same aspect.
    pub fn register(&mut self, model: Box<dyn AspectModel>) {
        let aspect = model.aspect();
        self.models.retain(|m| m.aspect() != aspect);
        let at = self
            .models
            .iter()
            .position(|m| m.aspect() > aspect)
            .unwrap_or(self.models.len());
        self.models.insert(at, model);
    }

    /// Add a model (builder pattern).
    pub fn with_model(mut self, model: Box<dyn AspectModel>) -> Self {
        self.register(model);
        self
    }

    /// Registered aspects in pipeline order.
    pub fn aspects(&self) -> Vec<Aspect> {
        self.models.iter().map(|m| m.aspect()).collect()
    }

    /// The model registered for an aspect.
    pub fn model(&self, aspect: Aspect) -> Option<&dyn AspectModel> {
        self.models
            .iter()
            .find(|m| m.aspect() == aspect)
            .map(|m| m.as_ref())
    }

    /// Training events of every eligible vertex, grouped by aspect.
    pub fn collect_events(
        &self,
        amr: &Amr,
        gold: &dyn GoldAnnotations,
    ) -> FeatureResult<BTreeMap<Aspect, Vec<Event>>> {
        let mode = ExtractionMode::Training { gold };
        let mut events: BTreeMap<Aspect, Vec<Event>> = BTreeMap::new();

        for vertex in amr.vertices() {
            for model in &self.models {
                if let Some(Extraction {
                    context,
                    label: Some(label),
                }) = model.extract(amr, vertex.id, mode)?
                {
                    events
                        .entry(model.aspect())
                        .or_default()
                        .push(Event::new(label, context));
                }
            }
        }

        debug!(
            amr = amr.id(),
            events = events.values().map(Vec::len).sum::<usize>(),
            "collected training events"
        );
        Ok(events)
    }

    /// Predict every aspect for every eligible vertex and record the results.
    ///
    /// Vertices are visited in insertion order and aspects in pipeline order,
    /// so a model only ever reads predictions already made for the same
    /// vertex in this pass. An aspect is skipped for a vertex when one of its
    /// dependencies produced no prediction there. `store` is only updated
    /// when the whole graph succeeds. Returns the number of predictions
    /// written.
    pub fn predict(
        &self,
        amr: &Amr,
        classifiers: &Classifiers,
        store: &mut PredictionStore,
    ) -> FeatureResult<usize> {
        for model in &self.models {
            if !classifiers.contains_key(&model.aspect()) {
                return Err(FeatureError::MissingClassifier {
                    aspect: model.aspect(),
                });
            }
        }

        let mut staged = store.clone();
        let mut written = 0;
        for vertex in amr.vertices() {
            for model in &self.models {
                let aspect = model.aspect();
                if let Some(missing) = aspect
                    .dependencies()
                    .iter()
                    .find(|dep| !staged.contains(vertex.id, **dep))
                {
                    debug!(
                        aspect = %aspect,
                        vertex = %vertex.id,
                        missing = %missing,
                        "dependency not predicted, skipping"
                    );
                    continue;
                }

                let mode = ExtractionMode::Inference {
                    predictions: &staged,
                };
                let Some(extraction) = model.extract(amr, vertex.id, mode)? else {
                    continue;
                };
                let Some(classifier) = classifiers.get(&aspect) else {
                    return Err(FeatureError::MissingClassifier { aspect });
                };

                let ranked = classifier.predict(&extraction.context);
                if ranked.is_empty() {
                    debug!(aspect = %aspect, vertex = %vertex.id, "classifier returned no labels");
                    continue;
                }
                model.apply_prediction(&mut staged, vertex.id, ranked);
                written += 1;
            }
        }

        *store = staged;
        info!(amr = amr.id(), predictions = written, "predicted aspects");
        Ok(written)
    }

    /// Contexts of one aspect for every eligible vertex.
    pub fn contexts(
        &self,
        amr: &Amr,
        aspect: Aspect,
        mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<(VertexId, Extraction)>> {
        let model = self
            .model(aspect)
            .ok_or(FeatureError::MissingModel { aspect })?;

        let mut contexts = Vec::new();
        for vertex in amr.vertices() {
            if let Some(extraction) = model.extract(amr, vertex.id, mode)? {
                contexts.push((vertex.id, extraction));
            }
        }
        Ok(contexts)
    }
}

impl fmt::Debug for AspectPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectPipeline")
            .field("aspects", &self.aspects())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleModel, NumberModel};

    #[test]
    fn test_register_keeps_pipeline_order() {
        let pipeline = AspectPipeline::new()
            .with_model(Box::new(ArticleModel))
            .with_model(Box::new(NumberModel))
            .with_model(Box::new(ArticleModel));
        assert_eq!(pipeline.aspects(), vec![Aspect::Number, Aspect::Article]);
    }

    #[test]
    fn test_standard_pipeline() {
        assert_eq!(AspectPipeline::standard().aspects(), Aspect::PIPELINE.to_vec());
        assert!(AspectPipeline::new().model(Aspect::Merge).is_none());
    }
}
