//! Feature composition and multi-aspect prediction for AMR surface realization.
//!
//! Each surface-realization decision ([`Aspect`]) has an [`AspectModel`] that
//! turns a vertex's structural surroundings into a flat [`FeatureContext`].
//! Contexts are classified by an external [`Classifier`] and the ranked labels
//! land in a [`PredictionStore`] kept outside the graph.
//!
//! ```text
//! Amr ──► StructuralContext ──► Vec<Feature> ──► FeatureContext ──► Classifier
//!                                                                      │
//!                                     PredictionStore ◄── ranked labels┘
//! ```

pub mod aspect;
pub mod classifier;
pub mod context;
pub mod error;
pub mod feature;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod prediction;
pub mod structure;

pub use aspect::{Aspect, NameOrder};
pub use classifier::{Classifier, Event, PriorClassifier};
pub use context::FeatureContext;
pub use error::{FeatureError, FeatureResult};
pub use feature::Feature;
pub use model::{AspectModel, Extraction, ExtractionMode};
pub use models::{model_for, ArticleModel, MergeModel, NameOrderModel, NumberModel};
pub use pipeline::{AspectPipeline, Classifiers};
pub use prediction::{Prediction, PredictionStore};
pub use structure::StructuralContext;
