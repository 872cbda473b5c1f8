//! Placement of a named entity's name relative to its concept.

use amrgen_core::{Amr, Vertex};

use crate::aspect::Aspect;
use crate::error::FeatureResult;
use crate::feature::Feature;
use crate::model::{AspectModel, ExtractionMode};
use crate::structure::StructuralContext;

/// Predicts a [`crate::aspect::NameOrder`] label for named vertices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameOrderModel;

impl AspectModel for NameOrderModel {
    fn aspect(&self) -> Aspect {
        Aspect::NameOrder
    }

    fn is_eligible(&self, _amr: &Amr, vertex: &Vertex) -> bool {
        !vertex.is_link() && vertex.has_name()
    }

    fn features(
        &self,
        amr: &Amr,
        vertex: &Vertex,
        _mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<Feature>> {
        let ctx = StructuralContext::new(amr, vertex);
        let name = vertex.name.to_lowercase();
        let instance = vertex.instance.as_str();
        let words: Vec<&str> = name.split_whitespace().collect();

        let mut features = vec![
            Feature::scalar("name", &name),
            Feature::scalar("instance", instance),
            Feature::scalar("name-instance", format!("{name}|{instance}")),
            Feature::scalar("nameLength", words.len()),
            Feature::list("nameWords", &words),
            Feature::scalar("lastNameWord", words.last().copied().unwrap_or_default()),
            Feature::scalar(
                "instanceInName",
                words.iter().any(|w| *w == instance),
            ),
            Feature::list("outLabels", ctx.out_labels()),
        ];
        features.extend(ctx.parent_features());
        Ok(features)
    }
}
