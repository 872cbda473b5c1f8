//! Merging of a vertex into its parent (e.g. `have-org-role` + `president`).

use amrgen_core::{instance_or_numeric, Amr, Vertex};

use crate::aspect::Aspect;
use crate::error::FeatureResult;
use crate::feature::Feature;
use crate::model::{AspectModel, ExtractionMode};
use crate::structure::{pos_or_prop, StructuralContext, ROOT};

/// Predicts whether a vertex collapses with its parent, and into what.
///
/// Labels are a merged concept or [`crate::aspect::NO_MERGE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeModel;

impl AspectModel for MergeModel {
    fn aspect(&self) -> Aspect {
        Aspect::Merge
    }

    fn is_eligible(&self, amr: &Amr, vertex: &Vertex) -> bool {
        !vertex.deleted && !vertex.is_link() && amr.parent(vertex.id).is_some()
    }

    fn features(
        &self,
        amr: &Amr,
        vertex: &Vertex,
        _mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<Feature>> {
        let ctx = StructuralContext::new(amr, vertex);
        let instance = instance_or_numeric(vertex);
        let parent_lemma = ctx.parent.map_or(ROOT, Vertex::lemma);

        let mut features = vec![
            Feature::scalar("instance", instance),
            Feature::scalar("lemma", vertex.lemma()),
            Feature::scalar("pos", pos_or_prop(vertex)),
            Feature::scalar("parentLemma", parent_lemma),
            Feature::scalar(
                "parentInst-instance",
                format!("{}|{}", ctx.parent_instance(), instance),
            ),
            Feature::scalar("inLabel-instance", format!("{}|{}", ctx.in_label, instance)),
            Feature::scalar("outEmpty", ctx.out_edges.is_empty()),
            Feature::list("outLabels", ctx.out_labels()),
            Feature::list(
                "children",
                ctx.children().into_iter().map(instance_or_numeric),
            ),
            Feature::scalar("hasName", vertex.has_name()),
        ];
        features.extend(ctx.parent_features());
        features.extend(ctx.neighbour_features());
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::NO_MERGE;
    use amrgen_core::{AmrBuilder, GoldTable, VertexId};

    /// (p / person :ARG0-of (h / have-org-role-91 :ARG2 (m / minister)))
    fn sample() -> (Amr, VertexId, VertexId, VertexId) {
        let mut b = AmrBuilder::new().with_id("m1");
        let person = b.add_vertex("person");
        let role = b.add_vertex("have-org-role-91");
        let minister = b.add_vertex("minister");
        b.set_pos(minister, "NN");
        b.add_edge(person, role, ":ARG0-of");
        b.add_edge(role, minister, ":ARG2");
        (b.build().unwrap(), person, role, minister)
    }

    #[test]
    fn test_root_is_not_eligible() {
        let (amr, person, role, _) = sample();
        assert!(!MergeModel.is_eligible(&amr, amr.vertex(person).unwrap()));
        assert!(MergeModel.is_eligible(&amr, amr.vertex(role).unwrap()));
    }

    #[test]
    fn test_training_extraction() {
        let (amr, _, role, minister) = sample();
        let gold = GoldTable::new()
            .with_label("m1", role, "merge", NO_MERGE)
            .with_label("m1", minister, "merge", "minister");

        let extraction = MergeModel
            .extract(&amr, minister, ExtractionMode::Training { gold: &gold })
            .unwrap()
            .unwrap();
        assert_eq!(extraction.label.as_deref(), Some("minister"));
        assert_eq!(
            extraction.context.value_of("parentInst-instance"),
            Some("have-org-role-91|minister")
        );
        assert_eq!(extraction.context.value_of("parentLemma"), Some("have-org-role"));
        assert_eq!(extraction.context.value_of("pos"), Some("NN"));
        assert_eq!(extraction.context.value_of("grandparentInst"), Some("person"));
    }
}
