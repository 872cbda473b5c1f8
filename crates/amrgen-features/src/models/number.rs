//! Grammatical number of common nouns.

use amrgen_core::{instance_or_numeric, Amr, Vertex, NUMERIC};

use crate::aspect::Aspect;
use crate::error::FeatureResult;
use crate::feature::Feature;
use crate::model::{AspectModel, ExtractionMode};
use crate::structure::{pos_or_prop, StructuralContext};

/// Predicts `sg` or `pl` for nouns and named entities.
///
/// Every vertex the article model accepts is also accepted here, so the
/// article model always finds a number for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberModel;

impl AspectModel for NumberModel {
    fn aspect(&self) -> Aspect {
        Aspect::Number
    }

    fn is_eligible(&self, _amr: &Amr, vertex: &Vertex) -> bool {
        let nominal = vertex.is_noun() || vertex.has_name();
        nominal && !vertex.deleted && !vertex.is_link()
    }

    fn features(
        &self,
        amr: &Amr,
        vertex: &Vertex,
        _mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<Feature>> {
        let ctx = StructuralContext::new(amr, vertex);
        let quant = ctx.child(":quant").map_or("no_quant", |q| {
            if q.is_numeric() {
                match instance_or_numeric(q) {
                    NUMERIC => "many",
                    _ => "one",
                }
            } else {
                q.instance.as_str()
            }
        });

        let mut features = vec![
            Feature::scalar("instance", instance_or_numeric(vertex)),
            Feature::scalar("lemma", vertex.lemma()),
            Feature::scalar("quant", quant),
            Feature::scalar("hasName", vertex.has_name()),
            Feature::scalar("inLabel-instance", format!("{}|{}", ctx.in_label, vertex.instance)),
            Feature::list("outLabels", ctx.out_labels()),
            Feature::list(
                "childrenWithLabels",
                ctx.out_edges
                    .iter()
                    .filter_map(|e| amr.vertex(e.to).map(|c| (e, c)))
                    .map(|(e, c)| format!("{}{}", e.label, instance_or_numeric(c))),
            ),
            Feature::list(
                "outPosTag",
                ctx.children().into_iter().map(pos_or_prop),
            ),
        ];
        features.extend(ctx.parent_features());
        features.extend(ctx.neighbour_features());
        features.extend(ctx.ancestor_features());
        Ok(features)
    }
}
