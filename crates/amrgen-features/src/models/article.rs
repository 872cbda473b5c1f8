//! Article selection for noun phrases.

use amrgen_core::{instance_or_numeric, Amr, Vertex};

use crate::aspect::Aspect;
use crate::error::FeatureResult;
use crate::feature::Feature;
use crate::model::{AspectModel, ExtractionMode};
use crate::structure::{pos_or_prop, StructuralContext};

const NO_MOD: &str = "no_mod";

/// Predicts the article of a common noun or named entity.
///
/// Reads the vertex's number, so it runs after [`Aspect::Number`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ArticleModel;

impl AspectModel for ArticleModel {
    fn aspect(&self) -> Aspect {
        Aspect::Article
    }

    fn is_eligible(&self, _amr: &Amr, vertex: &Vertex) -> bool {
        let article_possible = vertex.pos() == Some("NN") || vertex.has_name();
        article_possible && !vertex.deleted && !vertex.is_link()
    }

    fn features(
        &self,
        amr: &Amr,
        vertex: &Vertex,
        mode: ExtractionMode<'_>,
    ) -> FeatureResult<Vec<Feature>> {
        let ctx = StructuralContext::new(amr, vertex);
        let number = mode.prior_label(amr, vertex.id, Aspect::Article, Aspect::Number)?;

        let instance = vertex.instance.as_str();
        let lemma = vertex.lemma();
        let in_label = ctx.in_label;
        let parent_instance = ctx.parent_instance();
        let out_labels = ctx.out_labels();
        let out_empty = ctx.out_edges.is_empty();

        let (mod_pos, mod_inst) = match ctx.child(":mod") {
            Some(m) if m.is_propbank_entry() => ("propEntry", m.instance.as_str()),
            Some(m) => (pos_or_prop(m), m.instance.as_str()),
            None => (NO_MOD, NO_MOD),
        };

        let children = ctx.children();
        let out_label_pos: Vec<String> = ctx
            .out_edges
            .iter()
            .zip(&children)
            .map(|(e, child)| format!("{}-{}", e.label, pos_or_prop(child)))
            .collect();

        let mut arg_features = Feature::list("argFeatures", Vec::<String>::new());
        let mut arg_link_features = Feature::list("argLinkFeatures", Vec::<String>::new());
        for i in 0..4 {
            let label = format!(":ARG{i}");
            match ctx.child(&label) {
                Some(target) => {
                    arg_features.push(format!("{i}pr"));
                    let kind = if target.is_link() { "link" } else { "pr" };
                    arg_link_features.push(format!("{i}{kind}"));
                }
                None => {
                    arg_features.push(format!("{i}no"));
                    arg_link_features.push(format!("{i}no"));
                }
            }
        }

        let arg_of: Vec<String> = (0..5)
            .map(|i| {
                if in_label == format!(":ARG{i}-of") {
                    format!("{i}pr")
                } else {
                    format!("{i}npr")
                }
            })
            .collect();

        let positions = ctx.rendering_positions();
        let (all_parents, all_in_labels, all_pos_in_labels) = if positions.is_empty() {
            (
                vec![parent_instance.to_string()],
                vec![in_label.to_string()],
                vec![format!("{},{}", in_label, ctx.parent_pos())],
            )
        } else {
            let mut parents = Vec::new();
            let mut labels = Vec::new();
            let mut pos_labels = Vec::new();
            for (i, (label, parent)) in positions.iter().enumerate() {
                // The first position is the vertex's own parent, whose
                // concept is collapsed like every other parent instance.
                parents.push(if i == 0 {
                    parent_instance.to_string()
                } else {
                    parent.instance.clone()
                });
                labels.push(label.to_string());
                pos_labels.push(format!("{},{}", label, pos_or_prop(parent)));
            }
            (parents, labels, pos_labels)
        };

        let has_inverse_label = in_label.ends_with("-of");
        let has_arg_label = in_label.starts_with(":ARG");
        let arg_count = out_labels
            .iter()
            .filter(|l| {
                l.strip_prefix(":ARG")
                    .is_some_and(|n| n.len() == 1 && n.chars().all(|c| c.is_ascii_digit()))
            })
            .count();

        let out_label_list = Feature::list("outLabels", &out_labels);
        let out_label_pos_list = Feature::list("outLabelPosTag", &out_label_pos);
        let in_label_feature = Feature::scalar("inLabel", in_label);

        let mut features = vec![
            Feature::scalar("number", &number),
            Feature::scalar("polarityPresent", ctx.has_out_label(":polarity")),
            Feature::scalar("modPOS", mod_pos),
            Feature::scalar("modInst", mod_inst),
            Feature::scalar("number-instance", format!("{number}{instance}")),
            Feature::scalar("number-inLabel", format!("{number}{in_label}")),
            Feature::scalar("inlabel-outEmpty", format!("{in_label}{out_empty}")),
            Feature::scalar("name", &vertex.name),
            Feature::scalar(
                "nameOrInstance",
                if vertex.has_name() { vertex.name.as_str() } else { instance },
            ),
            Feature::scalar("instance", instance),
            Feature::scalar("lemma", lemma),
            Feature::scalar("lemma-parentMode", format!("{lemma}{}", ctx.parent_mode())),
            Feature::scalar("name-inLabel", format!("{}{in_label}", vertex.name)),
            Feature::scalar("number-modPOS", format!("{number}{mod_pos}")),
            Feature::scalar("modInst-instance", format!("{mod_inst}{instance}")),
            Feature::scalar("hasName-instance", format!("{}{instance}", vertex.has_name())),
            Feature::scalar("isCountry", instance == "country" && vertex.has_name()),
            Feature::list("outPosTag", children.iter().map(|c| pos_or_prop(c))),
            out_label_pos_list.clone(),
            Feature::list(
                "childrenWithLabels",
                ctx.out_edges
                    .iter()
                    .zip(&children)
                    .map(|(e, c)| format!("{}{}", e.label, instance_or_numeric(c))),
            ),
            Feature::scalar("instance-outEmpty", format!("{instance}{out_empty}")),
            Feature::scalar("parentInst-inLabel", format!("{parent_instance}{in_label}")),
            Feature::scalar("outSize", ctx.out_edges.len()),
            Feature::scalar("outEmpty", out_empty),
            Feature::scalar("depth", amr.subtree_size(vertex.id)),
            Feature::scalar("numberOfArgs", arg_count),
            out_label_pos_list.compose(&in_label_feature, "*c2"),
            Feature::scalar(
                "parentInst-grandparentInst",
                format!("{parent_instance}{}", ctx.grandparent_instance()),
            ),
            out_label_list.compose(&in_label_feature, "*c1"),
            out_label_list,
            Feature::list("argOfFeatures", arg_of),
            Feature::list(
                "children",
                children.iter().map(|c| instance_or_numeric(c)),
            ),
            Feature::list(
                "nonLinkChildren",
                children
                    .iter()
                    .filter(|c| !c.is_link())
                    .map(|c| instance_or_numeric(c)),
            ),
            Feature::list("allParentInsts", all_parents),
            Feature::list("allInLabels", all_in_labels),
            Feature::list("allPosInLabels", all_pos_in_labels),
            arg_features,
            arg_link_features,
            Feature::scalar("parentMode", ctx.parent_mode()),
            Feature::scalar("hasInverseLabel", has_inverse_label),
            Feature::scalar("hasInvArgFeature", has_inverse_label && has_arg_label),
        ];
        features.extend(ctx.parent_features());
        features.extend(ctx.neighbour_features());
        features.extend(ctx.ancestor_features());
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FeatureContext;
    use crate::error::FeatureError;
    use crate::prediction::{Prediction, PredictionStore};
    use crate::structure::PROP;
    use amrgen_core::{AmrBuilder, GoldTable, VertexId};

    /// (c / chase-01 :ARG0 (d / dog :mod (b / big)) :ARG1 (c2 / cat) :polarity -)
    fn sample() -> (Amr, VertexId, VertexId, VertexId) {
        let mut b = AmrBuilder::new().with_id("a1");
        let chase = b.add_vertex("chase-01");
        let dog = b.add_vertex("dog");
        let big = b.add_vertex("big");
        let cat = b.add_vertex("cat");
        let neg = b.add_vertex("-");
        b.set_pos(dog, "NN");
        b.set_pos(big, "JJ");
        b.set_pos(cat, "NNS");
        b.add_edge(chase, dog, ":ARG0");
        b.add_edge(dog, big, ":mod");
        b.add_edge(chase, cat, ":ARG1");
        b.add_edge(chase, neg, ":polarity");
        (b.build().unwrap(), chase, dog, cat)
    }

    #[test]
    fn test_eligibility() {
        let (amr, chase, dog, cat) = sample();
        let model = ArticleModel;
        assert!(model.is_eligible(&amr, amr.vertex(dog).unwrap()));
        // Plural nouns are tagged NNS and never take the article model.
        assert!(!model.is_eligible(&amr, amr.vertex(cat).unwrap()));
        assert!(!model.is_eligible(&amr, amr.vertex(chase).unwrap()));
    }

    #[test]
    fn test_ineligible_vertex_is_skipped() {
        let (amr, chase, _, _) = sample();
        let store = PredictionStore::new();
        let extraction = ArticleModel
            .extract(&amr, chase, ExtractionMode::Inference { predictions: &store })
            .unwrap();
        assert!(extraction.is_none());
    }

    #[test]
    fn test_inference_reads_number_prediction() {
        let (amr, _, dog, _) = sample();
        let mut store = PredictionStore::new();

        let err = ArticleModel
            .extract(&amr, dog, ExtractionMode::Inference { predictions: &store })
            .unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingPrediction {
                aspect: Aspect::Article,
                required: Aspect::Number,
                ..
            }
        ));

        store.apply(dog, Aspect::Number, vec![Prediction::new("sg", 0.9)]);
        let extraction = ArticleModel
            .extract(&amr, dog, ExtractionMode::Inference { predictions: &store })
            .unwrap()
            .unwrap();
        let context: &FeatureContext = &extraction.context;

        assert_eq!(extraction.label, None);
        assert_eq!(context.value_of("number"), Some("sg"));
        assert_eq!(context.value_of("modPOS"), Some("JJ"));
        assert_eq!(context.value_of("modInst"), Some("big"));
        assert_eq!(context.value_of("polarityPresent"), Some("false"));
        assert_eq!(context.value_of("parentPos"), Some(PROP));
        assert!(context.contains("outLabels*c1inLabel=:mod|:ARG0"));
        assert!(context.contains("argOfFeatures=0npr"));
        assert!(context.contains("neighbourLabels=:polarity"));
        assert!(context.contains("argFeatures=0no"));
        assert!(context.contains("depth=2"));
    }

    #[test]
    fn test_training_uses_gold_number_and_label() {
        let (amr, _, dog, _) = sample();
        let gold = GoldTable::new()
            .with_label("a1", dog, "number", "sg")
            .with_label("a1", dog, "article", "the");

        let extraction = ArticleModel
            .extract(&amr, dog, ExtractionMode::Training { gold: &gold })
            .unwrap()
            .unwrap();
        assert_eq!(extraction.label.as_deref(), Some("the"));
        assert_eq!(extraction.context.value_of("number-instance"), Some("sgdog"));
    }

    #[test]
    fn test_training_without_gold_is_an_error() {
        let (amr, _, dog, _) = sample();
        let gold = GoldTable::new().with_label("a1", dog, "number", "sg");
        let err = ArticleModel
            .extract(&amr, dog, ExtractionMode::Training { gold: &gold })
            .unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingGoldLabel {
                aspect: Aspect::Article,
                ..
            }
        ));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let (amr, _, dog, _) = sample();
        let mut store = PredictionStore::new();
        store.apply(dog, Aspect::Number, vec![Prediction::new("sg", 0.9)]);
        let mode = ExtractionMode::Inference { predictions: &store };

        let first = ArticleModel.extract(&amr, dog, mode).unwrap();
        let second = ArticleModel.extract(&amr, dog, mode).unwrap();
        assert_eq!(first, second);
    }
}
