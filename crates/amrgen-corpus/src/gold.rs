//! Gold labels derived from token alignments alone.

use std::collections::BTreeSet;

use amrgen_core::{leftmost_contiguous, Amr, GoldAnnotations, Vertex, VertexId};
use amrgen_features::aspect::{DEFINITE, INDEFINITE, NO_ARTICLE, NO_MERGE, PLURAL, SINGULAR};
use amrgen_features::{Aspect, NameOrder};

/// Reads gold labels off the aligned sentence of each graph.
///
/// * merge: a vertex aligned to exactly the parent's tokens merges into the
///   realization of that span, otherwise [`NO_MERGE`].
/// * name-order: the aligned span compared against name and concept.
/// * number: plural if an aligned token is tagged `NNS`/`NNPS`, falling back
///   to the vertex's own tag when unaligned.
/// * article: the token right before the aligned span.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlignmentGold;

impl AlignmentGold {
    pub fn new() -> Self {
        Self
    }

    fn merge(&self, amr: &Amr, vertex: &Vertex) -> Option<String> {
        let parent = amr.parent(vertex.id)?;
        let own = amr.concept_alignment(vertex.id);
        let merged = own.is_some() && own == amr.concept_alignment(parent.id);
        if merged {
            amr.aligned_realization(vertex.instance_edge)
        } else {
            Some(NO_MERGE.to_string())
        }
    }

    fn number(&self, amr: &Amr, vertex: &Vertex) -> Option<String> {
        let plural = |tag: &str| tag == "NNS" || tag == "NNPS";
        let tags = amr.pos_tags();
        let is_plural = match amr.concept_alignment(vertex.id) {
            Some(tokens) if !tags.is_empty() => tokens.iter().any(|&i| plural(tags[i].as_str())),
            _ => plural(vertex.pos()?),
        };
        Some(if is_plural { PLURAL } else { SINGULAR }.to_string())
    }

    fn article(&self, amr: &Amr, vertex: &Vertex) -> Option<String> {
        let span = leftmost_contiguous(amr.concept_alignment(vertex.id)?.iter().copied());
        let first = *span.first()?;
        let label = match first
            .checked_sub(1)
            .map(|i| amr.sentence()[i].to_lowercase())
            .as_deref()
        {
            Some("the") => DEFINITE,
            Some("a") | Some("an") => INDEFINITE,
            _ => NO_ARTICLE,
        };
        Some(label.to_string())
    }
}

impl GoldAnnotations for AlignmentGold {
    fn label(&self, amr: &Amr, vertex: VertexId, aspect: &str) -> Option<String> {
        let v = amr.vertex(vertex)?;
        match aspect.parse::<Aspect>().ok()? {
            Aspect::Merge => self.merge(amr, v),
            Aspect::NameOrder => {
                let realization = self.realization(amr, vertex)?;
                NameOrder::from_realization(&v.name, &v.instance, &realization)
                    .map(|order| order.label().to_string())
            }
            Aspect::Number => self.number(amr, v),
            Aspect::Article => self.article(amr, v),
        }
    }

    fn sibling_merge(&self, amr: &Amr, left: VertexId, right: VertexId) -> Option<String> {
        let a: &BTreeSet<usize> = amr.concept_alignment(left)?;
        let b = amr.concept_alignment(right)?;
        if a != b {
            return None;
        }
        let edge = amr.vertex(left)?.instance_edge;
        amr.aligned_realization(edge)
    }
}
