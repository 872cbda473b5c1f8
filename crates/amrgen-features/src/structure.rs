//! Structural surroundings of a vertex shared by every aspect model.
//!
//! A [`StructuralContext`] walks the tree view once: the ancestor chain up to
//! the root, the parent's other children, the vertex's own relations and the
//! alternate rendering positions contributed by link vertices.

use amrgen_core::{instance_or_numeric, Amr, Edge, Vertex};

use crate::feature::Feature;

/// Sentinel for a missing parent, grandparent or incoming label.
pub const ROOT: &str = ":ROOT";

/// Sentinel replacing the POS tag of predicate-sense concepts.
pub const PROP: &str = ":PROP";

/// Sentinel for a vertex that was never POS-tagged.
pub const NO_POS: &str = ":NOPOS";

/// POS tag of a vertex, [`PROP`] for predicate senses.
pub fn pos_or_prop(vertex: &Vertex) -> &str {
    if vertex.is_propbank_entry() {
        PROP
    } else {
        vertex.pos().unwrap_or(NO_POS)
    }
}

/// One level of the ancestor chain above a vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorStep<'a> {
    /// Label of the edge entering the ancestor.
    pub label: &'a str,
    /// POS tag of the ancestor, or [`PROP`].
    pub pos: &'a str,
    pub is_propbank: bool,
    /// 1 for the parent, 2 for the grandparent, ...
    pub distance: usize,
}

#[derive(Debug, Clone)]
pub struct StructuralContext<'a> {
    pub amr: &'a Amr,
    pub vertex: &'a Vertex,
    pub parent: Option<&'a Vertex>,
    pub grandparent: Option<&'a Vertex>,
    /// Label of the edge entering the vertex, [`ROOT`] at the root.
    pub in_label: &'a str,
    /// Label of the edge entering the parent, [`ROOT`] if there is none.
    pub parent_in_label: &'a str,
    /// Ancestors that themselves have a parent, nearest first.
    pub ancestors: Vec<AncestorStep<'a>>,
    /// Number of edges between the vertex and the root.
    pub distance_to_root: usize,
    /// Relational edges leaving the vertex.
    pub out_edges: Vec<&'a Edge>,
    /// The parent's other relational edges.
    pub neighbours: Vec<&'a Edge>,
}

impl<'a> StructuralContext<'a> {
    pub fn new(amr: &'a Amr, vertex: &'a Vertex) -> Self {
        let incoming = amr.incoming(vertex.id);
        let parent = amr.parent(vertex.id);
        let grandparent = parent.and_then(|p| amr.parent(p.id));
        let in_label = incoming.map_or(ROOT, |e| e.label.as_str());
        let parent_in_label = parent
            .and_then(|p| amr.incoming(p.id))
            .map_or(ROOT, |e| e.label.as_str());

        let mut ancestors = Vec::new();
        let mut distance_to_root = 0;
        let mut current = vertex;
        while let Some(edge) = amr.incoming(current.id) {
            if distance_to_root > 0 {
                ancestors.push(AncestorStep {
                    label: edge.label.as_str(),
                    pos: pos_or_prop(current),
                    is_propbank: current.is_propbank_entry(),
                    distance: distance_to_root,
                });
            }
            distance_to_root += 1;
            match amr.vertex(edge.from) {
                Some(next) => current = next,
                None => break,
            }
        }

        let out_edges: Vec<&Edge> = amr.outgoing(vertex.id).collect();
        let neighbours: Vec<&Edge> = match (parent, incoming) {
            (Some(p), Some(own)) => amr.outgoing(p.id).filter(|e| e.id != own.id).collect(),
            _ => Vec::new(),
        };

        Self {
            amr,
            vertex,
            parent,
            grandparent,
            in_label,
            parent_in_label,
            ancestors,
            distance_to_root,
            out_edges,
            neighbours,
        }
    }

    /// Parent concept with numerals collapsed, or [`ROOT`].
    pub fn parent_instance(&self) -> &'a str {
        self.parent.map_or(ROOT, instance_or_numeric)
    }

    pub fn parent_pos(&self) -> &'a str {
        self.parent.map_or(ROOT, pos_or_prop)
    }

    /// `:mode` of the parent, [`ROOT`] at the root.
    pub fn parent_mode(&self) -> &'a str {
        self.parent.map_or(ROOT, |p| p.mode.as_str())
    }

    pub fn grandparent_instance(&self) -> &'a str {
        self.grandparent.map_or(ROOT, |g| g.instance.as_str())
    }

    pub fn grandparent_pos(&self) -> &'a str {
        self.grandparent.map_or(ROOT, pos_or_prop)
    }

    /// Distinct outgoing labels in edge order.
    pub fn out_labels(&self) -> Vec<&'a str> {
        let mut labels: Vec<&str> = Vec::new();
        for edge in &self.out_edges {
            if !labels.contains(&edge.label.as_str()) {
                labels.push(edge.label.as_str());
            }
        }
        labels
    }

    pub fn has_out_label(&self, label: &str) -> bool {
        self.out_edges.iter().any(|e| e.label == label)
    }

    /// Target of the first outgoing edge with `label`.
    pub fn child(&self, label: &str) -> Option<&'a Vertex> {
        self.out_edges
            .iter()
            .find(|e| e.label == label)
            .and_then(|e| self.amr.vertex(e.to))
    }

    /// Targets of all outgoing edges.
    pub fn children(&self) -> Vec<&'a Vertex> {
        self.out_edges
            .iter()
            .filter_map(|e| self.amr.vertex(e.to))
            .collect()
    }

    /// Every (incoming label, parent) pair the vertex is rendered under.
    ///
    /// The vertex's own position comes first, followed by the position of each
    /// link vertex that re-renders it. Only collected when the vertex itself
    /// has a parent.
    pub fn rendering_positions(&self) -> Vec<(&'a str, &'a Vertex)> {
        let Some(parent) = self.parent else {
            return Vec::new();
        };

        let mut positions = vec![(self.in_label, parent)];
        for link in self.amr.links_to(self.vertex.id) {
            if let (Some(edge), Some(link_parent)) =
                (self.amr.incoming(link.id), self.amr.parent(link.id))
            {
                positions.push((edge.label.as_str(), link_parent));
            }
        }
        positions
    }

    /// Ancestor-chain list features: incoming labels, POS tags and
    /// predicate-sense flags tagged with their distance.
    pub fn ancestor_features(&self) -> Vec<Feature> {
        vec![
            Feature::list("parentPosTags", self.ancestors.iter().map(|a| a.pos)),
            Feature::list("parentInLabels", self.ancestors.iter().map(|a| a.label)),
            Feature::list(
                "parentPropEntries",
                self.ancestors
                    .iter()
                    .map(|a| format!("{}_d:{}", a.is_propbank, a.distance)),
            ),
            Feature::scalar("distToRoot", self.distance_to_root),
        ]
    }

    /// Sibling list features collected from the parent's other edges.
    pub fn neighbour_features(&self) -> Vec<Feature> {
        let targets: Vec<(&str, &Vertex)> = self
            .neighbours
            .iter()
            .filter_map(|e| self.amr.vertex(e.to).map(|v| (e.label.as_str(), v)))
            .collect();

        vec![
            Feature::list("neighbourLabels", targets.iter().map(|(l, _)| *l)),
            Feature::list(
                "neighbourInstances",
                targets.iter().map(|(_, v)| instance_or_numeric(v)),
            ),
            Feature::list(
                "neighbourPosTags",
                targets.iter().map(|(_, v)| pos_or_prop(v)),
            ),
            Feature::list(
                "neighbourLabelPosTags",
                targets
                    .iter()
                    .map(|(l, v)| format!("{},{}", l, pos_or_prop(v))),
            ),
            Feature::scalar("neighbourSize", self.neighbours.len()),
            Feature::scalar("noNeighbours", self.neighbours.is_empty()),
        ]
    }

    /// Parent and grandparent scalar features.
    pub fn parent_features(&self) -> Vec<Feature> {
        vec![
            Feature::scalar("parentInst", self.parent_instance()),
            Feature::scalar("parentPos", self.parent_pos()),
            Feature::scalar("parentInLabel", self.parent_in_label),
            Feature::scalar("grandparentInst", self.grandparent_instance()),
            Feature::scalar("grandparentPos", self.grandparent_pos()),
            Feature::scalar("inLabel", self.in_label),
        ]
    }
}
