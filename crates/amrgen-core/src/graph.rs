//! The AMR graph model: concept vertices, labeled relations and the alignment
//! of both to the tokens of the source sentence.
//!
//! The topology is immutable once built. Re-entrant vertices are expanded into
//! link vertices so that every vertex has exactly one rendering parent; a link
//! refers to its original by id and never owns it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::span::leftmost_contiguous;

/// Label carried by every concept-defining edge.
pub const INSTANCE_LABEL: &str = ":instance";

/// Identifier for vertices within an [`Amr`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VertexId(pub u64);

/// Identifier for edges within an [`Amr`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EdgeId(pub u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// One concept instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique identifier for this vertex.
    pub id: VertexId,
    /// Concept symbol, e.g. `want-01`, `boy` or `5`.
    pub instance: String,
    /// Part-of-speech tag, absent until tagged.
    #[serde(default)]
    pub pos: Option<String>,
    /// Surface name for named entities, empty otherwise.
    #[serde(default)]
    pub name: String,
    /// AMR `:mode` value (`imperative`, `interrogative`, ...), empty if none.
    #[serde(default)]
    pub mode: String,
    /// Whether an earlier transformation removed this vertex from the output.
    #[serde(default)]
    pub deleted: bool,
    /// Original vertex this link re-renders.
    #[serde(default)]
    pub link_of: Option<VertexId>,
    /// The self-loop edge that defines this vertex's concept.
    pub instance_edge: EdgeId,
}

impl Vertex {
    /// Whether this vertex is a re-entrant reference to another vertex.
    pub fn is_link(&self) -> bool {
        self.link_of.is_some()
    }

    /// The vertex this one stands for: its original for links, itself otherwise.
    pub fn original(&self) -> VertexId {
        self.link_of.unwrap_or(self.id)
    }

    /// Whether the concept is a sense-tagged predicate such as `want-01`.
    pub fn is_propbank_entry(&self) -> bool {
        match self.instance.rsplit_once('-') {
            Some((head, sense)) => {
                !head.is_empty()
                    && !sense.is_empty()
                    && sense.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    /// Concept without its sense suffix (`want-01` becomes `want`).
    pub fn lemma(&self) -> &str {
        if self.is_propbank_entry() {
            if let Some((head, _)) = self.instance.rsplit_once('-') {
                return head;
            }
        }
        &self.instance
    }

    /// The POS tag, if tagged.
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }

    /// Whether the vertex is tagged as a common noun (`NN`, `NNS`, ...).
    pub fn is_noun(&self) -> bool {
        self.pos().is_some_and(|p| p.starts_with("NN"))
    }

    /// Whether the vertex carries a surface name.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether the concept is a numeric literal.
    pub fn is_numeric(&self) -> bool {
        !self.instance.is_empty() && self.instance.chars().all(|c| c.is_ascii_digit() || c == '.')
    }
}

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Relation name such as `:ARG0` or `:mod`.
    pub label: String,
    /// Originating vertex.
    pub from: VertexId,
    /// Destination vertex.
    pub to: VertexId,
    /// Whether this is the concept-defining edge of `from`.
    #[serde(default)]
    pub is_instance: bool,
}

/// Token indices realized by one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub edge: EdgeId,
    pub tokens: BTreeSet<usize>,
}

/// Flat, serializable form of an [`Amr`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmrParts {
    /// Corpus identifier of the graph.
    #[serde(default)]
    pub id: String,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub sentence: Vec<String>,
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub alignments: Vec<Alignment>,
}

/// A validated semantic graph together with its source sentence.
///
/// Vertex insertion order is the traversal order for every consumer, which
/// keeps feature extraction and corpus statistics reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AmrParts", into = "AmrParts")]
pub struct Amr {
    id: String,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    sentence: Vec<String>,
    pos: Vec<String>,
    alignment: BTreeMap<EdgeId, BTreeSet<usize>>,
    root: Option<VertexId>,
    vertex_index: HashMap<VertexId, usize>,
    edge_index: HashMap<EdgeId, usize>,
    /// Relational edges leaving each vertex, in insertion order.
    outgoing: HashMap<VertexId, Vec<EdgeId>>,
    /// The single relational edge entering each non-root vertex.
    incoming: HashMap<VertexId, EdgeId>,
}

impl Amr {
    /// Validate the parts and build the graph indexes.
    pub fn from_parts(parts: AmrParts) -> GraphResult<Self> {
        let AmrParts {
            id,
            vertices,
            edges,
            sentence,
            pos,
            alignments,
        } = parts;

        let mut vertex_index = HashMap::with_capacity(vertices.len());
        for (i, vertex) in vertices.iter().enumerate() {
            if vertex_index.insert(vertex.id, i).is_some() {
                return Err(GraphError::DuplicateVertex { vertex: vertex.id });
            }
        }

        let mut edge_index = HashMap::with_capacity(edges.len());
        for (i, edge) in edges.iter().enumerate() {
            if edge_index.insert(edge.id, i).is_some() {
                return Err(GraphError::DuplicateEdge { edge: edge.id });
            }
            for endpoint in [edge.from, edge.to] {
                if !vertex_index.contains_key(&endpoint) {
                    return Err(GraphError::UnknownVertex { vertex: endpoint });
                }
            }
        }

        for vertex in &vertices {
            let valid = edge_index
                .get(&vertex.instance_edge)
                .map(|&i| &edges[i])
                .is_some_and(|e| e.is_instance && e.from == vertex.id && e.to == vertex.id);
            if !valid {
                return Err(GraphError::InvalidInstanceEdge { vertex: vertex.id });
            }
            if let Some(original) = vertex.link_of {
                let valid = vertex_index
                    .get(&original)
                    .is_some_and(|&i| !vertices[i].is_link());
                if !valid {
                    return Err(GraphError::InvalidLink {
                        vertex: vertex.id,
                        original,
                    });
                }
            }
        }

        let mut outgoing: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
        let mut incoming_all: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
        for edge in edges.iter().filter(|e| !e.is_instance) {
            outgoing.entry(edge.from).or_default().push(edge.id);
            incoming_all.entry(edge.to).or_default().push(edge.id);
        }

        let mut incoming = HashMap::with_capacity(incoming_all.len());
        for (vertex, ids) in incoming_all {
            if ids.len() > 1 {
                return Err(GraphError::MultipleParents {
                    vertex,
                    count: ids.len(),
                });
            }
            incoming.insert(vertex, ids[0]);
        }

        let roots: Vec<VertexId> = vertices
            .iter()
            .map(|v| v.id)
            .filter(|id| !incoming.contains_key(id))
            .collect();
        if !vertices.is_empty() && roots.len() != 1 {
            return Err(GraphError::RootCount { count: roots.len() });
        }

        if !pos.is_empty() && pos.len() != sentence.len() {
            return Err(GraphError::PosLengthMismatch {
                tags: pos.len(),
                tokens: sentence.len(),
            });
        }

        let mut alignment = BTreeMap::new();
        for Alignment { edge, tokens } in alignments {
            if !edge_index.contains_key(&edge) {
                return Err(GraphError::UnknownEdge { edge });
            }
            if let Some(&index) = tokens.iter().find(|&&i| i >= sentence.len()) {
                return Err(GraphError::AlignmentOutOfRange {
                    edge,
                    index,
                    len: sentence.len(),
                });
            }
            alignment
                .entry(edge)
                .or_insert_with(BTreeSet::new)
                .extend(tokens);
        }

        let amr = Self {
            id,
            vertices,
            edges,
            sentence,
            pos,
            alignment,
            root: roots.first().copied(),
            vertex_index,
            edge_index,
            outgoing,
            incoming,
        };

        // With one parent per vertex, a vertex whose ancestor chain is longer
        // than the vertex count never reaches the root.
        let limit = amr.vertices.len();
        for vertex in &amr.vertices {
            let mut current = vertex.id;
            let mut steps = 0;
            while let Some(edge) = amr.incoming(current) {
                current = edge.from;
                steps += 1;
                if steps > limit {
                    return Err(GraphError::Cycle { vertex: vertex.id });
                }
            }
        }

        Ok(amr)
    }

    /// Corpus identifier of the graph, empty if none was given.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The root vertex, `None` only for an empty graph.
    pub fn root(&self) -> Option<&Vertex> {
        self.root.and_then(|id| self.vertex(id))
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// Look up a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertex_index.get(&id).map(|&i| &self.vertices[i])
    }

    /// Look up a vertex, failing with [`GraphError::UnknownVertex`].
    pub fn try_vertex(&self, id: VertexId) -> GraphResult<&Vertex> {
        self.vertex(id)
            .ok_or(GraphError::UnknownVertex { vertex: id })
    }

    /// All edges, instance edges included.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Look up an edge.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|&i| &self.edges[i])
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges, instance edges included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The concept-defining edge of a vertex.
    pub fn instance_edge(&self, vertex: VertexId) -> Option<&Edge> {
        self.vertex(vertex)
            .and_then(|v| self.edge(v.instance_edge))
    }

    /// Relational edges leaving a vertex, in insertion order.
    pub fn outgoing(&self, vertex: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(&vertex)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edge(*id))
    }

    /// The relational edge entering a vertex; `None` for the root.
    pub fn incoming(&self, vertex: VertexId) -> Option<&Edge> {
        self.incoming.get(&vertex).and_then(|id| self.edge(*id))
    }

    /// The rendering parent of a vertex.
    pub fn parent(&self, vertex: VertexId) -> Option<&Vertex> {
        self.incoming(vertex).and_then(|e| self.vertex(e.from))
    }

    /// Targets of the relational edges leaving a vertex.
    pub fn children(&self, vertex: VertexId) -> impl Iterator<Item = &Vertex> + '_ {
        self.outgoing(vertex).filter_map(|e| self.vertex(e.to))
    }

    /// Link vertices that re-render `original`, in insertion order.
    pub fn links_to(&self, original: VertexId) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices
            .iter()
            .filter(move |v| v.link_of == Some(original))
    }

    /// Source tokens.
    pub fn sentence(&self) -> &[String] {
        &self.sentence
    }

    /// POS tags parallel to [`Amr::sentence`]; empty if untagged.
    pub fn pos_tags(&self) -> &[String] {
        &self.pos
    }

    /// Token indices aligned to an edge.
    pub fn alignment(&self, edge: EdgeId) -> Option<&BTreeSet<usize>> {
        self.alignment.get(&edge).filter(|tokens| !tokens.is_empty())
    }

    /// Token indices aligned to a vertex's concept.
    pub fn concept_alignment(&self, vertex: VertexId) -> Option<&BTreeSet<usize>> {
        self.vertex(vertex)
            .and_then(|v| self.alignment(v.instance_edge))
    }

    /// Lower-cased text of the leftmost contiguous run aligned to an edge.
    pub fn aligned_realization(&self, edge: EdgeId) -> Option<String> {
        let tokens = self.alignment(edge)?;
        let words: Vec<String> = leftmost_contiguous(tokens.iter().copied())
            .into_iter()
            .map(|i| self.sentence[i].to_lowercase())
            .collect();
        Some(words.join(" "))
    }

    /// Number of vertices in the subtree rooted at `vertex`, itself included.
    pub fn subtree_size(&self, vertex: VertexId) -> usize {
        let mut size = 0;
        let mut stack = vec![vertex];
        while let Some(current) = stack.pop() {
            size += 1;
            stack.extend(self.outgoing(current).map(|e| e.to));
        }
        size
    }

    /// Assign a POS tag to a vertex.
    pub fn tag_pos(&mut self, vertex: VertexId, pos: impl Into<String>) -> GraphResult<()> {
        let index = *self
            .vertex_index
            .get(&vertex)
            .ok_or(GraphError::UnknownVertex { vertex })?;
        self.vertices[index].pos = Some(pos.into());
        Ok(())
    }

    /// Convert the relational structure to a petgraph `StableDiGraph`.
    /// Returns the graph and a mapping from `VertexId` to `NodeIndex`.
    pub fn to_petgraph(&self) -> (StableDiGraph<Vertex, String>, HashMap<VertexId, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for vertex in &self.vertices {
            let idx = graph.add_node(vertex.clone());
            id_to_index.insert(vertex.id, idx);
        }

        for edge in self.edges.iter().filter(|e| !e.is_instance) {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&edge.from), id_to_index.get(&edge.to))
            {
                graph.add_edge(from_idx, to_idx, edge.label.clone());
            }
        }

        (graph, id_to_index)
    }
}

impl TryFrom<AmrParts> for Amr {
    type Error = GraphError;

    fn try_from(parts: AmrParts) -> GraphResult<Self> {
        Self::from_parts(parts)
    }
}

impl From<Amr> for AmrParts {
    fn from(amr: Amr) -> Self {
        AmrParts {
            id: amr.id,
            vertices: amr.vertices,
            edges: amr.edges,
            sentence: amr.sentence,
            pos: amr.pos,
            alignments: amr
                .alignment
                .into_iter()
                .map(|(edge, tokens)| Alignment { edge, tokens })
                .collect(),
        }
    }
}

/// Sentinel replacing numeric literals in feature values.
pub const NUMERIC: &str = ":NUMERIC";

/// The vertex's concept, with numeric literals other than one collapsed to
/// [`NUMERIC`].
pub fn instance_or_numeric(vertex: &Vertex) -> &str {
    if vertex.is_numeric() && vertex.instance != "1" && vertex.instance != "1.0" {
        NUMERIC
    } else {
        &vertex.instance
    }
}

/// Builder for assembling an [`Amr`] by hand or from a parser.
#[derive(Debug, Default)]
pub struct AmrBuilder {
    id: String,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    sentence: Vec<String>,
    pos: Vec<String>,
    alignments: Vec<Alignment>,
    next_vertex_id: u64,
    next_edge_id: u64,
}

impl AmrBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the corpus identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the source sentence, split on whitespace.
    pub fn with_sentence(mut self, text: &str) -> Self {
        self.sentence = text.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Set the POS tags of the sentence tokens.
    pub fn with_pos_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pos = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add a concept vertex together with its instance edge.
    pub fn add_vertex(&mut self, instance: impl Into<String>) -> VertexId {
        let id = VertexId(self.next_vertex_id);
        self.next_vertex_id += 1;
        let instance_edge = self.push_edge(id, id, INSTANCE_LABEL, true);

        self.vertices.push(Vertex {
            id,
            instance: instance.into(),
            pos: None,
            name: String::new(),
            mode: String::new(),
            deleted: false,
            link_of: None,
            instance_edge,
        });
        id
    }

    /// Add a relation between two vertices.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, label: impl Into<String>) -> EdgeId {
        self.push_edge(from, to, label, false)
    }

    /// Add a link vertex re-rendering `original` below `parent`.
    ///
    /// The link copies the original's concept, POS and name.
    pub fn add_link(
        &mut self,
        original: VertexId,
        parent: VertexId,
        label: impl Into<String>,
    ) -> VertexId {
        let template = self.vertices.iter().find(|v| v.id == original).cloned();
        let instance = template
            .as_ref()
            .map(|v| v.instance.clone())
            .unwrap_or_default();
        let link = self.add_vertex(instance);

        if let Some(vertex) = self.vertices.iter_mut().find(|v| v.id == link) {
            vertex.link_of = Some(original);
            if let Some(template) = template {
                vertex.pos = template.pos;
                vertex.name = template.name;
            }
        }
        self.add_edge(parent, link, label);
        link
    }

    /// Set the POS tag of a vertex.
    pub fn set_pos(&mut self, vertex: VertexId, pos: impl Into<String>) {
        if let Some(v) = self.vertex_mut(vertex) {
            v.pos = Some(pos.into());
        }
    }

    /// Set the surface name of a vertex.
    pub fn set_name(&mut self, vertex: VertexId, name: impl Into<String>) {
        if let Some(v) = self.vertex_mut(vertex) {
            v.name = name.into();
        }
    }

    /// Set the `:mode` of a vertex.
    pub fn set_mode(&mut self, vertex: VertexId, mode: impl Into<String>) {
        if let Some(v) = self.vertex_mut(vertex) {
            v.mode = mode.into();
        }
    }

    /// Mark a vertex as deleted.
    pub fn mark_deleted(&mut self, vertex: VertexId) {
        if let Some(v) = self.vertex_mut(vertex) {
            v.deleted = true;
        }
    }

    /// Align an edge to source tokens.
    pub fn align(&mut self, edge: EdgeId, tokens: impl IntoIterator<Item = usize>) {
        self.alignments.push(Alignment {
            edge,
            tokens: tokens.into_iter().collect(),
        });
    }

    /// Align a vertex's concept (its instance edge) to source tokens.
    pub fn align_concept(&mut self, vertex: VertexId, tokens: impl IntoIterator<Item = usize>) {
        if let Some(edge) = self
            .vertices
            .iter()
            .find(|v| v.id == vertex)
            .map(|v| v.instance_edge)
        {
            self.align(edge, tokens);
        }
    }

    /// Get the current vertex count.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Validate and build the final [`Amr`].
    pub fn build(self) -> GraphResult<Amr> {
        Amr::from_parts(AmrParts {
            id: self.id,
            vertices: self.vertices,
            edges: self.edges,
            sentence: self.sentence,
            pos: self.pos,
            alignments: self.alignments,
        })
    }

    fn push_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        label: impl Into<String>,
        is_instance: bool,
    ) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.push(Edge {
            id,
            label: label.into(),
            from,
            to,
            is_instance,
        });
        id
    }

    fn vertex_mut(&mut self, vertex: VertexId) -> Option<&mut Vertex> {
        self.vertices.iter_mut().find(|v| v.id == vertex)
    }
}
