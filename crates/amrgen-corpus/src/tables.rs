//! Frequency-ranked lookup tables built from a labeled corpus.
//!
//! Each builder walks every vertex of every graph in corpus order and counts
//! observed outcomes with a [`Tally`]. The "best" outcome is the most frequent
//! one, ties going to the lexicographically smallest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use amrgen_core::{Amr, GoldAnnotations, Vertex};
use amrgen_features::aspect::NO_MERGE;
use amrgen_features::structure::NO_POS;
use amrgen_features::{Aspect, NameOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CorpusError, CorpusResult};
use crate::tally::Tally;

/// Nested lookup `outer → inner → outcome`.
pub type PairTable = BTreeMap<String, BTreeMap<String, String>>;

/// Key of the named-entity ordering table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum NamedEntityKey {
    /// A lower-cased name together with its concept.
    NameAndConcept { name: String, concept: String },
    /// The concept alone, pooling all names.
    Concept { concept: String },
}

/// How often a named entity was realized in one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntityCount {
    pub key: NamedEntityKey,
    pub order: NameOrder,
    pub count: usize,
}

fn pos_key(vertex: &Vertex) -> String {
    vertex.pos().unwrap_or(NO_POS).to_string()
}

fn nest(best: BTreeMap<(String, String), String>) -> PairTable {
    let mut table = PairTable::new();
    for ((outer, inner), outcome) in best {
        table.entry(outer).or_default().insert(inner, outcome);
    }
    table
}

/// Each non-predicate concept mapped to its most frequent POS tag.
///
/// Untagged vertices are not counted.
pub fn best_pos_tags(amrs: &[Amr]) -> BTreeMap<String, String> {
    let mut tally = Tally::new();
    for amr in amrs {
        for vertex in amr.vertices() {
            if vertex.is_propbank_entry() {
                continue;
            }
            if let Some(pos) = vertex.pos() {
                tally.add(vertex.instance.clone(), pos);
            }
        }
    }
    tally.best_map()
}

/// Each (concept, POS) pair mapped to its most frequent realization.
pub fn concept_pos_best_realization(amrs: &[Amr], gold: &dyn GoldAnnotations) -> PairTable {
    let mut tally = Tally::new();
    for amr in amrs {
        for vertex in amr.vertices() {
            if let Some(realization) = gold.realization(amr, vertex.id) {
                tally.add((vertex.instance.clone(), pos_key(vertex)), realization);
            }
        }
    }
    nest(tally.best_map())
}

/// Each (parent concept, child concept) pair that merges, mapped to its most
/// frequent merged concept.
///
/// [`NO_MERGE`] outcomes are not counted, so only mergeable pairs appear.
pub fn merge_map(amrs: &[Amr], gold: &dyn GoldAnnotations) -> PairTable {
    let mut tally = Tally::new();
    for amr in amrs {
        for vertex in amr.vertices() {
            let Some(parent) = amr.parent(vertex.id) else {
                continue;
            };
            match gold.label(amr, vertex.id, Aspect::Merge.name()) {
                Some(merged) if merged != NO_MERGE => {
                    tally.add((parent.instance.clone(), vertex.instance.clone()), merged);
                }
                _ => {}
            }
        }
    }
    nest(tally.best_map())
}

/// Each ordered pair of sibling concepts that merges, mapped to its most
/// frequent merged concept.
pub fn merge_sibling_map(amrs: &[Amr], gold: &dyn GoldAnnotations) -> PairTable {
    let mut tally = Tally::new();
    for amr in amrs {
        for parent in amr.vertices() {
            let siblings: Vec<&Vertex> = amr.children(parent.id).collect();
            for (i, left) in siblings.iter().enumerate() {
                for right in &siblings[i + 1..] {
                    if let Some(merged) = gold.sibling_merge(amr, left.id, right.id) {
                        tally.add((left.instance.clone(), right.instance.clone()), merged);
                    }
                }
            }
        }
    }
    nest(tally.best_map())
}

/// Each concept mapped to every realization observed for it.
pub fn concept_realizations(
    amrs: &[Amr],
    gold: &dyn GoldAnnotations,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut table: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for amr in amrs {
        for vertex in amr.vertices() {
            if let Some(realization) = gold.realization(amr, vertex.id) {
                table
                    .entry(vertex.instance.clone())
                    .or_default()
                    .insert(realization);
            }
        }
    }
    table
}

/// Sorted, duplicate-free concepts of all vertices that reach the output.
pub fn concept_list(amrs: &[Amr]) -> Vec<String> {
    amrs.iter()
        .flat_map(|amr| amr.vertices())
        .filter(|v| !v.deleted && !v.is_link())
        .map(|v| v.instance.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Raw counts behind the named-entity ordering table.
///
/// Every named vertex whose aligned realization has one of the three shapes
/// is counted twice: under its (name, concept) key and under its concept.
pub fn named_entity_counts(amrs: &[Amr], gold: &dyn GoldAnnotations) -> Vec<NamedEntityCount> {
    let mut tally: Tally<NamedEntityKey> = Tally::new();
    for amr in amrs {
        for vertex in amr.vertices().filter(|v| v.has_name()) {
            let Some(realization) = gold.realization(amr, vertex.id) else {
                continue;
            };
            let Some(order) =
                NameOrder::from_realization(&vertex.name, &vertex.instance, &realization)
            else {
                debug!(
                    amr = amr.id(),
                    vertex = %vertex.id,
                    realization = %realization,
                    "realization matches no name order"
                );
                continue;
            };

            let keys = [
                NamedEntityKey::NameAndConcept {
                    name: vertex.name.to_lowercase(),
                    concept: vertex.instance.clone(),
                },
                NamedEntityKey::Concept {
                    concept: vertex.instance.clone(),
                },
            ];
            for key in keys {
                tally.add(key, order.label());
            }
        }
    }

    tally
        .entries()
        .filter_map(|(key, order, count)| {
            order.parse().ok().map(|order| NamedEntityCount {
                key: key.clone(),
                order,
                count,
            })
        })
        .collect()
}

/// Most frequent name order per (name, concept) and per concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntityTable {
    /// concept → lower-cased name → order
    pub by_name: BTreeMap<String, BTreeMap<String, NameOrder>>,
    /// concept → order
    pub by_concept: BTreeMap<String, NameOrder>,
}

impl NamedEntityTable {
    /// Pick the most frequent order of every key.
    pub fn from_counts(counts: &[NamedEntityCount]) -> Self {
        let mut tally: Tally<&NamedEntityKey> = Tally::new();
        for entry in counts {
            tally.add_n(&entry.key, entry.order.label(), entry.count);
        }

        let mut table = Self::default();
        for (key, order) in tally.best_map() {
            let Ok(order) = order.parse::<NameOrder>() else {
                continue;
            };
            match key {
                NamedEntityKey::NameAndConcept { name, concept } => {
                    table
                        .by_name
                        .entry(concept.clone())
                        .or_default()
                        .insert(name.clone(), order);
                }
                NamedEntityKey::Concept { concept } => {
                    table.by_concept.insert(concept.clone(), order);
                }
            }
        }
        table
    }

    /// Order for a named concept, preferring the name-specific entry.
    pub fn lookup(&self, name: &str, concept: &str) -> Option<NameOrder> {
        self.by_name
            .get(concept)
            .and_then(|names| names.get(&name.to_lowercase()))
            .or_else(|| self.by_concept.get(concept))
            .copied()
    }
}

/// Every table derived from one corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    /// concept → POS
    pub best_pos: BTreeMap<String, String>,
    /// concept → POS → realization
    pub best_realization: PairTable,
    /// parent concept → child concept → merged concept
    pub merges: PairTable,
    /// left sibling → right sibling → merged concept
    pub sibling_merges: PairTable,
    /// concept → all realizations
    pub realizations: BTreeMap<String, BTreeSet<String>>,
    pub concepts: Vec<String>,
    pub named_entities: NamedEntityTable,
}

impl LookupTables {
    /// Build all tables from a corpus.
    pub fn build(amrs: &[Amr], gold: &dyn GoldAnnotations) -> Self {
        let tables = Self {
            best_pos: best_pos_tags(amrs),
            best_realization: concept_pos_best_realization(amrs, gold),
            merges: merge_map(amrs, gold),
            sibling_merges: merge_sibling_map(amrs, gold),
            realizations: concept_realizations(amrs, gold),
            concepts: concept_list(amrs),
            named_entities: NamedEntityTable::from_counts(&named_entity_counts(amrs, gold)),
        };

        info!(
            graphs = amrs.len(),
            concepts = tables.concepts.len(),
            pos_entries = tables.best_pos.len(),
            merge_pairs = tables.merges.values().map(BTreeMap::len).sum::<usize>(),
            named_entities = tables.named_entities.by_concept.len(),
            "Built lookup tables"
        );
        tables
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: &Path) -> CorpusResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved lookup tables");
        Ok(())
    }

    /// Load tables saved by [`LookupTables::save`].
    pub fn load(path: &Path) -> CorpusResult<Self> {
        if !path.exists() {
            return Err(CorpusError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        let tables: Self = serde_json::from_str(&json)?;
        debug!(path = %path.display(), concepts = tables.concepts.len(), "Loaded lookup tables");
        Ok(tables)
    }

    /// Most frequent realization of a concept under a POS tag.
    pub fn realization(&self, concept: &str, pos: &str) -> Option<&str> {
        self.best_realization
            .get(concept)
            .and_then(|by_pos| by_pos.get(pos))
            .map(String::as_str)
    }

    /// Most frequent merge of a parent and child concept.
    pub fn merge(&self, parent: &str, child: &str) -> Option<&str> {
        self.merges
            .get(parent)
            .and_then(|children| children.get(child))
            .map(String::as_str)
    }
}
