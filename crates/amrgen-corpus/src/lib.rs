//! Corpus aggregation for AMR surface realization.
//!
//! Builds frequency-ranked lookup tables (concept to POS, concept and POS to
//! realization, merge pairs, named-entity word order) from a labeled corpus.
//! The tables serve as fallback predictors and as a source of training labels.

pub mod error;
pub mod gold;
pub mod helpers;
pub mod io;
pub mod tables;
pub mod tally;

pub use error::{CorpusError, CorpusResult};
pub use gold::AlignmentGold;
pub use helpers::{median, permutations, remove_duplicate_words};
pub use io::{load_corpus, save_corpus};
pub use tables::{
    best_pos_tags, concept_list, concept_pos_best_realization, concept_realizations, merge_map,
    merge_sibling_map, named_entity_counts, LookupTables, NamedEntityCount, NamedEntityKey,
    NamedEntityTable, PairTable,
};
pub use tally::Tally;
