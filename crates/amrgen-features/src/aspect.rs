//! The closed set of surface-realization aspects and their label vocabularies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Label of the merge aspect when a vertex stays separate from its parent.
pub const NO_MERGE: &str = "NO_MERGE";

/// Number labels.
pub const SINGULAR: &str = "sg";
pub const PLURAL: &str = "pl";

/// Article labels.
pub const DEFINITE: &str = "the";
pub const INDEFINITE: &str = "a";
pub const NO_ARTICLE: &str = "none";

/// One surface-realization decision, each modeled by its own classifier.
///
/// The declaration order is the pipeline order: an aspect may only read the
/// predictions of aspects declared before it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Aspect {
    /// Whether a vertex merges with its parent into a single concept.
    Merge,
    /// Position of a named entity's name relative to its concept.
    NameOrder,
    /// Grammatical number of a noun.
    Number,
    /// Article preceding a noun phrase.
    Article,
}

impl Aspect {
    /// All aspects in pipeline order.
    pub const PIPELINE: [Aspect; 4] = [
        Aspect::Merge,
        Aspect::NameOrder,
        Aspect::Number,
        Aspect::Article,
    ];

    /// Stable name used as the prediction key and the gold-label selector.
    pub fn name(self) -> &'static str {
        match self {
            Aspect::Merge => "merge",
            Aspect::NameOrder => "name-order",
            Aspect::Number => "number",
            Aspect::Article => "article",
        }
    }

    /// Aspects whose predictions this aspect's features read.
    pub fn dependencies(self) -> &'static [Aspect] {
        match self {
            Aspect::Article => &[Aspect::Number],
            _ => &[],
        }
    }

    /// Whether `other` is computed before `self` in a pipeline pass.
    pub fn runs_after(self, other: Aspect) -> bool {
        other < self
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aspect {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aspect::PIPELINE
            .into_iter()
            .find(|aspect| aspect.name() == s)
            .ok_or_else(|| FeatureError::UnknownAspect {
                name: s.to_string(),
            })
    }
}

/// Where the name of a named entity goes relative to its concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameOrder {
    /// The name precedes the concept: "germany country".
    Left,
    /// The name follows the concept: "country germany".
    Right,
    /// Only the name is realized: "germany".
    Delete,
}

impl NameOrder {
    pub fn label(self) -> &'static str {
        match self {
            NameOrder::Left => "left",
            NameOrder::Right => "right",
            NameOrder::Delete => "delete",
        }
    }

    /// Classify an aligned realization of a named concept.
    ///
    /// Comparison is case-insensitive. Returns `None` when the realization is
    /// none of the three shapes.
    pub fn from_realization(name: &str, instance: &str, realization: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let instance = instance.to_lowercase();
        let realization = realization.to_lowercase();

        if realization == format!("{name} {instance}") {
            Some(NameOrder::Left)
        } else if realization == format!("{instance} {name}") {
            Some(NameOrder::Right)
        } else if realization == name {
            Some(NameOrder::Delete)
        } else {
            None
        }
    }
}

impl fmt::Display for NameOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NameOrder {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(NameOrder::Left),
            "right" => Ok(NameOrder::Right),
            "delete" => Ok(NameOrder::Delete),
            other => Err(FeatureError::UnknownNameOrder {
                label: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        assert!(Aspect::Article.runs_after(Aspect::Number));
        assert!(!Aspect::Number.runs_after(Aspect::Article));
        assert!(!Aspect::Merge.runs_after(Aspect::Merge));
        for aspect in Aspect::PIPELINE {
            for dep in aspect.dependencies() {
                assert!(aspect.runs_after(*dep), "{aspect} depends on {dep}");
            }
        }
    }

    #[test]
    fn test_aspect_names_round_trip() {
        for aspect in Aspect::PIPELINE {
            assert_eq!(aspect.name().parse::<Aspect>().unwrap(), aspect);
        }
        assert!("tense".parse::<Aspect>().is_err());
        assert_eq!(
            serde_json::to_string(&Aspect::NameOrder).unwrap(),
            "\"name-order\""
        );
    }

    #[test]
    fn test_name_order_from_realization() {
        assert_eq!(
            NameOrder::from_realization("Germany", "country", "germany country"),
            Some(NameOrder::Left)
        );
        assert_eq!(
            NameOrder::from_realization("Germany", "country", "country germany"),
            Some(NameOrder::Right)
        );
        assert_eq!(
            NameOrder::from_realization("Germany", "country", "germany"),
            Some(NameOrder::Delete)
        );
        assert_eq!(
            NameOrder::from_realization("Germany", "country", "the german state"),
            None
        );
    }

    #[test]
    fn test_name_order_labels() {
        assert_eq!("delete".parse::<NameOrder>().unwrap(), NameOrder::Delete);
        assert_eq!(NameOrder::Left.to_string(), "left");
        assert!("l".parse::<NameOrder>().is_err());
    }
}
