//! Flat token sequences handed to classifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feature::Feature;

/// The ordered tokens of one (graph, vertex, aspect) instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureContext(Vec<String>);

impl FeatureContext {
    /// Concatenate the tokens of `features` in declaration order.
    pub fn from_features(features: &[Feature]) -> Self {
        Self(features.iter().flat_map(Feature::tokens).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// The value of the first token carrying `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.0.iter().find_map(|t| {
            t.split_once('=')
                .filter(|(n, _)| *n == name)
                .map(|(_, v)| v)
        })
    }
}

impl From<Vec<String>> for FeatureContext {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for FeatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_declaration_order() {
        let features = vec![
            Feature::scalar("instance", "dog"),
            Feature::list("outLabels", [":mod", ":quant"]),
            Feature::list("neighbours", Vec::<String>::new()),
            Feature::scalar("inLabel", ":ARG0"),
        ];
        let context = FeatureContext::from_features(&features);

        assert_eq!(
            context.tokens(),
            &[
                "instance=dog",
                "outLabels=:mod",
                "outLabels=:quant",
                "inLabel=:ARG0"
            ]
        );
        assert_eq!(context.value_of("inLabel"), Some(":ARG0"));
        assert_eq!(context.value_of("neighbours"), None);
        assert_eq!(context.to_string(), "instance=dog outLabels=:mod outLabels=:quant inLabel=:ARG0");
    }

    #[test]
    fn test_values_containing_separator() {
        let context = FeatureContext::from_features(&[Feature::scalar("pair", "a=b")]);
        assert_eq!(context.value_of("pair"), Some("a=b"));
        assert!(context.contains("pair=a=b"));
    }
}
