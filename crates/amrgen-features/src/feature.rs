//! Feature primitives and their serialization into classifier tokens.

use serde::{Deserialize, Serialize};

/// A named value derived from a vertex and its surroundings.
///
/// Serialization emits one `name=value` token per distinct value, in the order
/// values were first added. A list with no values emits nothing, which is how
/// an absent feature is expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feature {
    /// Exactly one value.
    Scalar { name: String, value: String },
    /// Zero or more values.
    List { name: String, values: Vec<String> },
}

impl Feature {
    /// Create a scalar feature; the value is stringified.
    pub fn scalar(name: impl Into<String>, value: impl ToString) -> Self {
        Feature::Scalar {
            name: name.into(),
            value: value.to_string(),
        }
    }

    /// Create a list feature; every value is stringified.
    pub fn list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Feature::List {
            name: name.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The feature name.
    pub fn name(&self) -> &str {
        match self {
            Feature::Scalar { name, .. } | Feature::List { name, .. } => name,
        }
    }

    /// Distinct values in first-occurrence order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Feature::Scalar { value, .. } => vec![value.as_str()],
            Feature::List { values, .. } => {
                let mut distinct: Vec<&str> = Vec::with_capacity(values.len());
                for value in values {
                    if !distinct.contains(&value.as_str()) {
                        distinct.push(value);
                    }
                }
                distinct
            }
        }
    }

    /// Whether the feature emits no tokens.
    pub fn is_empty(&self) -> bool {
        match self {
            Feature::Scalar { .. } => false,
            Feature::List { values, .. } => values.is_empty(),
        }
    }

    /// Append a value to a list feature. Scalars are left unchanged.
    pub fn push(&mut self, value: impl ToString) {
        if let Feature::List { values, .. } = self {
            values.push(value.to_string());
        }
    }

    /// Serialize into classifier tokens.
    pub fn tokens(&self) -> Vec<String> {
        let name = self.name();
        self.values()
            .into_iter()
            .map(|value| format!("{name}={value}"))
            .collect()
    }

    /// Cross product of this feature's values with `other`'s.
    ///
    /// The result is a list feature named `{self}{tag}{other}` whose values
    /// join each pair with `|`. An empty operand yields an empty feature.
    pub fn compose(&self, other: &Feature, tag: &str) -> Feature {
        let right = other.values();
        let mut values = Vec::new();
        for left in self.values() {
            for value in &right {
                values.push(format!("{left}|{value}"));
            }
        }

        Feature::List {
            name: format!("{}{}{}", self.name(), tag, other.name()),
            values,
        }
    }
}
