//! Outcome counting with a deterministic "most frequent" rule.

use std::collections::BTreeMap;

/// Counts how often each outcome was observed under each key.
///
/// [`Tally::best`] returns the outcome with the highest count; among outcomes
/// sharing that count the lexicographically smallest wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K: Ord> {
    counts: BTreeMap<K, BTreeMap<String, usize>>,
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation.
    pub fn add(&mut self, key: K, outcome: impl Into<String>) {
        self.add_n(key, outcome, 1);
    }

    /// Record `n` observations at once. Zero records nothing.
    pub fn add_n(&mut self, key: K, outcome: impl Into<String>, n: usize) {
        if n == 0 {
            return;
        }
        *self
            .counts
            .entry(key)
            .or_default()
            .entry(outcome.into())
            .or_insert(0) += n;
    }

    /// Count of one (key, outcome) pair.
    pub fn count(&self, key: &K, outcome: &str) -> usize {
        self.counts
            .get(key)
            .and_then(|outcomes| outcomes.get(outcome))
            .copied()
            .unwrap_or(0)
    }

    /// The most frequent outcome under `key`.
    pub fn best(&self, key: &K) -> Option<&str> {
        self.counts.get(key).and_then(best_of)
    }

    /// Every key mapped to its most frequent outcome.
    pub fn best_map(&self) -> BTreeMap<K, String> {
        self.counts
            .iter()
            .filter_map(|(key, outcomes)| best_of(outcomes).map(|b| (key.clone(), b.to_string())))
            .collect()
    }

    /// All (key, outcome, count) triples in key then outcome order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &str, usize)> + '_ {
        self.counts.iter().flat_map(|(key, outcomes)| {
            outcomes
                .iter()
                .map(move |(outcome, count)| (key, outcome.as_str(), *count))
        })
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn best_of(outcomes: &BTreeMap<String, usize>) -> Option<&str> {
    // Iteration is ascending by outcome, so keeping the first strict maximum
    // resolves ties toward the smallest outcome.
    let mut best: Option<(&str, usize)> = None;
    for (outcome, &count) in outcomes {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((outcome.as_str(), count));
        }
    }
    best.map(|(outcome, _)| outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_is_most_frequent() {
        let mut tally = Tally::new();
        for pos in ["NN", "NN", "NNP", "NN"] {
            tally.add("dog".to_string(), pos);
        }
        assert_eq!(tally.best(&"dog".to_string()), Some("NN"));
        assert_eq!(tally.count(&"dog".to_string(), "NNP"), 1);
        assert_eq!(tally.best(&"cat".to_string()), None);
    }

    #[test]
    fn test_ties_resolve_to_smallest_outcome() {
        let mut tally = Tally::new();
        tally.add(1, "right");
        tally.add(1, "left");
        tally.add(1, "delete");
        tally.add(1, "right");
        tally.add(1, "left");
        assert_eq!(tally.best(&1), Some("left"));
    }

    #[test]
    fn test_add_n_matches_repeated_add() {
        let mut bulk = Tally::new();
        bulk.add_n("country", "delete", 3);
        bulk.add_n("country", "right", 3);
        bulk.add_n("country", "left", 0);

        let mut single = Tally::new();
        for _ in 0..3 {
            single.add("country", "delete");
            single.add("country", "right");
        }
        assert_eq!(bulk, single);
        assert_eq!(bulk.count(&"country", "delete"), 3);
        assert_eq!(bulk.best(&"country"), Some("delete"));
        // A zero count never creates a key.
        bulk.add_n("city", "left", 0);
        assert_eq!(bulk.best(&"city"), None);
        assert_eq!(bulk.len(), 1);
    }

    #[test]
    fn test_best_map_and_entries() {
        let mut tally = Tally::new();
        tally.add(("a", "b"), "x");
        tally.add(("a", "b"), "y");
        tally.add(("a", "b"), "y");
        tally.add(("c", "d"), "z");

        let best = tally.best_map();
        assert_eq!(best[&("a", "b")], "y");
        assert_eq!(best[&("c", "d")], "z");
        assert_eq!(tally.entries().count(), 3);
        assert_eq!(tally.len(), 2);
    }
}
