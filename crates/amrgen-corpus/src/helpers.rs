//! Small text and list utilities used around candidate generation.

/// Drop every word that is immediately repeated, keeping the last copy.
///
/// `"the the dog barked barked"` becomes `"the dog barked"`. Runs of spaces
/// collapse to single spaces.
pub fn remove_duplicate_words(sentence: &str) -> String {
    let words: Vec<&str> = sentence.split(' ').filter(|w| !w.is_empty()).collect();
    let mut kept: Vec<&str> = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        if words.get(i + 1) != Some(word) {
            kept.push(word);
        }
    }
    kept.join(" ")
}

/// All orderings of `items`, lexicographic in the original positions.
///
/// An empty input has exactly one (empty) ordering.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.is_empty() {
        return vec![Vec::new()];
    }

    let mut result = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first.clone());
            result.push(tail);
        }
    }
    result
}

/// Median of a sample; `None` when empty.
pub fn median(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_duplicate_words() {
        assert_eq!(remove_duplicate_words("the the dog barked barked"), "the dog barked");
        assert_eq!(remove_duplicate_words("a b a b"), "a b a b");
        assert_eq!(remove_duplicate_words("go go go"), "go");
        assert_eq!(remove_duplicate_words(""), "");
    }

    #[test]
    fn test_permutations() {
        let perms = permutations(&["a", "b", "c"]);
        assert_eq!(perms.len(), 6);
        assert_eq!(perms[0], vec!["a", "b", "c"]);
        assert_eq!(perms[1], vec!["a", "c", "b"]);
        assert_eq!(perms[5], vec!["c", "b", "a"]);

        assert_eq!(permutations::<u8>(&[]), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3, 1, 2]), Some(2.0));
        assert_eq!(median(&[4, 1, 3, 2]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
