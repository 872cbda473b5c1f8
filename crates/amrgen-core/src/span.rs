//! Helpers over sets of aligned token indices.

use std::collections::BTreeSet;

/// Whether the indices form one gap-free run, e.g. `{4, 5, 6}`.
///
/// An empty set is not contiguous.
pub fn is_contiguous(indices: &BTreeSet<usize>) -> bool {
    match (indices.first(), indices.last()) {
        (Some(&min), Some(&max)) => indices.len() == max - min + 1,
        _ => false,
    }
}

/// Leftmost gap-free run of the sorted indices.
///
/// `{2, 3, 4, 6, 8, 9}` yields `[2, 3, 4]`: everything after the first gap is
/// dropped. Duplicates are collapsed; an empty input yields an empty run.
pub fn leftmost_contiguous<I>(indices: I) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
{
    let sorted: BTreeSet<usize> = indices.into_iter().collect();
    let mut run: Vec<usize> = Vec::with_capacity(sorted.len());

    for index in sorted {
        match run.last() {
            Some(&prev) if prev + 1 != index => break,
            _ => run.push(index),
        }
    }

    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[usize]) -> BTreeSet<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_is_contiguous() {
        assert!(is_contiguous(&set(&[3])));
        assert!(is_contiguous(&set(&[4, 5, 6])));
        assert!(!is_contiguous(&set(&[4, 6])));
        assert!(!is_contiguous(&set(&[])));
    }

    #[test]
    fn test_leftmost_contiguous_truncates_at_first_gap() {
        assert_eq!(
            leftmost_contiguous(vec![9, 2, 3, 4, 6, 8, 10, 11]),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_leftmost_contiguous_keeps_full_run() {
        assert_eq!(leftmost_contiguous(vec![7, 5, 6]), vec![5, 6, 7]);
        assert_eq!(leftmost_contiguous(vec![1]), vec![1]);
    }

    #[test]
    fn test_leftmost_contiguous_degenerate_inputs() {
        assert!(leftmost_contiguous(Vec::new()).is_empty());
        assert_eq!(leftmost_contiguous(vec![2, 2, 3]), vec![2, 3]);
    }
}
