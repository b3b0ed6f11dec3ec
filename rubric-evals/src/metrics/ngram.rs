//! N-gram counting for BLEU and ROUGE.

use std::collections::HashMap;

/// Occurrence counts of each n-gram in a token sequence.
pub type NgramCounts<'a> = HashMap<&'a [String], usize>;

/// Count the n-grams of order `n` in `tokens`.
///
/// Returns an empty map when `n` is zero or longer than the sequence.
pub fn ngram_counts(tokens: &[String], n: usize) -> NgramCounts<'_> {
    let mut counts = HashMap::new();
    if n == 0 || n > tokens.len() {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Number of n-grams of order `n` in a sequence of `len` tokens.
pub fn ngram_total(len: usize, n: usize) -> usize {
    if n == 0 { 0 } else { (len + 1).saturating_sub(n) }
}

/// Sum over candidate n-grams of their count clipped to the reference count.
pub fn clipped_overlap(candidate: &NgramCounts<'_>, reference: &NgramCounts<'_>) -> usize {
    candidate
        .iter()
        .map(|(gram, count)| (*count).min(reference.get(gram).copied().unwrap_or(0)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn ngram_counts_counts_repeated_windows() {
        let toks = tokens("a b a b");
        let bigrams = ngram_counts(&toks, 2);

        assert_eq!(bigrams.len(), 2);
        assert_eq!(bigrams[&toks[0..2]], 2);
        assert_eq!(bigrams[&toks[1..3]], 1);
    }

    #[test]
    fn ngram_counts_is_empty_for_orders_beyond_length() {
        let toks = tokens("a b");
        assert!(ngram_counts(&toks, 3).is_empty());
        assert!(ngram_counts(&toks, 0).is_empty());
    }

    #[test]
    fn ngram_total_matches_window_count() {
        assert_eq!(ngram_total(6, 1), 6);
        assert_eq!(ngram_total(6, 2), 5);
        assert_eq!(ngram_total(2, 4), 0);
        assert_eq!(ngram_total(3, 0), 0);
    }

    #[test]
    fn clipped_overlap_caps_counts_at_reference() {
        let candidate = tokens("the the the the");
        let reference = tokens("the cat on the mat");

        let overlap = clipped_overlap(&ngram_counts(&candidate, 1), &ngram_counts(&reference, 1));

        assert_eq!(overlap, 2);
    }
}
