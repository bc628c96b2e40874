// Entropy score: how evenly an event's text spreads its emphasis across
// its salient terms.
//
// For each distinct salient term t (after punctuation stripping and
// lowercasing):
//
//   count(t) = overlapping substring occurrences of t in the text
//   p(t)     = count(t) * words(t) / words(text)
//   H        = -sum p(t) * log2(p(t))     over terms with p(t) > 0
//
// Multi-word terms weigh proportionally more per occurrence. A text that
// keeps returning to one entity scores low; one that touches many scores
// high. The number is only meaningful relative to other events scored the
// same way.

use std::collections::BTreeMap;

use crate::text::normalize;

/// Score `text` against its salient `terms`. Never negative.
pub fn entropy(text: &str, terms: &[String]) -> f64 {
    let text = normalize(text);
    let total_words = text.split_whitespace().count();
    if total_words == 0 {
        return 0.0;
    }

    // Distinct normalized terms -> weighted occurrence count
    let mut weighted: BTreeMap<String, usize> = BTreeMap::new();
    for term in terms {
        let term = normalize(term).trim().to_string();
        if term.is_empty() || weighted.contains_key(&term) {
            continue;
        }
        let count = count_overlapping(&text, &term);
        let words = term.split_whitespace().count();
        weighted.insert(term, count * words);
    }

    let sum: f64 = weighted
        .values()
        .map(|&w| w as f64 / total_words as f64)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.log2())
        .sum();

    // Substring hits can push p above 1, where -p*log2(p) turns negative.
    sum.max(0.0)
}

/// Count occurrences of `needle` in `haystack`, overlaps included.
fn count_overlapping(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() || needle.len() > haystack.len() {
        return 0;
    }
    haystack
        .char_indices()
        .filter(|(i, _)| haystack[*i..].starts_with(needle))
        .count()
}
