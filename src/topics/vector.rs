// Sparse weighted-term vectors and cosine similarity over them.
//
// A WeightedVector maps terms to non-negative weights (typically TF-IDF).
// Zero, negative, and non-finite weights are never stored, so "absent" and
// "zero" mean the same thing everywhere. Two vectors interact only through
// the intersection of their keys.
//
// Backed by a BTreeMap so iteration (and therefore JSON output and
// floating-point summation order) is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A sparse term → weight mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightedVector(BTreeMap<String, f64>);

impl WeightedVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a term's weight. Non-positive or non-finite weights remove the term.
    pub fn insert(&mut self, term: impl Into<String>, weight: f64) {
        let term = term.into();
        if weight.is_finite() && weight > 0.0 {
            self.0.insert(term, weight);
        } else {
            self.0.remove(&term);
        }
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.0.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.0.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Dot product over the shared terms.
    pub fn dot(&self, other: &WeightedVector) -> f64 {
        // Walk the smaller map and look up in the larger one.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .0
            .iter()
            .filter_map(|(term, w)| large.0.get(term).map(|v| w * v))
            .sum()
    }

    /// Cosine similarity in [0.0, 1.0]; 0.0 if either vector is empty.
    pub fn cosine(&self, other: &WeightedVector) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let denom = self.norm() * other.norm();
        if denom < f64::EPSILON {
            0.0
        } else {
            (self.dot(other) / denom).clamp(0.0, 1.0)
        }
    }

    /// Elementwise average with `other`, treating missing terms as zero.
    ///
    /// This is the running centroid update: the previous centroid and the
    /// newcomer count equally, so recent members pull harder than a plain
    /// mean over all members would.
    pub fn average_with(&self, other: &WeightedVector) -> WeightedVector {
        let mut merged = self.0.clone();
        for (term, w) in &other.0 {
            *merged.entry(term.clone()).or_insert(0.0) += w;
        }
        let mut out = WeightedVector::new();
        for (term, w) in merged {
            out.insert(term, w / 2.0);
        }
        out
    }

    /// Terms sorted by descending weight, ties broken alphabetically.
    pub fn top_terms(&self, n: usize) -> Vec<(&str, f64)> {
        let mut terms: Vec<(&str, f64)> = self.iter().collect();
        terms.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        terms.truncate(n);
        terms
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for WeightedVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut v = WeightedVector::new();
        for (term, weight) in iter {
            v.insert(term, weight);
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> WeightedVector {
        pairs.iter().map(|(k, w)| (*k, *w)).collect()
    }

    #[test]
    fn test_zero_and_negative_weights_are_dropped() {
        let v = vector(&[("a", 1.0), ("b", 0.0), ("c", -2.0), ("d", f64::NAN)]);
        assert_eq!(v.len(), 1);
        assert_eq!(v.get("a"), Some(1.0));
        assert_eq!(v.get("b"), None);
    }

    #[test]
    fn test_cosine_self_is_one() {
        let v = vector(&[("war", 0.4), ("peace", 0.3), ("treaty", 0.1)]);
        assert!((v.cosine(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_disjoint_is_zero() {
        let a = vector(&[("war", 0.4)]);
        let b = vector(&[("football", 0.9)]);
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vector(&[("a", 1.0), ("b", 2.0)]);
        let b = vector(&[("b", 0.5), ("c", 3.0)]);
        assert!((a.cosine(&b) - b.cosine(&a)).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_empty_is_zero() {
        let a = vector(&[("a", 1.0)]);
        assert_eq!(a.cosine(&WeightedVector::new()), 0.0);
        assert_eq!(WeightedVector::new().cosine(&a), 0.0);
    }

    #[test]
    fn test_average_with_union_of_terms() {
        let a = vector(&[("a", 1.0)]);
        let b = vector(&[("a", 0.9), ("b", 0.1)]);
        let avg = a.average_with(&b);
        assert!((avg.get("a").unwrap() - 0.95).abs() < 1e-12);
        assert!((avg.get("b").unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_average_with_self_is_unchanged() {
        let v = vector(&[("a", 0.25), ("b", 0.5)]);
        assert_eq!(v.average_with(&v), v);
    }

    #[test]
    fn test_top_terms_order() {
        let v = vector(&[("b", 0.5), ("a", 0.5), ("c", 0.9)]);
        let top: Vec<&str> = v.top_terms(2).into_iter().map(|(t, _)| t).collect();
        assert_eq!(top, vec!["c", "a"]);
    }
}
