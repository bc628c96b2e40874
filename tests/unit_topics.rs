// Unit tests for term vectors, entropy scoring, and TF-IDF weighting.
//
// Tests isolated pure functions: WeightedVector cosine and centroid
// properties, the entropy formula on hand-computed inputs, and the
// vocabulary filters of CorpusTfIdf.

use chronicle::text::{normalize, trim_trailing_citation};
use chronicle::topics::entropy::entropy;
use chronicle::topics::tfidf::{CorpusTfIdf, TfIdfParams};
use chronicle::topics::traits::TermWeighter;
use chronicle::topics::vector::WeightedVector;

fn vector(pairs: &[(&str, f64)]) -> WeightedVector {
    pairs.iter().map(|(k, w)| (*k, *w)).collect()
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// WeightedVector: cosine properties
// ============================================================

#[test]
fn cosine_is_symmetric() {
    let a = vector(&[("storm", 0.7), ("coast", 0.2), ("kerala", 0.4)]);
    let b = vector(&[("storm", 0.1), ("kerala", 0.9), ("rain", 0.3)]);
    assert!((a.cosine(&b) - b.cosine(&a)).abs() < 1e-12);
}

#[test]
fn cosine_with_self_is_one() {
    let a = vector(&[("storm", 0.7), ("coast", 0.2)]);
    assert!((a.cosine(&a) - 1.0).abs() < 1e-12);
}

#[test]
fn cosine_of_disjoint_vectors_is_zero() {
    let a = vector(&[("storm", 0.7)]);
    let b = vector(&[("election", 0.5)]);
    assert_eq!(a.cosine(&b), 0.0);
}

#[test]
fn cosine_with_empty_is_zero() {
    let a = vector(&[("storm", 0.7)]);
    assert_eq!(a.cosine(&WeightedVector::new()), 0.0);
    assert_eq!(WeightedVector::new().cosine(&WeightedVector::new()), 0.0);
}

#[test]
fn averaging_centroid_with_itself_is_a_no_op() {
    let c = vector(&[("storm", 0.7), ("coast", 0.2), ("kerala", 0.4)]);
    assert_eq!(c.average_with(&c), c);
}

#[test]
fn zero_and_negative_weights_are_omitted() {
    let v = vector(&[("kept", 0.5), ("zero", 0.0), ("negative", -1.0), ("nan", f64::NAN)]);
    assert_eq!(v.len(), 1);
    assert_eq!(v.get("zero"), None);
}

#[test]
fn vector_serializes_as_plain_object() {
    let v = vector(&[("b", 0.5), ("a", 0.25)]);
    assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"a":0.25,"b":0.5}"#);
}

// ============================================================
// Entropy
// ============================================================

#[test]
fn entropy_single_term() {
    // count 2 of 3 words: -(2/3) log2(2/3)
    let h = entropy("cat cat dog", &terms(&["cat"]));
    assert!((h - 0.3899).abs() < 1e-4, "got {h}");
}

#[test]
fn entropy_two_terms() {
    let h = entropy("cat cat dog", &terms(&["cat", "dog"]));
    assert!((h - 0.9183).abs() < 1e-4, "got {h}");
}

#[test]
fn entropy_multi_word_term_counts_each_word() {
    // "new york" once, 2 words of 4: p = 0.5
    let h = entropy("New York mourns today", &terms(&["New York"]));
    assert!((h - 0.5).abs() < 1e-9, "got {h}");
}

#[test]
fn entropy_matches_after_punctuation_and_case() {
    let plain = entropy("us troops leave", &terms(&["us"]));
    let dotted = entropy("U.S. troops leave", &terms(&["U.S."]));
    assert!((plain - dotted).abs() < 1e-12);
}

#[test]
fn entropy_of_empty_inputs_is_zero() {
    assert_eq!(entropy("", &terms(&["cat"])), 0.0);
    assert_eq!(entropy("cat dog", &[]), 0.0);
    assert_eq!(entropy("cat dog", &terms(&["zebra"])), 0.0);
}

#[test]
fn entropy_duplicate_terms_count_once() {
    let once = entropy("cat cat dog", &terms(&["cat"]));
    let twice = entropy("cat cat dog", &terms(&["cat", "Cat", "cat"]));
    assert!((once - twice).abs() < 1e-12);
}

#[test]
fn entropy_is_never_negative() {
    // Substring hits push p past 1
    let h = entropy("banana", &terms(&["a"]));
    assert!(h >= 0.0);
}

// ============================================================
// Text preparation
// ============================================================

#[test]
fn trailing_citation_is_trimmed_at_last_outer_period() {
    assert_eq!(
        trim_trailing_citation("Talks resume in Geneva. (Reuters) (AP)"),
        "Talks resume in Geneva"
    );
    assert_eq!(
        trim_trailing_citation("Rates rise (by 0.5 pts). (BBC)"),
        "Rates rise (by 0.5 pts)"
    );
    assert_eq!(trim_trailing_citation("No period (AP)"), "No period (AP)");
}

#[test]
fn normalize_strips_listed_punctuation_only() {
    assert_eq!(normalize("Côte d'Ivoire: vote!"), "côte divoire vote");
}

// ============================================================
// CorpusTfIdf
// ============================================================

fn corpus() -> Vec<String> {
    let mut texts = Vec::new();
    for i in 0..6 {
        texts.push(format!("storm lashes harbor number{i}"));
    }
    for i in 0..6 {
        texts.push(format!("election count delayed district{i}"));
    }
    texts
}

#[test]
fn tfidf_default_params_keep_frequent_shared_terms() {
    let model = CorpusTfIdf::fit(&corpus(), &TfIdfParams::default()).unwrap();
    assert_eq!(model.document_count(), 12);

    let v = model.weigh("storm lashes harbor number0");
    // Frequent shared terms survive; one-off tokens do not
    assert!(v.get("storm").is_some());
    assert!(v.get("number0").is_none());
}

#[test]
fn tfidf_vectors_are_unit_length() {
    let model = CorpusTfIdf::fit(&corpus(), &TfIdfParams::default()).unwrap();
    let v = model.weigh("storm lashes harbor");
    assert!((v.norm() - 1.0).abs() < 1e-9);
}

#[test]
fn tfidf_separates_unrelated_documents() {
    let model = CorpusTfIdf::fit(&corpus(), &TfIdfParams::default()).unwrap();
    let storm = model.weigh("storm lashes harbor");
    let vote = model.weigh("election count delayed");
    assert!(storm.cosine(&vote) < 1e-9);
    assert!(storm.cosine(&model.weigh("storm lashes harbor again")) > 0.99);
}

#[test]
fn tfidf_drops_terms_in_too_many_documents() {
    let texts: Vec<String> = (0..10).map(|i| format!("update report{i}")).collect();
    let params = TfIdfParams {
        min_corpus_frequency: 0,
        min_document_count: 1,
        max_document_ratio: 0.8,
    };
    let model = CorpusTfIdf::fit(&texts, &params).unwrap();
    assert!(model.weigh("update").is_empty());
    assert!(model.weigh("report3").get("report3").is_some());
}

#[test]
fn tfidf_empty_corpus_is_an_error() {
    assert!(CorpusTfIdf::fit(&[], &TfIdfParams::default()).is_err());
}
