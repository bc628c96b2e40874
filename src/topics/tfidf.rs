// Corpus TF-IDF term weighting.
//
// Each event text is a document. The vocabulary is built once over the whole
// export window and then every text is weighed against it:
//
//   1. tokenize on ASCII word characters, lowercase, drop English stop words
//   2. drop tokens seen `min_corpus_frequency` times or fewer in the corpus
//   3. drop tokens found in fewer than `min_document_count` documents or in
//      more than `max_document_ratio` of them
//   4. weight = tf * log2(N / df), then L2-normalize the document vector
//
// Distinctive words shared by a handful of events get the highest weights,
// which is what makes cosine similarity between event vectors meaningful.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::traits::TermWeighter;
use super::vector::WeightedVector;

/// Vocabulary filtering thresholds.
#[derive(Debug, Clone)]
pub struct TfIdfParams {
    /// Tokens must occur more than this many times across the corpus
    pub min_corpus_frequency: usize,
    /// Tokens must appear in at least this many documents
    pub min_document_count: usize,
    /// Tokens appearing in more than this share of documents are dropped
    pub max_document_ratio: f64,
}

impl Default for TfIdfParams {
    fn default() -> Self {
        Self {
            min_corpus_frequency: 5,
            min_document_count: 2,
            max_document_ratio: 0.8,
        }
    }
}

/// TF-IDF model fitted on a corpus of event texts.
pub struct CorpusTfIdf {
    tokenizer: Regex,
    stop_words: HashSet<String>,
    /// term -> log2(N / df)
    idf: HashMap<String, f64>,
    document_count: usize,
}

impl CorpusTfIdf {
    /// Build the vocabulary and IDF table from `texts`.
    pub fn fit(texts: &[String], params: &TfIdfParams) -> Result<Self> {
        if texts.is_empty() {
            anyhow::bail!("No texts to weigh: cannot fit a TF-IDF vocabulary");
        }

        let tokenizer = Regex::new(r"\w+").context("Failed to compile tokenizer pattern")?;
        let stop_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();

        let documents: Vec<Vec<String>> = texts
            .iter()
            .map(|t| tokenize(&tokenizer, &stop_words, t))
            .collect();

        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &documents {
            for token in doc {
                *corpus_frequency.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &documents {
            let unique: HashSet<&str> = doc
                .iter()
                .map(|t| t.as_str())
                .filter(|t| corpus_frequency[t] > params.min_corpus_frequency)
                .collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: HashMap<String, f64> = document_frequency
            .into_iter()
            .filter(|(_, df)| {
                *df >= params.min_document_count && (*df as f64) <= params.max_document_ratio * n
            })
            .map(|(token, df)| (token.to_string(), (n / df as f64).log2()))
            .collect();

        info!(
            documents = documents.len(),
            vocabulary = idf.len(),
            "Fitted TF-IDF vocabulary"
        );

        Ok(Self {
            tokenizer,
            stop_words,
            idf,
            document_count: documents.len(),
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }
}

impl TermWeighter for CorpusTfIdf {
    fn weigh(&self, text: &str) -> WeightedVector {
        let mut tf: HashMap<String, usize> = HashMap::new();
        for token in tokenize(&self.tokenizer, &self.stop_words, text) {
            if self.idf.contains_key(&token) {
                *tf.entry(token).or_insert(0) += 1;
            }
        }

        let raw: Vec<(String, f64)> = tf
            .into_iter()
            .map(|(term, count)| {
                let w = count as f64 * self.idf[&term];
                (term, w)
            })
            .collect();

        let norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm < f64::EPSILON {
            return WeightedVector::new();
        }
        raw.into_iter().map(|(term, w)| (term, w / norm)).collect()
    }
}

fn tokenize(tokenizer: &Regex, stop_words: &HashSet<String>, text: &str) -> Vec<String> {
    let lower = text.trim().to_lowercase();
    tokenizer
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|t| !stop_words.contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissive() -> TfIdfParams {
        TfIdfParams {
            min_corpus_frequency: 0,
            min_document_count: 1,
            max_document_ratio: 0.8,
        }
    }

    fn corpus() -> Vec<String> {
        vec![
            "Earthquake strikes the coast of Japan".to_string(),
            "Tsunami warning issued after earthquake in Japan".to_string(),
            "Election results announced in Brazil".to_string(),
            "Brazil election runoff scheduled".to_string(),
            "Football final ends in a draw".to_string(),
        ]
    }

    #[test]
    fn test_fit_empty_fails() {
        assert!(CorpusTfIdf::fit(&[], &TfIdfParams::default()).is_err());
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let texts = corpus();
        let model = CorpusTfIdf::fit(&texts, &permissive()).unwrap();
        for text in &texts {
            let v = model.weigh(text);
            assert!(!v.is_empty(), "Expected weights for {text:?}");
            assert!((v.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stop_words_are_dropped() {
        let model = CorpusTfIdf::fit(&corpus(), &permissive()).unwrap();
        let v = model.weigh("the earthquake in Japan");
        assert!(v.get("the").is_none());
        assert!(v.get("in").is_none());
        assert!(v.get("earthquake").is_some());
    }

    #[test]
    fn test_related_events_are_similar() {
        let texts = corpus();
        let model = CorpusTfIdf::fit(&texts, &permissive()).unwrap();
        let quake_a = model.weigh(&texts[0]);
        let quake_b = model.weigh(&texts[1]);
        let football = model.weigh(&texts[4]);
        assert!(quake_a.cosine(&quake_b) > quake_a.cosine(&football));
    }

    #[test]
    fn test_rare_terms_filtered_by_default() {
        // No token appears more than five times, so the default thresholds
        // leave an empty vocabulary.
        let model = CorpusTfIdf::fit(&corpus(), &TfIdfParams::default()).unwrap();
        assert_eq!(model.vocabulary_size(), 0);
        assert!(model.weigh("earthquake japan").is_empty());
    }

    #[test]
    fn test_ubiquitous_terms_filtered() {
        let texts = vec![
            "storm lashes harbor".to_string(),
            "storm lashes marina".to_string(),
            "storm swamps village".to_string(),
        ];
        let params = TfIdfParams {
            min_corpus_frequency: 0,
            min_document_count: 1,
            max_document_ratio: 0.8,
        };
        let model = CorpusTfIdf::fit(&texts, &params).unwrap();
        assert!(model.weigh("storm").is_empty());
        assert!(!model.weigh("lashes").is_empty());
    }
}
