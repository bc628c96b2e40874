// Local entity extraction with RAKE keyword phrases.
//
// No network, no token. Phrase scores are relative to the best phrase in the
// same text, so the top phrase always has confidence 1.0 and the floor cuts
// the long tail.

use anyhow::Result;
use async_trait::async_trait;
use keyword_extraction::rake::{Rake, RakeParams};
use stop_words::{get, LANGUAGE};

use super::traits::{EntityExtractor, SalientTerm};

pub struct KeywordEntityExtractor {
    stop_words: Vec<String>,
    max_phrases: usize,
}

impl Default for KeywordEntityExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl KeywordEntityExtractor {
    pub fn new(max_phrases: usize) -> Self {
        Self {
            stop_words: get(LANGUAGE::English),
            max_phrases,
        }
    }

    /// Ranked phrases with scores normalized by the top score.
    pub fn phrases(&self, text: &str) -> Vec<SalientTerm> {
        let rake = Rake::new(RakeParams::WithDefaults(text, &self.stop_words));
        let ranked: Vec<(String, f32)> = rake.get_ranked_phrases_scores(self.max_phrases);

        let top = ranked.first().map(|(_, s)| *s).unwrap_or(0.0);
        if top <= 0.0 {
            return Vec::new();
        }
        ranked
            .into_iter()
            .map(|(spot, score)| SalientTerm {
                spot,
                confidence: f64::from(score / top),
            })
            .collect()
    }
}

#[async_trait]
impl EntityExtractor for KeywordEntityExtractor {
    fn name(&self) -> &'static str {
        "keywords"
    }

    async fn extract(&self, text: &str) -> Result<Vec<SalientTerm>> {
        Ok(self.phrases(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_phrases() {
        assert!(KeywordEntityExtractor::default().phrases("").is_empty());
    }

    #[test]
    fn test_top_phrase_has_full_confidence() {
        let phrases = KeywordEntityExtractor::default()
            .phrases("Ethiopian federal forces recapture Lalibela from Tigrayan rebels.");
        assert!(!phrases.is_empty());
        assert!((phrases[0].confidence - 1.0).abs() < 1e-6);
        assert!(phrases.iter().all(|p| p.confidence <= 1.0 + 1e-6));
    }
}
