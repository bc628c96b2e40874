// Entity extractor trait: where salient terms for an event come from.
//
// The default implementation calls the TagMe annotation service. A local
// keyword extractor is available for offline runs and when no API token is
// configured.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::text::strip_punctuation;

/// Annotations less confident than this are dropped.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.1;

/// A span of text an extractor considers salient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalientTerm {
    /// The text as it appears in the input.
    pub spot: String,
    /// 0.0 to 1.0
    pub confidence: f64,
}

/// Trait for extracting salient terms from one event text. Async because
/// the main provider is an HTTP API.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Short name used in logs and enrichment errors.
    fn name(&self) -> &'static str;

    async fn extract(&self, text: &str) -> Result<Vec<SalientTerm>>;
}

/// Spots at or above `floor`, punctuation stripped, first occurrence kept.
pub fn salient_spots(terms: &[SalientTerm], floor: f64) -> Vec<String> {
    let mut spots: Vec<String> = Vec::new();
    for term in terms.iter().filter(|t| t.confidence >= floor) {
        let spot = strip_punctuation(&term.spot).trim().to_string();
        if !spot.is_empty() && !spots.contains(&spot) {
            spots.push(spot);
        }
    }
    spots
}
