// Export: stored events -> scored events file for clustering.
//
// For each event the trailing source attribution is trimmed off the text,
// then:
//   - salient entities come from the configured extractor
//   - the entropy score is computed over those entities
//   - the TF-IDF vector is computed against the whole export window
//
// A failing extractor degrades only its record: entities and vector stay
// empty, the entropy is 0, and the failure is kept in `enrichment_error`.
// Degraded texts still count toward the TF-IDF corpus.

use anyhow::Result;
use tracing::{info, warn};

use crate::db::models::StoredEvent;
use crate::entities::{salient_spots, EntityExtractor};
use crate::error::ChronicleError;
use crate::interchange::{EventsFile, ScoredEvent};
use crate::output::progress_bar;
use crate::text::trim_trailing_citation;
use crate::topics::entropy::entropy;
use crate::topics::tfidf::{CorpusTfIdf, TfIdfParams};
use crate::topics::traits::TermWeighter;
use crate::topics::vector::WeightedVector;

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Entities below this confidence are dropped.
    pub confidence_floor: f64,
    pub tfidf: TfIdfParams,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            confidence_floor: crate::entities::DEFAULT_CONFIDENCE_FLOOR,
            tfidf: TfIdfParams::default(),
        }
    }
}

/// Event text as used for scoring: trailing attribution cut, whitespace
/// trimmed.
pub fn scoring_text(text: &str) -> String {
    trim_trailing_citation(text).trim().to_string()
}

/// Score `events` in order.
pub async fn build_events_file(
    events: &[StoredEvent],
    extractor: &dyn EntityExtractor,
    settings: &ExportSettings,
) -> Result<EventsFile> {
    if events.is_empty() {
        return Ok(EventsFile::default());
    }

    let texts: Vec<String> = events
        .iter()
        .map(|e| scoring_text(&e.record.text))
        .collect();

    let pb = progress_bar(events.len() as u64, "  Entities [{bar:30}] {pos}/{len} ({eta})")?;
    let mut scored = Vec::with_capacity(events.len());
    for (event, text) in events.iter().zip(&texts) {
        let record = &event.record;
        let (entities, enrichment_error) = match extractor.extract(text).await {
            Ok(terms) => (salient_spots(&terms, settings.confidence_floor), None),
            Err(e) => {
                let err = ChronicleError::upstream(extractor.name(), format!("{e:#}"));
                warn!(id = record.id, error = %err, "Entity extraction failed, degrading record");
                (Vec::new(), Some(err.to_string()))
            }
        };

        scored.push(ScoredEvent {
            id: record.id,
            date: record.date,
            text: text.clone(),
            entropy: entropy(text, &entities),
            entities,
            tf_idf: WeightedVector::new(),
            enrichment_error,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    let weighter = CorpusTfIdf::fit(&texts, &settings.tfidf)?;
    for event in scored.iter_mut().filter(|e| !e.is_degraded()) {
        event.tf_idf = weighter.weigh(&event.text);
    }

    let degraded = scored.iter().filter(|e| e.is_degraded()).count();
    info!(
        events = scored.len(),
        degraded,
        vocabulary = weighter.vocabulary_size(),
        "Events scored"
    );

    Ok(EventsFile { events: scored })
}
