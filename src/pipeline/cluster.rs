// Cluster stage: scored events file -> topics.
//
// Records are stably sorted by date first, so same-day events keep their
// file order. Records whose enrichment failed carry no entities and a
// placeholder entropy, and are left out.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::ChronicleError;
use crate::interchange::{EventsFile, TopicsFile};
use crate::topics::clustering::{cluster, Document, Topic};

/// Clustering inputs from an events file, in stable date order.
pub fn documents(file: &EventsFile) -> Vec<Document> {
    let mut docs: Vec<Document> = file
        .events
        .iter()
        .filter(|e| !e.is_degraded())
        .map(|e| e.to_document())
        .collect();

    let degraded = file.events.len() - docs.len();
    if degraded > 0 {
        warn!(degraded, "Skipping records whose enrichment failed");
    }

    docs.sort_by_key(|d| d.date);
    docs
}

pub fn cluster_events(file: &EventsFile, threshold: f64) -> Result<TopicsFile, ChronicleError> {
    let docs = documents(file);
    let topics = cluster(&docs, threshold)?;
    info!(
        documents = docs.len(),
        topics = topics.len(),
        threshold,
        "Clustering complete"
    );
    Ok(TopicsFile { result: topics })
}

/// Topic size -> number of topics of that size.
pub fn size_histogram(topics: &[Topic]) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for topic in topics {
        *histogram.entry(topic.len()).or_insert(0) += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::interchange::ScoredEvent;

    fn event(id: i64, day: u32, error: Option<&str>) -> ScoredEvent {
        ScoredEvent {
            id,
            date: NaiveDate::from_ymd_opt(2022, 1, day).unwrap(),
            text: String::new(),
            entities: vec![],
            tf_idf: [("storm", 1.0)].into_iter().collect(),
            entropy: 0.5,
            enrichment_error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_documents_sorted_stably_without_degraded() {
        let file = EventsFile {
            events: vec![
                event(3, 2, None),
                event(1, 1, None),
                event(9, 1, Some("tagme failed")),
                event(2, 1, None),
            ],
        };
        let ids: Vec<i64> = documents(&file).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_size_histogram() {
        let file = EventsFile {
            events: vec![event(1, 1, None), event(2, 2, None)],
        };
        let topics = cluster_events(&file, 0.35).unwrap().result;
        assert_eq!(size_histogram(&topics), BTreeMap::from([(2, 1)]));
    }
}
