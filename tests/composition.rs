// Composition tests: the stages chained the way the CLI chains them.
//
//   portal HTML -> extraction -> scoring -> clustering -> topics file
//
// No network and no database. The entity service is replaced by a fake, and
// the only filesystem use is a temporary directory for the interchange file.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use chronicle::db::models::StoredEvent;
use chronicle::entities::{EntityExtractor, SalientTerm};
use chronicle::extract::extract_events;
use chronicle::extract::html::parse_day_section;
use chronicle::interchange::{read_json, write_json, EventsFile, TopicsFile};
use chronicle::pipeline::cluster::{cluster_events, size_histogram};
use chronicle::pipeline::export::{build_events_file, ExportSettings};
use chronicle::topics::tfidf::TfIdfParams;

/// Capitalized words as entities; refuses texts starting with "FAIL".
struct CapitalizedWords;

#[async_trait]
impl EntityExtractor for CapitalizedWords {
    fn name(&self) -> &'static str {
        "capitalized"
    }

    async fn extract(&self, text: &str) -> Result<Vec<SalientTerm>> {
        if text.starts_with("FAIL") {
            anyhow::bail!("rejected");
        }
        Ok(text
            .split_whitespace()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .map(|w| SalientTerm {
                spot: w.to_string(),
                confidence: 0.9,
            })
            .collect())
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, d).unwrap()
}

fn month_page() -> String {
    let block = |d: u32, items: &str| {
        format!(
            r#"<div id="2022_March_{d}">
  <div class="current-events-heading">March {d}, 2022</div>
  <div class="current-events-content">
    <p><b>Disasters and accidents</b></p>
    <ul>{items}</ul>
  </div>
</div>"#
        )
    };
    let cite = r#"<a rel="nofollow" class="external text" href="https://news.example/x">(Wire)</a>"#;
    format!(
        "<html><body>{}{}{}</body></html>",
        block(1, &format!("<li>Storm floods coastal villages in Kerala. {cite}</li>")),
        block(
            2,
            &format!(
                "<li>Storm floods reach Kerala capital. {cite}</li>\
                 <li>Election results announced in Chile. {cite}</li>"
            )
        ),
        block(3, "<li>FAIL this one</li>"),
    )
}

/// Extract days 1-3 and number the records the way storage would.
fn stored_events(html: &str) -> Vec<StoredEvent> {
    let mut next_id = 1;
    let mut stored = Vec::new();
    for d in 1..=3 {
        let section = parse_day_section(html, day(d)).unwrap();
        let extraction = extract_events(&section);
        assert!(extraction.skipped.is_empty());
        for mut record in extraction.events {
            record.id = next_id;
            next_id += 1;
            stored.push(StoredEvent {
                record,
                wiki_article_ids: vec![],
                news_article_ids: vec![],
            });
        }
    }
    stored
}

fn permissive() -> ExportSettings {
    ExportSettings {
        confidence_floor: 0.1,
        tfidf: TfIdfParams {
            min_corpus_frequency: 0,
            min_document_count: 1,
            max_document_ratio: 1.0,
        },
    }
}

// ============================================================
// Chain: HTML -> records -> scored events
// ============================================================

#[tokio::test]
async fn extracted_records_score_with_trimmed_text() {
    let events = stored_events(&month_page());
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].record.category, "Disasters and accidents");
    assert_eq!(events[1].record.date, day(2));

    let file = build_events_file(&events, &CapitalizedWords, &permissive())
        .await
        .unwrap();
    let storm = &file.events[0];
    assert_eq!(storm.text, "Storm floods coastal villages in Kerala");
    assert_eq!(storm.entities, vec!["Storm", "Kerala"]);
    assert!(storm.entropy > 0.0);
    assert!(storm.tf_idf.get("kerala").is_some());

    let failed = &file.events[3];
    assert!(failed.is_degraded());
    assert!(failed.entities.is_empty());
    assert!(failed.tf_idf.is_empty());
}

// ============================================================
// Chain: scored events -> topics -> interchange file
// ============================================================

#[tokio::test]
async fn related_days_join_one_topic_and_degraded_records_stay_out() {
    let events = stored_events(&month_page());
    let file = build_events_file(&events, &CapitalizedWords, &permissive())
        .await
        .unwrap();

    let topics = cluster_events(&file, 0.1).unwrap();
    let sizes: Vec<usize> = topics.result.iter().map(|t| t.len()).collect();
    assert_eq!(sizes, vec![2, 1]);

    let storm_ids: Vec<i64> = topics.result[0].members.keys().copied().collect();
    assert_eq!(storm_ids, vec![1, 2]);
    assert!(topics.result[1].members.contains_key(&3));
    assert!(topics.result.iter().all(|t| !t.members.contains_key(&4)));

    let histogram = size_histogram(&topics.result);
    assert_eq!(histogram.get(&1), Some(&1));
    assert_eq!(histogram.get(&2), Some(&1));
}

#[tokio::test]
async fn interchange_files_survive_a_write_and_read() {
    let events = stored_events(&month_page());
    let file = build_events_file(&events, &CapitalizedWords, &permissive())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let events_path = dir.path().join("out/events.json");
    write_json(&events_path, &file).unwrap();
    let reread: EventsFile = read_json(&events_path).unwrap();
    assert_eq!(reread.events.len(), 4);
    assert_eq!(reread.events[3].enrichment_error, file.events[3].enrichment_error);

    let topics = cluster_events(&reread, 0.1).unwrap();
    let topics_path = dir.path().join("out/topics.json");
    write_json(&topics_path, &topics).unwrap();
    let reread: TopicsFile = read_json(&topics_path).unwrap();
    assert_eq!(reread.result.len(), 2);
    assert_eq!(reread.result[0].members.len(), 2);
}
