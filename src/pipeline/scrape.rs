// Day scraping: portal page -> extracted events -> stored events.
//
// Each day goes through the same steps:
//   1. skip it if it was already scraped
//   2. parse the day's block out of the month page and extract its events
//   3. resolve the events' references to stored article ids
//   4. store the events and mark the day scraped in one transaction
//
// A storage failure leaves neither events nor the mark behind, so the next
// run redoes the day from scratch. A day with no events is not marked: its
// block may simply not be published yet.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use super::references::resolve_references;
use crate::db::models::DayEvent;
use crate::db::Database;
use crate::error::ChronicleError;
use crate::extract::html::parse_day_section;
use crate::extract::walker::extract_events;
use crate::wiki::{ArticleSource, WikiClient};

/// What happened to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayReport {
    AlreadyScraped,
    /// No events found. The day stays unmarked and is retried next run.
    Empty { skipped: usize },
    Stored { events: usize, skipped: usize },
}

/// Totals for a range of days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub days_scraped: usize,
    pub days_skipped: usize,
    /// Days without events, left for a later run
    pub days_empty: usize,
    pub days_failed: usize,
    pub events_stored: usize,
    /// Malformed subtrees skipped during extraction
    pub structural_skips: usize,
}

fn is_storage_failure(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ChronicleError>(),
        Some(ChronicleError::Lookup(_))
    )
}

/// Extract, resolve and store the events for `date` from its month page.
pub async fn store_day(
    db: &dyn Database,
    source: &dyn ArticleSource,
    date: NaiveDate,
    month_html: &str,
    concurrency: usize,
) -> Result<DayReport> {
    if db
        .is_date_scraped(date)
        .await
        .map_err(ChronicleError::Lookup)?
    {
        return Ok(DayReport::AlreadyScraped);
    }

    let section = parse_day_section(month_html, date)?;
    let extraction = extract_events(&section);
    if extraction.events.is_empty() {
        info!(
            date = %date,
            skipped = extraction.skipped.len(),
            "No events for day, leaving it unmarked"
        );
        return Ok(DayReport::Empty {
            skipped: extraction.skipped.len(),
        });
    }

    let index = resolve_references(db, source, &extraction.events, concurrency).await?;

    let batch: Vec<DayEvent> = extraction
        .events
        .iter()
        .map(|event| {
            let refs = index.for_event(event);
            DayEvent {
                record: event.clone(),
                wiki_ids: refs.wiki_ids,
                news_ids: refs.news_ids,
            }
        })
        .collect();
    db.store_day_events(date, &batch)
        .await
        .map_err(ChronicleError::Lookup)?;

    info!(
        date = %date,
        events = extraction.events.len(),
        skipped = extraction.skipped.len(),
        "Day stored"
    );

    Ok(DayReport::Stored {
        events: extraction.events.len(),
        skipped: extraction.skipped.len(),
    })
}

/// Scrape every day in `from..to`.
///
/// Month pages are fetched once per month. A day that fails to fetch or
/// parse is logged and counted; storage failures stop the run.
pub async fn scrape_range(
    db: &dyn Database,
    client: &WikiClient,
    from: NaiveDate,
    to: NaiveDate,
    concurrency: usize,
) -> Result<ScrapeSummary> {
    let mut summary = ScrapeSummary::default();
    if from >= to {
        warn!(from = %from, to = %to, "Empty date range, nothing to scrape");
        return Ok(summary);
    }

    let mut month_page: Option<((i32, u32), String)> = None;

    for date in from.iter_days().take_while(|d| *d < to) {
        if db
            .is_date_scraped(date)
            .await
            .map_err(ChronicleError::Lookup)?
        {
            summary.days_skipped += 1;
            continue;
        }

        let month = (date.year(), date.month());
        let cached = matches!(&month_page, Some((m, _)) if *m == month);
        if !cached {
            match client.fetch_portal_month(date).await {
                Ok(html) => month_page = Some((month, html)),
                Err(e) => {
                    warn!(date = %date, error = %e, "Failed to fetch portal page, skipping day");
                    summary.days_failed += 1;
                    continue;
                }
            }
        }
        let Some((_, html)) = &month_page else {
            continue;
        };

        match store_day(db, client, date, html, concurrency).await {
            Ok(DayReport::Stored { events, skipped }) => {
                summary.days_scraped += 1;
                summary.events_stored += events;
                summary.structural_skips += skipped;
            }
            Ok(DayReport::Empty { skipped }) => {
                summary.days_empty += 1;
                summary.structural_skips += skipped;
            }
            Ok(DayReport::AlreadyScraped) => summary.days_skipped += 1,
            Err(e) if is_storage_failure(&e) => return Err(e),
            Err(e) => {
                warn!(date = %date, error = %e, "Failed to scrape day, continuing");
                summary.days_failed += 1;
            }
        }
    }

    Ok(summary)
}
