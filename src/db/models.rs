// Stored record types: events, the articles they reference, and counts.
//
// Extraction produces EventRecords, storage hands back StoredEvents. Nothing
// here touches rusqlite.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One flat event, with the context inherited from its place in the day's
/// tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Storage id, -1 until persisted.
    pub id: i64,
    pub date: NaiveDate,
    /// Nearest preceding category heading, empty if there was none.
    pub category: String,
    /// Enclosing tag labels, outermost first.
    pub tags: Vec<String>,
    pub text: String,
    /// Same-corpus article paths (from the leaf and every enclosing tag).
    pub internal_refs: BTreeSet<String>,
    /// Citation URLs on the leaf itself.
    pub external_refs: BTreeSet<String>,
}

/// An event as stored, with the ids its references resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub record: EventRecord,
    pub wiki_article_ids: Vec<i64>,
    pub news_article_ids: Vec<i64>,
}

/// An extracted event with its resolved reference ids, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEvent {
    pub record: EventRecord,
    pub wiki_ids: Vec<i64>,
    pub news_ids: Vec<i64>,
}

/// A fetched same-corpus article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiArticle {
    pub id: i64,
    /// Path relative to the portal host, e.g. `/wiki/Tigray_War`.
    pub source_url: String,
    pub text: String,
    pub categories: Vec<String>,
}

/// A fetched external news page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub source_url: String,
    /// Date of the event that cited this page.
    pub fetched_on: NaiveDate,
    pub title: String,
    pub site_name: String,
    pub text: String,
    /// Set for a row left by a failed retrieval. A page that fetched fine
    /// may still have empty text.
    pub placeholder: bool,
}

impl NewsArticle {
    /// A row that only remembers the URL, so `refetch` can try again later.
    pub fn placeholder(source_url: impl Into<String>, fetched_on: NaiveDate) -> Self {
        Self {
            id: -1,
            source_url: source_url.into(),
            fetched_on,
            title: String::new(),
            site_name: String::new(),
            text: String::new(),
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Counts shown by `chronicle status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbStats {
    pub events: i64,
    pub wiki_articles: i64,
    pub news_articles: i64,
    pub placeholder_news: i64,
    pub scraped_days: i64,
    pub first_scraped: Option<NaiveDate>,
    pub last_scraped: Option<NaiveDate>,
}
