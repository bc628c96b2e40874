// Database trait: async interface for all storage operations.
//
// Implementor: SqliteDatabase (wraps rusqlite). Methods are async so the
// pipeline can hold an `Arc<dyn Database>` across concurrent retrieval tasks
// without caring how the backend serializes access.
//
// The trait mirrors the queries.rs function signatures.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{DayEvent, DbStats, NewsArticle, StoredEvent, WikiArticle};

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Row counts and scraped date range.
    async fn stats(&self) -> Result<DbStats>;

    // --- Wiki articles ---

    /// Id of the stored article for this path, if any.
    async fn find_wiki_article(&self, source_url: &str) -> Result<Option<i64>>;

    /// Store an article and return its id (the existing id if the URL is
    /// already stored).
    async fn insert_wiki_article(&self, article: &WikiArticle) -> Result<i64>;

    // --- News articles ---

    async fn find_news_article(&self, source_url: &str) -> Result<Option<i64>>;

    /// Store a news page or placeholder and return its id.
    async fn insert_news_article(&self, article: &NewsArticle) -> Result<i64>;

    /// Replace the content of an existing row (matched by id).
    async fn update_news_article(&self, article: &NewsArticle) -> Result<()>;

    /// Rows left by failed retrievals.
    async fn placeholder_news_articles(&self) -> Result<Vec<NewsArticle>>;

    // --- Events ---

    /// Store a day's events and mark the day scraped in one transaction.
    /// Nothing is written if any insert fails. Returns the new event ids.
    async fn store_day_events(&self, date: NaiveDate, events: &[DayEvent]) -> Result<Vec<i64>>;

    /// Events dated within `start..=end`, ordered by date then id.
    async fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredEvent>>;

    // --- Scraped dates ---

    async fn is_date_scraped(&self, date: NaiveDate) -> Result<bool>;
}
