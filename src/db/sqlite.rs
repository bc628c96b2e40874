// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across other .await points.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{DayEvent, DbStats, NewsArticle, StoredEvent, WikiArticle};
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn stats(&self) -> Result<DbStats> {
        let conn = self.conn.lock().await;
        super::queries::stats(&conn)
    }

    async fn find_wiki_article(&self, source_url: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        super::queries::find_wiki_article(&conn, source_url)
    }

    async fn insert_wiki_article(&self, article: &WikiArticle) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_wiki_article(&conn, article)
    }

    async fn find_news_article(&self, source_url: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        super::queries::find_news_article(&conn, source_url)
    }

    async fn insert_news_article(&self, article: &NewsArticle) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_news_article(&conn, article)
    }

    async fn update_news_article(&self, article: &NewsArticle) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::update_news_article(&conn, article)
    }

    async fn placeholder_news_articles(&self) -> Result<Vec<NewsArticle>> {
        let conn = self.conn.lock().await;
        super::queries::placeholder_news_articles(&conn)
    }

    async fn store_day_events(&self, date: NaiveDate, events: &[DayEvent]) -> Result<Vec<i64>> {
        let conn = self.conn.lock().await;
        super::queries::store_day_events(&conn, date, events)
    }

    async fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StoredEvent>> {
        let conn = self.conn.lock().await;
        super::queries::events_between(&conn, start, end)
    }

    async fn is_date_scraped(&self, date: NaiveDate) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::is_date_scraped(&conn, date)
    }
}
