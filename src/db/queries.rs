// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.
//
// Articles are keyed by source URL. Inserts go through the UNIQUE constraint
// (`ON CONFLICT DO NOTHING`, then a lookup), so a URL stored by someone else
// in the meantime resolves to the existing row instead of a duplicate.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{DayEvent, DbStats, EventRecord, NewsArticle, StoredEvent, WikiArticle};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Invalid date in database: {raw}"))
}

// --- Wiki articles ---

/// Id of the stored article for `source_url`, if any.
pub fn find_wiki_article(conn: &Connection, source_url: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM wiki_articles WHERE source_url = ?1")?;
    let result = stmt
        .query_row(params![source_url], |row| row.get(0))
        .optional()?;
    Ok(result)
}

/// Store an article and return its id. An existing row for the same URL
/// wins and its id is returned.
pub fn insert_wiki_article(conn: &Connection, article: &WikiArticle) -> Result<i64> {
    let categories = serde_json::to_string(&article.categories)?;
    conn.execute(
        "INSERT INTO wiki_articles (source_url, text, categories)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(source_url) DO NOTHING",
        params![article.source_url, article.text, categories],
    )?;
    find_wiki_article(conn, &article.source_url)?
        .with_context(|| format!("Wiki article vanished after insert: {}", article.source_url))
}

/// Load a full article by URL.
pub fn get_wiki_article(conn: &Connection, source_url: &str) -> Result<Option<WikiArticle>> {
    let mut stmt = conn.prepare(
        "SELECT id, source_url, text, categories FROM wiki_articles WHERE source_url = ?1",
    )?;
    let row: Option<(i64, String, String, String)> = stmt
        .query_row(params![source_url], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .optional()?;

    match row {
        Some((id, source_url, text, categories)) => Ok(Some(WikiArticle {
            id,
            source_url,
            text,
            categories: serde_json::from_str(&categories)?,
        })),
        None => Ok(None),
    }
}

// --- News articles ---

pub fn find_news_article(conn: &Connection, source_url: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM news_articles WHERE source_url = ?1")?;
    let result = stmt
        .query_row(params![source_url], |row| row.get(0))
        .optional()?;
    Ok(result)
}

/// Store a news page (or a placeholder) and return its id. Same conflict
/// rule as wiki articles.
pub fn insert_news_article(conn: &Connection, article: &NewsArticle) -> Result<i64> {
    conn.execute(
        "INSERT INTO news_articles (source_url, fetched_on, title, site_name, text, placeholder)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(source_url) DO NOTHING",
        params![
            article.source_url,
            date_key(article.fetched_on),
            article.title,
            article.site_name,
            article.text,
            article.placeholder,
        ],
    )?;
    find_news_article(conn, &article.source_url)?
        .with_context(|| format!("News article vanished after insert: {}", article.source_url))
}

/// Overwrite the content of an existing row, matched by id.
pub fn update_news_article(conn: &Connection, article: &NewsArticle) -> Result<()> {
    let changed = conn.execute(
        "UPDATE news_articles
         SET title = ?1, site_name = ?2, text = ?3, placeholder = ?4,
             updated_at = datetime('now')
         WHERE id = ?5",
        params![
            article.title,
            article.site_name,
            article.text,
            article.placeholder,
            article.id
        ],
    )?;
    if changed == 0 {
        anyhow::bail!("No news article with id {}", article.id);
    }
    Ok(())
}

/// Rows left behind by failed retrievals, oldest first.
pub fn placeholder_news_articles(conn: &Connection) -> Result<Vec<NewsArticle>> {
    let mut stmt = conn.prepare(
        "SELECT id, source_url, fetched_on FROM news_articles
         WHERE placeholder = 1 ORDER BY id",
    )?;
    let rows: Vec<(i64, String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<rusqlite::Result<_>>()?;

    rows.into_iter()
        .map(|(id, source_url, fetched_on)| {
            let mut article = NewsArticle::placeholder(source_url, parse_date(&fetched_on)?);
            article.id = id;
            Ok(article)
        })
        .collect()
}

// --- Events ---

/// Store an event with the ids its references resolved to. Returns the new
/// event id.
pub fn insert_event(
    conn: &Connection,
    event: &EventRecord,
    wiki_ids: &[i64],
    news_ids: &[i64],
) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (date, category, tags, text, internal_refs, external_refs,
                             wiki_article_ids, news_article_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            date_key(event.date),
            event.category,
            serde_json::to_string(&event.tags)?,
            event.text,
            serde_json::to_string(&event.internal_refs)?,
            serde_json::to_string(&event.external_refs)?,
            serde_json::to_string(wiki_ids)?,
            serde_json::to_string(news_ids)?,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Store one day's events and mark the day scraped, all or nothing.
///
/// A failure rolls back every insert, so retrying the day cannot leave
/// duplicate rows. Returns the new event ids in input order.
pub fn store_day_events(
    conn: &Connection,
    date: NaiveDate,
    events: &[DayEvent],
) -> Result<Vec<i64>> {
    let tx = conn
        .unchecked_transaction()
        .context("Failed to begin day transaction")?;
    let mut ids = Vec::with_capacity(events.len());
    for event in events {
        ids.push(insert_event(
            &tx,
            &event.record,
            &event.wiki_ids,
            &event.news_ids,
        )?);
    }
    mark_date_scraped(&tx, date, events.len())?;
    tx.commit()
        .with_context(|| format!("Failed to commit events for {date}"))?;
    Ok(ids)
}

/// Events dated within `start..=end`, in date then id order.
pub fn events_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<StoredEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, category, tags, text, internal_refs, external_refs,
                wiki_article_ids, news_article_ids
         FROM events
         WHERE date BETWEEN ?1 AND ?2
         ORDER BY date, id",
    )?;

    type Row = (
        i64,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
    );
    let rows: Vec<Row> = stmt
        .query_map(params![date_key(start), date_key(end)], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?
        .collect::<rusqlite::Result<_>>()?;

    rows.into_iter()
        .map(
            |(id, date, category, tags, text, internal, external, wiki_ids, news_ids)| {
                Ok(StoredEvent {
                    record: EventRecord {
                        id,
                        date: parse_date(&date)?,
                        category,
                        tags: serde_json::from_str(&tags)?,
                        text,
                        internal_refs: serde_json::from_str(&internal)?,
                        external_refs: serde_json::from_str(&external)?,
                    },
                    wiki_article_ids: serde_json::from_str(&wiki_ids)?,
                    news_article_ids: serde_json::from_str(&news_ids)?,
                })
            },
        )
        .collect()
}

// --- Scraped dates ---

pub fn is_date_scraped(conn: &Connection, date: NaiveDate) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM scraped_dates WHERE date = ?1",
        params![date_key(date)],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn mark_date_scraped(conn: &Connection, date: NaiveDate, event_count: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO scraped_dates (date, event_count, scraped_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(date) DO UPDATE SET event_count = ?2, scraped_at = datetime('now')",
        params![date_key(date), event_count as i64],
    )?;
    Ok(())
}

// --- Stats ---

pub fn stats(conn: &Connection) -> Result<DbStats> {
    let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |row| row.get(0))?) };

    let (first, last): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(date), MAX(date) FROM scraped_dates",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(DbStats {
        events: count("SELECT COUNT(*) FROM events")?,
        wiki_articles: count("SELECT COUNT(*) FROM wiki_articles")?,
        news_articles: count("SELECT COUNT(*) FROM news_articles")?,
        placeholder_news: count("SELECT COUNT(*) FROM news_articles WHERE placeholder = 1")?,
        scraped_days: count("SELECT COUNT(*) FROM scraped_dates")?,
        first_scraped: first.as_deref().map(parse_date).transpose()?,
        last_scraped: last.as_deref().map(parse_date).transpose()?,
    })
}
