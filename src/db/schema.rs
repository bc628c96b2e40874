// Storage schema for events, their referenced articles, and scraped days.
//
// The base tables are created with IF NOT EXISTS on every open. Later changes
// are numbered migrations listed in MIGRATIONS; `schema_version` records the
// ones already applied, so each runs exactly once per database file.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

/// Base version written by `create_tables`.
const BASE_VERSION: i64 = 1;

/// Numbered migrations applied in order after the base tables.
const MIGRATIONS: &[(i64, &str)] = &[
    // Per-day event counts for `status`, without scanning events
    (
        2,
        "ALTER TABLE scraped_dates ADD COLUMN event_count INTEGER NOT NULL DEFAULT 0;",
    ),
    // Explicit placeholder flag, so a fetched page with no text is not
    // mistaken for a failed retrieval. Older rows only had empty text to go by.
    (
        3,
        "ALTER TABLE news_articles ADD COLUMN placeholder INTEGER NOT NULL DEFAULT 0;
         UPDATE news_articles SET placeholder = 1 WHERE text = '';",
    ),
];

/// Create the base tables and bring the schema up to date. Idempotent.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per extracted event
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,                -- YYYY-MM-DD
            category TEXT NOT NULL,
            tags TEXT NOT NULL,                -- JSON array, outermost first
            text TEXT NOT NULL,
            internal_refs TEXT NOT NULL,       -- JSON array of article paths
            external_refs TEXT NOT NULL,       -- JSON array of citation URLs
            wiki_article_ids TEXT NOT NULL,    -- JSON array of resolved ids
            news_article_ids TEXT NOT NULL,    -- JSON array of resolved ids
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Same-corpus articles, one per path
        CREATE TABLE IF NOT EXISTS wiki_articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_url TEXT NOT NULL UNIQUE,
            text TEXT NOT NULL,
            categories TEXT NOT NULL,          -- JSON array
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Cited news pages, one per URL
        CREATE TABLE IF NOT EXISTS news_articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_url TEXT NOT NULL UNIQUE,
            fetched_on TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            site_name TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Days whose events are already stored
        CREATE TABLE IF NOT EXISTS scraped_dates (
            date TEXT PRIMARY KEY,
            scraped_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [BASE_VERSION],
    )?;

    for (version, sql) in MIGRATIONS {
        apply_migration(conn, *version, sql)?;
    }
    Ok(())
}

fn apply_migration(conn: &Connection, version: i64, sql: &str) -> Result<()> {
    let applied = conn
        .query_row(
            "SELECT version FROM schema_version WHERE version = ?1",
            [version],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if applied {
        return Ok(());
    }

    conn.execute_batch(sql)
        .with_context(|| format!("Migration v{version} failed"))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    info!(version, "Applied schema migration");
    Ok(())
}

/// Highest applied schema version.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Number of user tables, shown after `init`.
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let conn = fresh();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        // schema_version, events, wiki_articles, news_articles, scraped_dates
        assert_eq!(table_count(&conn).unwrap(), 5);
        assert_eq!(schema_version(&conn).unwrap(), 3);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_scraped_dates_store_event_counts() {
        let conn = fresh();
        conn.execute(
            "INSERT INTO scraped_dates (date, event_count) VALUES ('2022-01-01', 12)",
            [],
        )
        .unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT event_count FROM scraped_dates WHERE date = '2022-01-01'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn test_placeholder_migration_flags_empty_rows() {
        // A file from before the placeholder column existed
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (
                 version INTEGER PRIMARY KEY,
                 applied_at TEXT NOT NULL DEFAULT (datetime('now'))
             );
             INSERT INTO schema_version (version) VALUES (1), (2);
             CREATE TABLE news_articles (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 source_url TEXT NOT NULL UNIQUE,
                 fetched_on TEXT NOT NULL,
                 title TEXT NOT NULL DEFAULT '',
                 site_name TEXT NOT NULL DEFAULT '',
                 text TEXT NOT NULL DEFAULT '',
                 updated_at TEXT NOT NULL DEFAULT (datetime('now'))
             );
             CREATE TABLE scraped_dates (
                 date TEXT PRIMARY KEY,
                 scraped_at TEXT NOT NULL DEFAULT (datetime('now')),
                 event_count INTEGER NOT NULL DEFAULT 0
             );
             INSERT INTO news_articles (source_url, fetched_on, text)
             VALUES ('https://a.example/failed', '2022-01-01', ''),
                    ('https://a.example/ok', '2022-01-01', 'Body');",
        )
        .unwrap();

        create_tables(&conn).unwrap();

        let flagged: Vec<String> = conn
            .prepare("SELECT source_url FROM news_articles WHERE placeholder = 1")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(flagged, vec!["https://a.example/failed".to_string()]);
    }

    #[test]
    fn test_source_urls_are_unique() {
        let conn = fresh();
        let insert = "INSERT INTO news_articles (source_url, fetched_on) VALUES ('https://a.example/x', '2022-01-01')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
