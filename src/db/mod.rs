// Database layer: SQLite storage for events, fetched articles, and scrape
// progress.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever CHRONICLE_DB_PATH points
// (defaults to ./chronicle.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use traits::Database;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Open (or create) the database and run migrations.
///
/// This is the main entry point, called by `chronicle init` and by any
/// command that writes to the database.
pub fn initialize(db_path: &str) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;
    debug!(
        path = db_path,
        version = schema::schema_version(&conn)?,
        "Database initialized"
    );

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `chronicle init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Bring older files up to the current schema
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database behind the async trait.
pub fn open_database(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = open(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Create or migrate the database and put it behind the async trait.
pub fn initialize_database(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}
