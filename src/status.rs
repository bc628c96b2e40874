// System status display: database size, row counts, scraped date range.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_path: &str) -> Result<()> {
    if !Path::new(db_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `chronicle init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    let stats = db.stats().await?;

    match (stats.first_scraped, stats.last_scraped) {
        (Some(first), Some(last)) => println!(
            "Scraped days: {} ({} .. {})",
            stats.scraped_days, first, last
        ),
        _ => {
            println!("Scraped days: none");
            println!("  Run `chronicle scrape --from YYYY-MM-DD --to YYYY-MM-DD` to start");
        }
    }

    println!("Events: {}", stats.events);
    println!("Wiki articles: {}", stats.wiki_articles);
    println!(
        "News articles: {} ({} placeholders)",
        stats.news_articles, stats.placeholder_news
    );
    if stats.placeholder_news > 0 {
        println!("  Run `chronicle refetch` to retry failed news pages");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
