use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use chronicle::config::Config;
use chronicle::db::Database;
use chronicle::entities::{EntityExtractor, KeywordEntityExtractor, TagMeClient};
use chronicle::interchange::{read_json, write_json, EventsFile};
use chronicle::output::terminal;
use chronicle::pipeline::export::ExportSettings;
use chronicle::pipeline::{cluster, export, refetch, scrape};
use chronicle::wiki::WikiClient;

/// Chronicle: current-events extraction and topic tracking.
///
/// Scrapes the dated "Current events" portal into flat event records, then
/// groups related events into topics that evolve over time.
#[derive(Parser)]
#[command(name = "chronicle", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Scrape portal days into the database
    Scrape {
        /// First day to scrape (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Day after the last one to scrape (YYYY-MM-DD, exclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Reference fetches in flight at once (default: CHRONICLE_FETCH_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Extract events from a saved portal page without touching the database
    Extract {
        /// Saved month page HTML
        #[arg(long)]
        html: PathBuf,

        /// Day to extract (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// Score stored events and write the events interchange file
    Export {
        /// First day to export (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Last day to export (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Output file
        #[arg(long)]
        out: PathBuf,

        /// Use offline keyword extraction instead of TagMe
        #[arg(long)]
        local_entities: bool,
    },

    /// Cluster an events file into topics
    Cluster {
        /// Events interchange file
        #[arg(long)]
        input: PathBuf,

        /// Topics output file
        #[arg(long)]
        out: PathBuf,

        /// Similarity a document must exceed to join a topic
        /// (default: CHRONICLE_SIMILARITY_THRESHOLD)
        #[arg(long)]
        threshold: Option<f64>,

        /// How many of the largest topics to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Retry news pages that failed to fetch
    Refetch,

    /// Show system status (DB size, counts, scraped range)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chronicle=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Chronicle database...");
            let config = Config::load()?;
            let db = chronicle::db::initialize_database(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: cargo run -- scrape --from 2022-01-01 --to 2022-02-01");
        }

        Commands::Scrape {
            from,
            to,
            concurrency,
        } => {
            let config = Config::load()?;
            let db = chronicle::db::initialize_database(&config.db_path)?;
            let client = WikiClient::new(&config.portal_url, config.wiki_rate)?;
            let concurrency = concurrency.unwrap_or(config.fetch_concurrency);

            info!(from = %from, to = %to, concurrency, "Scraping portal");
            let summary = scrape::scrape_range(db.as_ref(), &client, from, to, concurrency).await?;
            terminal::display_scrape_summary(&summary);
        }

        Commands::Extract { html, date } => {
            let raw = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read {}", html.display()))?;
            let section = chronicle::extract::html::parse_day_section(&raw, date)?;
            let extraction = chronicle::extract::extract_events(&section);
            terminal::display_extraction(&extraction)?;
        }

        Commands::Export {
            from,
            to,
            out,
            local_entities,
        } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let extractor = create_extractor(&config, local_entities)?;

            let events = db.events_between(from, to).await?;
            if events.is_empty() {
                println!(
                    "{}",
                    format!("No stored events between {from} and {to}.").yellow()
                );
            }
            info!(events = events.len(), extractor = extractor.name(), "Exporting events");

            let settings = ExportSettings {
                confidence_floor: config.entity_floor,
                ..ExportSettings::default()
            };
            let file = export::build_events_file(&events, extractor.as_ref(), &settings).await?;
            write_json(&out, &file)?;
            terminal::display_export_summary(&file);
            println!("Written to {}", out.display());
        }

        Commands::Cluster {
            input,
            out,
            threshold,
            top,
        } => {
            let mut config = Config::load()?;
            if let Some(threshold) = threshold {
                config.similarity_threshold = threshold;
            }
            config.require_valid_threshold()?;

            let file: EventsFile = read_json(&input)?;
            let topics = cluster::cluster_events(&file, config.similarity_threshold)?;
            write_json(&out, &topics)?;

            terminal::display_topics(&topics.result, top);
            terminal::display_histogram(&cluster::size_histogram(&topics.result));
            println!("\nWritten to {}", out.display());
        }

        Commands::Refetch => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let client = WikiClient::new(&config.portal_url, config.wiki_rate)?;
            let summary =
                refetch::refetch_placeholders(db.as_ref(), &client, config.fetch_concurrency)
                    .await?;
            if summary.attempted == 0 {
                println!("No placeholder news articles to retry.");
            } else {
                println!(
                    "Recovered {} of {} news pages",
                    summary.recovered.to_string().green(),
                    summary.attempted
                );
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            if !std::path::Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `chronicle init` to set up the database.");
                return Ok(());
            }
            let db = open_database(&config)?;
            chronicle::status::show(&db, &config.db_path).await?;
        }
    }

    Ok(())
}

/// Open the configured database, or explain how to create it.
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    chronicle::db::open_database(&config.db_path)
}

/// TagMe by default, local keywords on request.
fn create_extractor(config: &Config, local: bool) -> Result<Box<dyn EntityExtractor>> {
    if local {
        info!("Using local keyword entity extractor");
        return Ok(Box::new(KeywordEntityExtractor::default()));
    }

    config.require_tagme()?;
    info!("Using TagMe entity extractor");
    Ok(Box::new(TagMeClient::new(
        &config.tagme_url,
        config.tagme_token.clone(),
    )?))
}
