use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::entities::{DEFAULT_CONFIDENCE_FLOOR, DEFAULT_TAGME_URL};
use crate::topics::clustering::DEFAULT_THRESHOLD;
use crate::wiki::DEFAULT_PORTAL_URL;

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars (never hardcoded). The .env file is loaded
/// automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Host serving the "Current events" portal and its articles.
    pub portal_url: String,
    /// TagMe API token, required by `export` unless --local-entities is set.
    pub tagme_token: String,
    pub tagme_url: String,
    /// Cosine similarity a document must exceed to join a topic.
    pub similarity_threshold: f64,
    /// Entities below this confidence are dropped.
    pub entity_floor: f64,
    /// Reference fetches in flight at once.
    pub fetch_concurrency: usize,
    /// Same-corpus article fetches per second.
    pub wiki_rate: f64,
}

impl Config {
    /// Load configuration from environment variables. Every setting has a
    /// default except the TagMe token.
    pub fn load() -> Result<Self> {
        Ok(Self {
            db_path: env::var("CHRONICLE_DB_PATH").unwrap_or_else(|_| "./chronicle.db".to_string()),
            portal_url: env::var("CHRONICLE_PORTAL_URL")
                .unwrap_or_else(|_| DEFAULT_PORTAL_URL.to_string()),
            tagme_token: env::var("TAGME_API_TOKEN").unwrap_or_default(),
            tagme_url: env::var("TAGME_URL").unwrap_or_else(|_| DEFAULT_TAGME_URL.to_string()),
            similarity_threshold: parse_var("CHRONICLE_SIMILARITY_THRESHOLD", DEFAULT_THRESHOLD)?,
            entity_floor: parse_var("CHRONICLE_ENTITY_FLOOR", DEFAULT_CONFIDENCE_FLOOR)?,
            fetch_concurrency: parse_var("CHRONICLE_FETCH_CONCURRENCY", 4)?,
            wiki_rate: parse_var("CHRONICLE_WIKI_RATE", 0.5)?,
        })
    }

    /// Check that the TagMe token is configured.
    /// Call this before any operation that must use the annotation service.
    pub fn require_tagme(&self) -> Result<()> {
        if self.tagme_token.is_empty() {
            anyhow::bail!(
                "TAGME_API_TOKEN not set. Add it to your .env file,\n\
                 or pass --local-entities to use offline keyword extraction."
            );
        }
        Ok(())
    }

    /// Check that the clustering threshold is a usable similarity.
    pub fn require_valid_threshold(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            anyhow::bail!(
                "CHRONICLE_SIMILARITY_THRESHOLD must be between 0 and 1, got {}",
                self.similarity_threshold
            );
        }
        Ok(())
    }
}

/// Parse an optional env var, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
