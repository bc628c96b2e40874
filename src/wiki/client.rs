// HTTP client for the portal host and cited news sites.
//
// Three kinds of page are fetched: the "Current events" month page a day's
// events live on, same-corpus articles referenced by events, and external
// news pages cited by events. Article fetches share one RateLimiter; news
// pages live on many different hosts and are not limited.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use super::pages::{parse_article, parse_news, ArticleContent, NewsContent};
use super::rate_limiter::RateLimiter;
use super::traits::ArticleSource;

/// Default portal host.
pub const DEFAULT_PORTAL_URL: &str = "https://en.wikipedia.org";

/// Path of the month page holding `date`, e.g.
/// `/wiki/Portal:Current_events/January_2022`.
pub fn portal_month_path(date: NaiveDate) -> String {
    format!("/wiki/Portal:Current_events/{}", date.format("%B_%Y"))
}

pub struct WikiClient {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl WikiClient {
    /// Create a client for the given portal host. `articles_per_second`
    /// bounds same-corpus article fetches.
    pub fn new(base_url: &str, articles_per_second: f64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("chronicle/0.1 (current-events topic tracker)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(articles_per_second),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned {}", url, response.status());
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {url}"))
    }

    /// Raw HTML of the month page that contains `date`.
    pub async fn fetch_portal_month(&self, date: NaiveDate) -> Result<String> {
        let url = format!("{}{}", self.base_url, portal_month_path(date));
        info!(url = %url, "Fetching portal page");
        self.get_html(&url).await
    }
}

#[async_trait]
impl ArticleSource for WikiClient {
    async fn fetch_article(&self, path: &str) -> Result<ArticleContent> {
        self.limiter.acquire().await;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Fetching article");
        let html = self.get_html(&url).await?;
        parse_article(&html)
    }

    async fn fetch_news(&self, url: &str) -> Result<NewsContent> {
        debug!(url = %url, "Fetching news page");
        let html = self.get_html(url).await?;
        let content = parse_news(&html, url)?;
        if content.text.is_empty() {
            anyhow::bail!("No readable text on {url}");
        }
        Ok(content)
    }
}
