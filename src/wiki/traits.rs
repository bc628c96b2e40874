// Article source trait: where referenced pages come from.
//
// Reference resolution only needs readable content for a path or URL. The
// live implementation is WikiClient; tests plug in canned pages.

use anyhow::Result;
use async_trait::async_trait;

use super::pages::{ArticleContent, NewsContent};

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Same-corpus article by path, e.g. `/wiki/Tigray_War`.
    async fn fetch_article(&self, path: &str) -> Result<ArticleContent>;

    /// External news page by absolute URL.
    async fn fetch_news(&self, url: &str) -> Result<NewsContent>;
}
