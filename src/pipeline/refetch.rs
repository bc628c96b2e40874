// Retry news pages that were stored as placeholders.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::db::models::NewsArticle;
use crate::db::Database;
use crate::error::ChronicleError;
use crate::output::progress_bar;
use crate::wiki::ArticleSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefetchSummary {
    pub attempted: usize,
    pub recovered: usize,
}

/// Fetch every placeholder again and fill in the ones that now succeed.
pub async fn refetch_placeholders(
    db: &dyn Database,
    source: &dyn ArticleSource,
    concurrency: usize,
) -> Result<RefetchSummary> {
    let pending = db
        .placeholder_news_articles()
        .await
        .map_err(ChronicleError::Lookup)?;
    let mut summary = RefetchSummary {
        attempted: pending.len(),
        recovered: 0,
    };
    if pending.is_empty() {
        return Ok(summary);
    }

    let pb = progress_bar(pending.len() as u64, "  Refetch [{bar:30}] {pos}/{len} ({eta})")?;

    // Fetch in parallel, write sequentially
    let fetched: Vec<(NewsArticle, Result<_>)> = stream::iter(pending.into_iter().map(|article| {
        let pb = &pb;
        async move {
            let result = source.fetch_news(&article.source_url).await;
            pb.inc(1);
            (article, result)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;
    pb.finish_and_clear();

    for (mut article, result) in fetched {
        match result {
            Ok(content) => {
                article.title = content.title;
                article.site_name = content.site_name;
                article.text = content.text;
                article.placeholder = false;
                db.update_news_article(&article)
                    .await
                    .map_err(ChronicleError::Lookup)?;
                summary.recovered += 1;
            }
            Err(e) => {
                warn!(url = %article.source_url, error = %e, "News page still unavailable");
            }
        }
    }

    info!(
        attempted = summary.attempted,
        recovered = summary.recovered,
        "Refetch complete"
    );
    Ok(summary)
}
