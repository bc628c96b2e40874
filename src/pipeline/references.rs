// Reference resolution: turn an event's links into stored article ids.
//
// Every distinct URL in a batch is resolved once, concurrently:
//
//   1. look it up in storage; a stored row is reused without fetching
//   2. otherwise fetch it and insert it
//
// A same-corpus article that can't be fetched is left out (the event is
// stored without that id). A news page that can't be fetched is stored as a
// placeholder row so `refetch` can try again later, and its id is used.
// Storage failures are not recovered: they abort the batch.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::db::models::{EventRecord, NewsArticle, WikiArticle};
use crate::db::Database;
use crate::error::ChronicleError;
use crate::output::progress_bar;
use crate::wiki::ArticleSource;

/// Stored ids for one event's references, in reference order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRefs {
    pub wiki_ids: Vec<i64>,
    pub news_ids: Vec<i64>,
}

/// URL -> id maps for a batch of events.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    wiki: HashMap<String, i64>,
    news: HashMap<String, i64>,
}

impl ReferenceIndex {
    /// Ids for `event`'s references. Unresolved ones are skipped.
    pub fn for_event(&self, event: &EventRecord) -> ResolvedRefs {
        ResolvedRefs {
            wiki_ids: event
                .internal_refs
                .iter()
                .filter_map(|url| self.wiki.get(url).copied())
                .collect(),
            news_ids: event
                .external_refs
                .iter()
                .filter_map(|url| self.news.get(url).copied())
                .collect(),
        }
    }

    pub fn wiki_resolved(&self) -> usize {
        self.wiki.len()
    }

    pub fn news_resolved(&self) -> usize {
        self.news.len()
    }
}

/// Only site-relative paths are same-corpus articles.
fn is_article_path(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

fn lookup(err: anyhow::Error) -> anyhow::Error {
    ChronicleError::Lookup(err).into()
}

async fn resolve_wiki(
    db: &dyn Database,
    source: &dyn ArticleSource,
    path: &str,
) -> Result<Option<i64>> {
    if let Some(id) = db.find_wiki_article(path).await.map_err(lookup)? {
        debug!(path, id, "Article already stored");
        return Ok(Some(id));
    }

    match source.fetch_article(path).await {
        Ok(content) => {
            let article = WikiArticle {
                id: -1,
                source_url: path.to_string(),
                text: content.text,
                categories: content.categories,
            };
            let id = db.insert_wiki_article(&article).await.map_err(lookup)?;
            Ok(Some(id))
        }
        Err(e) => {
            warn!(path, error = %e, "Failed to fetch article, leaving reference unresolved");
            Ok(None)
        }
    }
}

async fn resolve_news(
    db: &dyn Database,
    source: &dyn ArticleSource,
    url: &str,
    date: NaiveDate,
) -> Result<i64> {
    if let Some(id) = db.find_news_article(url).await.map_err(lookup)? {
        debug!(url, id, "News page already stored");
        return Ok(id);
    }

    let article = match source.fetch_news(url).await {
        Ok(content) => NewsArticle {
            id: -1,
            source_url: url.to_string(),
            fetched_on: date,
            title: content.title,
            site_name: content.site_name,
            text: content.text,
            placeholder: false,
        },
        Err(e) => {
            warn!(url, error = %e, "Failed to fetch news page, storing placeholder");
            NewsArticle::placeholder(url, date)
        }
    };
    db.insert_news_article(&article).await.map_err(lookup)
}

/// Resolve every reference of `events` with at most `concurrency` fetches
/// in flight.
pub async fn resolve_references(
    db: &dyn Database,
    source: &dyn ArticleSource,
    events: &[EventRecord],
    concurrency: usize,
) -> Result<ReferenceIndex> {
    let mut wiki_urls: BTreeSet<&str> = BTreeSet::new();
    // News pages remember the first event date that cited them
    let mut news_urls: BTreeMap<&str, NaiveDate> = BTreeMap::new();
    for event in events {
        wiki_urls.extend(
            event
                .internal_refs
                .iter()
                .map(String::as_str)
                .filter(|href| is_article_path(href)),
        );
        for url in &event.external_refs {
            news_urls.entry(url.as_str()).or_insert(event.date);
        }
    }

    let concurrency = concurrency.max(1);
    let pb = progress_bar(
        (wiki_urls.len() + news_urls.len()) as u64,
        "  References [{bar:30}] {pos}/{len} ({eta})",
    )?;

    let wiki_results: Vec<Result<(String, Option<i64>)>> =
        stream::iter(wiki_urls.into_iter().map(|path| {
            let pb = &pb;
            async move {
                let result = resolve_wiki(db, source, path)
                    .await
                    .map(|id| (path.to_string(), id));
                pb.inc(1);
                result
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let news_results: Vec<Result<(String, i64)>> =
        stream::iter(news_urls.into_iter().map(|(url, date)| {
            let pb = &pb;
            async move {
                let result = resolve_news(db, source, url, date)
                    .await
                    .map(|id| (url.to_string(), id));
                pb.inc(1);
                result
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    pb.finish_and_clear();

    let mut index = ReferenceIndex::default();
    for result in wiki_results {
        if let (path, Some(id)) = result? {
            index.wiki.insert(path, id);
        }
    }
    for result in news_results {
        let (url, id) = result?;
        index.news.insert(url, id);
    }

    info!(
        wiki = index.wiki_resolved(),
        news = index.news_resolved(),
        "References resolved"
    );
    Ok(index)
}
