// HTML page readers for fetched articles.
//
// Pure functions over page markup, kept apart from the HTTP client so they
// can be tested on fixtures.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// Readable content of a same-corpus article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleContent {
    pub text: String,
    pub categories: Vec<String>,
}

/// Readable content of an external news page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsContent {
    pub title: String,
    pub site_name: String,
    pub text: String,
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {css:?}: {e}"))
}

fn paragraphs(doc: &Html, sel: &Selector) -> Vec<String> {
    doc.select(sel)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Body paragraphs and the normal (non-hidden) category list.
pub fn parse_article(html: &str) -> Result<ArticleContent> {
    let doc = Html::parse_document(html);
    let body = selector("div.mw-parser-output p")?;
    let categories = selector("div#mw-normal-catlinks > ul > li")?;

    Ok(ArticleContent {
        text: paragraphs(&doc, &body).join("\n"),
        categories: doc
            .select(&categories)
            .map(|li| li.text().collect::<String>().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
    })
}

/// Title, site name and paragraph text of a news page.
///
/// Open Graph metadata is preferred when present. Without `og:site_name` the
/// host of `url` stands in. Paragraphs inside `<article>` are used if there
/// are any, otherwise every paragraph on the page.
pub fn parse_news(html: &str, url: &str) -> Result<NewsContent> {
    let doc = Html::parse_document(html);

    let meta = |property: &str| -> Result<Option<String>> {
        let sel = selector(&format!("meta[property=\"{property}\"]"))?;
        Ok(doc
            .select(&sel)
            .filter_map(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty()))
    };

    let title = match meta("og:title")? {
        Some(t) => t,
        None => {
            let sel = selector("title")?;
            doc.select(&sel)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default()
        }
    };

    let site_name = match meta("og:site_name")? {
        Some(s) => s,
        None => reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default(),
    };

    let mut text = paragraphs(&doc, &selector("article p")?);
    if text.is_empty() {
        text = paragraphs(&doc, &selector("p")?);
    }

    Ok(NewsContent {
        title,
        site_name,
        text: text.join("\n\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><body>
<div class="mw-parser-output">
  <p>The <b>Tigray War</b> was an armed conflict.</p>
  <p>   </p>
  <p>It began in November 2020.</p>
</div>
<div id="catlinks"><div id="mw-normal-catlinks"><a>Categories</a>:
  <ul><li><a href="/wiki/Category:Wars">Wars</a></li><li><a>2020 conflicts</a></li></ul>
</div>
<div id="mw-hidden-catlinks"><ul><li>Hidden</li></ul></div></div>
</body></html>"#;

    #[test]
    fn test_parse_article() {
        let content = parse_article(ARTICLE).unwrap();
        assert_eq!(
            content.text,
            "The Tigray War was an armed conflict.\nIt began in November 2020."
        );
        assert_eq!(content.categories, vec!["Wars", "2020 conflicts"]);
    }

    #[test]
    fn test_parse_news_prefers_open_graph() {
        let html = r#"<html><head>
<title>Ignored | Site</title>
<meta property="og:title" content="Fighting resumes">
<meta property="og:site_name" content="Example News">
</head><body><nav><p>Menu</p></nav>
<article><p>First paragraph.</p><p>Second paragraph.</p></article></body></html>"#;
        let content = parse_news(html, "https://news.example/a").unwrap();
        assert_eq!(content.title, "Fighting resumes");
        assert_eq!(content.site_name, "Example News");
        assert_eq!(content.text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_parse_news_fallbacks() {
        let html = "<html><head><title> Plain title </title></head>\
                    <body><p>Only text.</p></body></html>";
        let content = parse_news(html, "https://www.example.org/story/1").unwrap();
        assert_eq!(content.title, "Plain title");
        assert_eq!(content.site_name, "www.example.org");
        assert_eq!(content.text, "Only text.");
    }
}
