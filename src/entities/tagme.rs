// TagMe annotation service client.
//
// TagMe links spans of English text to encyclopedia entries. Each annotation
// carries a `link_probability`: how often that span is a link when it
// appears in the corpus. That is what we use as confidence.
//
// API docs: https://sobigdata.d4science.org/web/tagme/tagme-help

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::{EntityExtractor, SalientTerm};

pub const DEFAULT_TAGME_URL: &str = "https://tagme.d4science.org/tagme/tag";

#[derive(Debug, Clone, Deserialize)]
pub struct TagMeResponse {
    #[serde(default)]
    pub annotations: Vec<TagMeAnnotation>,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagMeAnnotation {
    pub spot: String,
    pub link_probability: f64,
    #[serde(default)]
    pub rho: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

impl From<TagMeAnnotation> for SalientTerm {
    fn from(a: TagMeAnnotation) -> Self {
        SalientTerm {
            spot: a.spot,
            confidence: a.link_probability,
        }
    }
}

pub struct TagMeClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl TagMeClient {
    pub fn new(url: &str, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("chronicle/0.1 (current-events topic tracker)")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            token,
        })
    }
}

#[async_trait]
impl EntityExtractor for TagMeClient {
    fn name(&self) -> &'static str {
        "tagme"
    }

    async fn extract(&self, text: &str) -> Result<Vec<SalientTerm>> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("text", text), ("gcube-token", self.token.as_str())])
            .send()
            .await
            .context("TagMe request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("TagMe returned {}: {}", status, body);
        }

        let parsed: TagMeResponse = response
            .json()
            .await
            .context("Failed to parse TagMe response")?;

        debug!(annotations = parsed.annotations.len(), "TagMe annotated text");
        Ok(parsed.annotations.into_iter().map(SalientTerm::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_become_salient_terms() {
        let raw = r#"{
            "lang": "en",
            "annotations": [
                {"spot": "Tigray", "link_probability": 0.42, "rho": 0.3, "title": "Tigray Region", "start": 0, "end": 6},
                {"spot": "airstrike", "link_probability": 0.05}
            ]
        }"#;
        let parsed: TagMeResponse = serde_json::from_str(raw).unwrap();
        let terms: Vec<SalientTerm> = parsed.annotations.into_iter().map(SalientTerm::from).collect();

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].spot, "Tigray");
        assert_eq!(terms[0].confidence, 0.42);
        assert_eq!(terms[1].confidence, 0.05);
    }

    #[test]
    fn test_missing_annotations_is_empty() {
        let parsed: TagMeResponse = serde_json::from_str(r#"{"lang": "en"}"#).unwrap();
        assert!(parsed.annotations.is_empty());
    }
}
