//! Wikipedia provider: full-text search, then page summary
//!
//! Two-step lookup matching the MediaWiki APIs: search the query, take the
//! top hit's title, then fetch that title's REST summary and return its
//! `extract` text.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::FallbackConfig;
use crate::error::{Error, Result};

use super::AnswerProvider;

/// Encyclopedia provider backed by the Wikipedia APIs
pub struct WikipediaProvider {
    client: Client,
    api_url: String,
    summary_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    extract: Option<String>,
}

impl WikipediaProvider {
    /// Create a provider from the fallback configuration
    pub fn new(config: &FallbackConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.wikipedia_api_url.clone(),
            summary_url: config.wikipedia_summary_url.clone(),
        }
    }

    async fn top_search_title(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("malformed Wikipedia search response: {}", e)))?;

        Ok(search.query.search.into_iter().next().map(|hit| hit.title))
    }

    async fn page_summary(&self, title: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.summary_url, title.replace(' ', "_"));
        let response = self.client.get(&url).send().await?.error_for_status()?;

        let summary: SummaryResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("malformed Wikipedia summary response: {}", e)))?;

        Ok(summary.extract.filter(|text| !text.trim().is_empty()))
    }
}

#[async_trait]
impl AnswerProvider for WikipediaProvider {
    async fn lookup(&self, query: &str) -> Result<Option<String>> {
        let Some(title) = self.top_search_title(query).await? else {
            return Ok(None);
        };
        tracing::debug!("Wikipedia top hit: {}", title);
        self.page_summary(&title).await
    }

    fn name(&self) -> &str {
        "Wikipedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_parses() {
        let json = r#"{"query": {"search": [{"title": "Paris", "pageid": 1}, {"title": "France"}]}}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.query.search[0].title, "Paris");
    }

    #[test]
    fn empty_search_hits_parse() {
        let json = r#"{"query": {"search": []}}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.query.search.is_empty());
    }

    #[test]
    fn summary_without_extract_parses_as_none() {
        let parsed: SummaryResponse = serde_json::from_str(r#"{"type": "standard"}"#).unwrap();
        assert!(parsed.extract.is_none());
    }
}
