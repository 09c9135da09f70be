//! DuckDuckGo instant-answer provider
//!
//! Prefers the `AbstractText` field and falls back to the literal `Answer`
//! field, matching the instant-answer API shape.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::FallbackConfig;
use crate::error::{Error, Result};

use super::AnswerProvider;

/// Web instant-answer provider
pub struct DuckDuckGoProvider {
    client: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "Answer")]
    answer: String,
}

impl InstantAnswer {
    fn best(self) -> Option<String> {
        if !self.abstract_text.trim().is_empty() {
            Some(self.abstract_text)
        } else if !self.answer.trim().is_empty() {
            Some(self.answer)
        } else {
            None
        }
    }
}

impl DuckDuckGoProvider {
    /// Create a provider from the fallback configuration
    pub fn new(config: &FallbackConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.duckduckgo_url.clone(),
        }
    }
}

#[async_trait]
impl AnswerProvider for DuckDuckGoProvider {
    async fn lookup(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let instant: InstantAnswer = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("malformed DuckDuckGo response: {}", e)))?;

        Ok(instant.best())
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}
