//! Ollama-backed embedding and paraphrase providers with retry logic

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ModelConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::paraphrase::ParaphraseProvider;

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: ModelConfig,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(config: &ModelConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_retries: config.max_retries,
            config: config.clone(),
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::embedding("Unknown error")))
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding using Ollama with retry
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let text = text.to_string();
        let model = self.config.embed_model.clone();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let text = text.clone();
            let model = model.clone();
            let client = client.clone();

            async move {
                let request = EmbedRequest {
                    model,
                    prompt: text,
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::embedding(format!(
                        "Embedding failed: HTTP {}",
                        response.status()
                    )));
                }

                let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

                if embed_response.embedding.is_empty() {
                    return Err(Error::embedding("Backend returned an empty embedding"));
                }

                Ok(embed_response.embedding)
            }
        })
        .await
    }

    /// Ask the generation model for up to `count` paraphrases of `text`.
    ///
    /// Single attempt, no retry: a failed paraphrase call is absorbed by
    /// the variant generator and learning proceeds with the original
    /// question only.
    pub async fn paraphrase(&self, text: &str, count: usize) -> Result<Vec<String>> {
        let url = format!("{}/api/generate", self.config.base_url);
        let prompt = format!(
            "Rewrite the following question in {} different ways. \
             Keep the meaning identical and the language unchanged. \
             Output one rewording per line, with no numbering and no commentary.\n\n\
             Question: {}",
            count, text
        );

        let request = GenerateRequest {
            model: self.config.paraphrase_model.clone(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider(format!("Paraphrase request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::provider(format!(
                "Paraphrase failed: HTTP {}",
                response.status()
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("Failed to parse paraphrase response: {}", e)))?;

        Ok(parse_paraphrase_lines(&generate_response.response, count))
    }
}

/// Split model output into candidate paraphrases, one per non-empty line,
/// stripping list markers the model tends to add anyway.
fn parse_paraphrase_lines(output: &str, count: usize) -> Vec<String> {
    output
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*')
                })
                .trim()
        })
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            client: Arc::new(OllamaClient::new(config)),
            dimensions: config.dimensions,
        }
    }

    /// Create from an existing shared client
    pub fn from_client(client: Arc<OllamaClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama paraphrase provider
pub struct OllamaParaphraser {
    client: Arc<OllamaClient>,
}

impl OllamaParaphraser {
    /// Create a new Ollama paraphraser
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            client: Arc::new(OllamaClient::new(config)),
        }
    }

    /// Create from an existing shared client
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParaphraseProvider for OllamaParaphraser {
    async fn paraphrase(&self, text: &str, count: usize) -> Result<Vec<String>> {
        self.client.paraphrase(text, count).await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
