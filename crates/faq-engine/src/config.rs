//! Configuration for the FAQ engine

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::DEFAULT_CONFIDENCE_THRESHOLD;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,
    /// Matching and learning behavior
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Embedding / paraphrase model backend
    #[serde(default)]
    pub model: ModelConfig,
    /// Fallback provider endpoints and timeout
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file. Missing sections and fields
    /// fall back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        toml::from_str(&data)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))
    }
}

/// Storage paths for the knowledge base and the audit log.
///
/// The two files are deliberately independent: a corrupted or rolled-back
/// knowledge base never loses the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Knowledge base file (JSON array of records)
    pub knowledge_path: PathBuf,
    /// Audit log file (JSON array of learning events)
    pub audit_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_data_dir();
        Self {
            knowledge_path: dir.join("botbase.json"),
            audit_path: dir.join("logs_apprentissage.json"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("faq-engine")
}

/// Matching and learning behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// A match is confident iff its score is strictly above this.
    /// Tunable default, not validated against a labeled dataset.
    pub confidence_threshold: f32,
    /// How many paraphrases to request per learning event
    pub paraphrase_count: usize,
    /// Whether to try the web fallback cascade before asking to be taught
    pub fallback_enabled: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            paraphrase_count: 5,
            fallback_enabled: true,
        }
    }
}

/// Ollama backend configuration for embeddings and paraphrasing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Paraphrase (generation) model name
    pub paraphrase_model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Temperature for paraphrase generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed embedding requests
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            paraphrase_model: "phi3".to_string(),
            dimensions: 768,
            temperature: 0.7, // higher than factual generation, paraphrases should vary
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Fallback provider endpoints and per-provider timeout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Timeout applied to each provider call in seconds
    pub timeout_secs: u64,
    /// Wikipedia search API endpoint
    pub wikipedia_api_url: String,
    /// Wikipedia REST page-summary endpoint (title is appended)
    pub wikipedia_summary_url: String,
    /// DuckDuckGo instant-answer endpoint
    pub duckduckgo_url: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            wikipedia_api_url: "https://fr.wikipedia.org/w/api.php".to_string(),
            wikipedia_summary_url: "https://fr.wikipedia.org/api/rest_v1/page/summary".to_string(),
            duckduckgo_url: "https://api.duckduckgo.com/".to_string(),
        }
    }
}
