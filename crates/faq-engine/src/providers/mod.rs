//! Provider abstractions for the external model services
//!
//! The engine talks to its embedding and paraphrasing backends through
//! trait objects, so tests and alternative backends can swap them out.

pub mod embedding;
pub mod ollama;
pub mod paraphrase;

pub use embedding::EmbeddingProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaParaphraser};
pub use paraphrase::ParaphraseProvider;
