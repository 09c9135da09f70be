//! faq-engine: self-learning FAQ engine with semantic matching and web fallback
//!
//! The engine resolves a natural-language question against embedded variants
//! of every question it knows. When the best cosine score is not confident it
//! cascades through external knowledge providers (Wikipedia, then DuckDuckGo)
//! and offers the result for learning; when those also find nothing it asks
//! the collaborator to teach the answer. Every learning event paraphrases the
//! question to widen future recall, appends to the durable knowledge base,
//! extends the in-memory index, and lands in an independent audit log.
//!
//! The presentation layer (chat UI, CLI prompt loop) is an external
//! collaborator driving [`FaqEngine::submit_question`],
//! [`FaqEngine::accept_offer`] / [`FaqEngine::reject_offer`] and
//! [`FaqEngine::teach`].

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod index;
pub mod providers;
pub mod store;
pub mod types;
pub mod variants;

pub use config::EngineConfig;
pub use engine::FaqEngine;
pub use error::{Error, Result};
pub use index::{SemanticIndex, DEFAULT_CONFIDENCE_THRESHOLD};
pub use store::KnowledgeStore;
pub use types::{AuditEntry, FallbackAnswer, KnowledgeRecord, MatchResult, Reply};
