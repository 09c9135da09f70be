//! Core data types shared across the engine

use chrono::Local;
use serde::{Deserialize, Serialize};

/// One answer together with every known phrasing of its question.
///
/// Records are append-only: updates add new records, nothing is mutated
/// in place or deleted. The persisted field name is `questions` to match
/// the on-disk knowledge base format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Question variants, original phrasing first
    pub questions: Vec<String>,
    /// The answer every variant resolves to
    pub answer: String,
}

/// Best-scoring index entry for a query
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Answer of the winning variant
    pub answer: String,
    /// Cosine similarity clamped to [0, 1]
    pub score: f32,
    /// Position of the winning variant in insertion order
    pub variant_index: usize,
}

/// Answer found by an external fallback provider
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackAnswer {
    /// The provider's answer text
    pub text: String,
    /// Provider label, e.g. "Wikipedia" or "DuckDuckGo"
    pub source: String,
}

/// One learning event in the audit journal.
///
/// Field names mirror the legacy log format (`question`, `reponse`) so
/// existing logs stay readable by the same tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Local timestamp, "YYYY-MM-DD HH:MM:SS"
    pub date: String,
    /// Every variant stored by the learning event
    pub question: Vec<String>,
    /// The learned answer
    #[serde(rename = "reponse")]
    pub response: String,
    /// "Wikipedia", "DuckDuckGo" or "user"
    pub source: String,
}

impl AuditEntry {
    /// Build an entry timestamped now
    pub fn now(question: Vec<String>, response: String, source: String) -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            question,
            response,
            source,
        }
    }
}

/// Outcome of [`crate::FaqEngine::submit_question`], rendered by the
/// collaborator (CLI, chat UI, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Confident local match; no store mutation happened
    Answered {
        /// The stored answer
        answer: String,
        /// Similarity score of the winning variant
        score: f32,
    },
    /// A fallback provider found a candidate answer. The engine now waits
    /// for `accept_offer` or `reject_offer`.
    Offer {
        /// Candidate answer text
        text: String,
        /// Provider label the answer came from
        source: String,
    },
    /// Nothing found locally or on the web. The engine now waits for
    /// `teach` with a human-supplied answer.
    TeachRequest,
}
