//! In-memory semantic index over question variants

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::types::{KnowledgeRecord, MatchResult};

/// Default similarity gate between a local answer and the fallback cascade.
/// A match is confident iff its score is strictly above the threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// One embedded question variant
#[derive(Debug, Clone)]
struct IndexEntry {
    variant: String,
    vector: Vec<f32>,
    answer: String,
}

/// Derived cache mapping every known question variant to its embedding
/// vector and its answer.
///
/// The knowledge store stays the single source of truth; the index is
/// rebuildable from it at any time by re-embedding every variant. Readers
/// and the single writer are serialized through a read/write lock, so a
/// concurrent `match_query` sees either the pre-extend or the post-extend
/// state, never a torn append.
pub struct SemanticIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<IndexEntry>>,
}

impl SemanticIndex {
    /// Embed every variant of every record into a fresh index.
    ///
    /// An empty record set yields a valid empty index, not an error.
    pub async fn build(
        records: &[KnowledgeRecord],
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let index = Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        };
        index.rebuild(records).await?;
        Ok(index)
    }

    /// Re-derive the whole index from `records`, replacing the current
    /// entries in one swap. Embedding happens outside the lock.
    pub async fn rebuild(&self, records: &[KnowledgeRecord]) -> Result<()> {
        let mut variants = Vec::new();
        let mut answers = Vec::new();
        for record in records {
            for question in &record.questions {
                variants.push(question.clone());
                answers.push(record.answer.clone());
            }
        }

        let vectors = self.embedder.embed_batch(&variants).await?;
        let entries: Vec<IndexEntry> = variants
            .into_iter()
            .zip(vectors)
            .zip(answers)
            .map(|((variant, vector), answer)| IndexEntry {
                variant,
                vector,
                answer,
            })
            .collect();

        let count = entries.len();
        *self.entries.write() = entries;
        tracing::info!("Semantic index built with {} entries", count);
        Ok(())
    }

    /// Embed the query and return the single best-scoring entry.
    ///
    /// Equal maximum scores keep the first entry in insertion order.
    /// Returns `None` only when the index holds zero entries. The read
    /// lock is taken exactly once, so the emptiness check and the scan
    /// see the same snapshot of the entries.
    pub async fn match_query(&self, query: &str) -> Result<Option<MatchResult>> {
        let query_vector = self.embedder.embed(query).await?;

        let entries = self.entries.read();
        if entries.is_empty() {
            return Ok(None);
        }
        let mut best: Option<MatchResult> = None;
        for (i, entry) in entries.iter().enumerate() {
            let score = cosine_similarity(&query_vector, &entry.vector).clamp(0.0, 1.0);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MatchResult {
                    answer: entry.answer.clone(),
                    score,
                    variant_index: i,
                });
            }
        }

        if let Some(ref m) = best {
            tracing::debug!(
                "Best match: \"{}\" (score {:.3})",
                entries[m.variant_index].variant,
                m.score
            );
        }
        Ok(best)
    }

    /// Embed `variants` and append them under the write lock.
    ///
    /// Previously computed vectors are never recomputed; embedding is
    /// deterministic and context-free per string, so appended entries
    /// cannot invalidate older ones.
    pub async fn extend(&self, variants: &[String], answer: &str) -> Result<()> {
        if variants.is_empty() {
            return Ok(());
        }

        let vectors = self.embedder.embed_batch(variants).await?;

        let mut entries = self.entries.write();
        for (variant, vector) in variants.iter().zip(vectors) {
            entries.push(IndexEntry {
                variant: variant.clone(),
                vector,
                answer: answer.to_string(),
            });
        }
        tracing::debug!(
            "Index extended by {} entries ({} total)",
            variants.len(),
            entries.len()
        );
        Ok(())
    }

    /// Number of indexed variants
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no variant is indexed
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Cosine similarity in [-1, 1]; zero-norm or mismatched vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::Error;

    /// Bag-of-letters embedder: identical strings embed identically, so a
    /// verbatim query self-matches with cosine 1.0.
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; 26];
            for c in text.to_lowercase().chars() {
                if c.is_ascii_lowercase() {
                    v[(c as u8 - b'a') as usize] += 1.0;
                }
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            26
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Embedder that always fails, for backend-down paths
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("backend unreachable"))
        }

        fn dimensions(&self) -> usize {
            0
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn record(questions: &[&str], answer: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            questions: questions.iter().map(|q| q.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn cosine_basics() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        // zero norm and dimension mismatch are non-matches
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn empty_index_matches_nothing() {
        let index = SemanticIndex::build(&[], Arc::new(StubEmbedder)).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(index.match_query("bonjour").await.unwrap(), None);
    }

    #[tokio::test]
    async fn verbatim_query_self_matches() {
        let records = vec![record(&["bonjour", "salut toi"], "salut")];
        let index = SemanticIndex::build(&records, Arc::new(StubEmbedder)).await.unwrap();
        assert_eq!(index.len(), 2);

        let m = index.match_query("bonjour").await.unwrap().unwrap();
        assert_eq!(m.answer, "salut");
        assert!(m.score >= DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(m.variant_index, 0);
    }

    #[tokio::test]
    async fn tie_break_keeps_first_in_insertion_order() {
        let records = vec![
            record(&["bonjour"], "premier"),
            record(&["bonjour"], "second"),
        ];
        let index = SemanticIndex::build(&records, Arc::new(StubEmbedder)).await.unwrap();

        let m = index.match_query("bonjour").await.unwrap().unwrap();
        assert_eq!(m.answer, "premier");
        assert_eq!(m.variant_index, 0);
    }

    #[tokio::test]
    async fn extend_appends_without_recomputing() {
        let index = SemanticIndex::build(&[], Arc::new(StubEmbedder)).await.unwrap();
        index
            .extend(&["bonjour".to_string(), "salut".to_string()], "salut")
            .await
            .unwrap();
        assert_eq!(index.len(), 2);

        index.extend(&["hello".to_string()], "hi").await.unwrap();
        assert_eq!(index.len(), 3);

        let m = index.match_query("hello").await.unwrap().unwrap();
        assert_eq!(m.answer, "hi");
    }

    #[tokio::test]
    async fn rebuild_matches_extend_entry_count() {
        let records = vec![
            record(&["bonjour", "salut"], "salut"),
            record(&["quelle heure est-il"], "midi"),
        ];
        let index = SemanticIndex::build(&records, Arc::new(StubEmbedder)).await.unwrap();
        let extended = index.len();

        index.rebuild(&records).await.unwrap();
        assert_eq!(index.len(), extended);
    }

    #[tokio::test]
    async fn broken_backend_fails_build_but_empty_input_is_fine() {
        let records = vec![record(&["bonjour"], "salut")];
        let result = SemanticIndex::build(&records, Arc::new(BrokenEmbedder)).await;
        assert!(matches!(result, Err(Error::Embedding(_))));

        // an empty record set embeds nothing and yields a valid empty index;
        // a query still embeds first, so the dead backend fails the request
        let index = SemanticIndex::build(&[], Arc::new(BrokenEmbedder)).await.unwrap();
        assert!(index.is_empty());
        assert!(matches!(
            index.match_query("bonjour").await,
            Err(Error::Embedding(_))
        ));
    }
}
