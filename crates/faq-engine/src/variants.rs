//! Paraphrase expansion for newly taught questions

use std::collections::HashSet;
use std::sync::Arc;

use crate::providers::ParaphraseProvider;

/// Widens future recall by paraphrasing a taught question.
///
/// Best-effort by design: a failing paraphrase backend yields an empty
/// list and the caller keeps the original question as the sole variant,
/// so a learning event is never lost to a paraphrase failure.
pub struct VariantGenerator {
    provider: Arc<dyn ParaphraseProvider>,
}

impl VariantGenerator {
    /// Create a generator over the given paraphrase provider
    pub fn new(provider: Arc<dyn ParaphraseProvider>) -> Self {
        Self { provider }
    }

    /// Produce up to `count` paraphrases of `question`, generation order.
    pub async fn expand(&self, question: &str, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }

        let candidates = match self.provider.paraphrase(question, count).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    "Paraphrase provider {} failed, keeping original question only: {}",
                    self.provider.name(),
                    e
                );
                return Vec::new();
            }
        };

        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .take(count)
            .collect();

        // Token-overlap heuristic against degenerate paraphrases; if it
        // rejects every candidate, keep the unfiltered list rather than
        // losing all generated variants.
        let kept: Vec<String> = candidates
            .iter()
            .filter(|c| shares_token(question, c))
            .cloned()
            .collect();

        if kept.is_empty() {
            if !candidates.is_empty() {
                tracing::debug!("Overlap filter rejected every paraphrase, keeping all");
            }
            candidates
        } else {
            kept
        }
    }
}

/// True when the candidate shares at least one lowercase whitespace token
/// with the source question.
fn shares_token(question: &str, candidate: &str) -> bool {
    let source: HashSet<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    candidate
        .to_lowercase()
        .split_whitespace()
        .any(|token| source.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::{Error, Result};

    struct FixedParaphraser(Vec<&'static str>);

    #[async_trait]
    impl ParaphraseProvider for FixedParaphraser {
        async fn paraphrase(&self, _text: &str, count: usize) -> Result<Vec<String>> {
            Ok(self.0.iter().take(count).map(|s| s.to_string()).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingParaphraser;

    #[async_trait]
    impl ParaphraseProvider for FailingParaphraser {
        async fn paraphrase(&self, _text: &str, _count: usize) -> Result<Vec<String>> {
            Err(Error::provider("paraphrase backend down"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn expands_and_keeps_overlapping_candidates() {
        let generator = Arc::new(FixedParaphraser(vec![
            "comment dire bonjour",
            "bonjour tout le monde",
        ]));
        let out = VariantGenerator::new(generator)
            .expand("bonjour", 5)
            .await;
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn filters_degenerate_paraphrases() {
        let generator = Arc::new(FixedParaphraser(vec![
            "comment dire bonjour",
            "totally unrelated text",
        ]));
        let out = VariantGenerator::new(generator)
            .expand("bonjour", 5)
            .await;
        assert_eq!(out, vec!["comment dire bonjour".to_string()]);
    }

    #[tokio::test]
    async fn all_degenerate_falls_back_to_unfiltered() {
        let generator = Arc::new(FixedParaphraser(vec!["alpha beta", "gamma delta"]));
        let out = VariantGenerator::new(generator)
            .expand("bonjour", 5)
            .await;
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_list() {
        let out = VariantGenerator::new(Arc::new(FailingParaphraser))
            .expand("bonjour", 5)
            .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn count_zero_skips_the_provider() {
        let out = VariantGenerator::new(Arc::new(FailingParaphraser))
            .expand("bonjour", 0)
            .await;
        assert!(out.is_empty());
    }
}
