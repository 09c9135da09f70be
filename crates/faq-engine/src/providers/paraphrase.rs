//! Paraphrase provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating alternative phrasings of a question
#[async_trait]
pub trait ParaphraseProvider: Send + Sync {
    /// Request up to `count` paraphrases of `text`, in generation order.
    /// Fewer than `count` results is not an error.
    async fn paraphrase(&self, text: &str, count: usize) -> Result<Vec<String>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
