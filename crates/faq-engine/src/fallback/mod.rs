//! Fallback cascade of external knowledge providers
//!
//! Tried only when the semantic index is not confident. Providers are
//! queried once each, in a fixed priority order; the first non-empty
//! answer wins.

pub mod duckduckgo;
pub mod wikipedia;

pub use duckduckgo::DuckDuckGoProvider;
pub use wikipedia::WikipediaProvider;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::Result;
use crate::types::FallbackAnswer;

/// One external knowledge source tried by the cascade
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Look up `query`. `Ok(None)` means the provider has nothing; errors
    /// are returned explicitly and discarded by the resolver's policy.
    async fn lookup(&self, query: &str) -> Result<Option<String>>;

    /// Label attached to answers from this provider
    fn name(&self) -> &str;
}

/// Ordered cascade over external providers, first success wins.
pub struct FallbackResolver {
    providers: Vec<Arc<dyn AnswerProvider>>,
    provider_timeout: Duration,
}

impl FallbackResolver {
    /// Create a resolver over `providers`, in priority order. Each call is
    /// bounded by `provider_timeout` so one stuck provider cannot block the
    /// cascade.
    pub fn new(providers: Vec<Arc<dyn AnswerProvider>>, provider_timeout: Duration) -> Self {
        Self {
            providers,
            provider_timeout,
        }
    }

    /// Try every provider once in priority order.
    ///
    /// Network failures, malformed responses, empty results and timeouts
    /// are all absorbed here and treated as "this provider found nothing".
    /// Returns `None` only after every provider has been tried.
    pub async fn resolve(&self, query: &str) -> Option<FallbackAnswer> {
        for provider in &self.providers {
            match timeout(self.provider_timeout, provider.lookup(query)).await {
                Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                    tracing::info!("Fallback answer from {}", provider.name());
                    return Some(FallbackAnswer {
                        text,
                        source: provider.name().to_string(),
                    });
                }
                Ok(Ok(_)) => {
                    tracing::debug!("{} found nothing", provider.name());
                }
                Ok(Err(e)) => {
                    tracing::debug!("{} failed: {}", provider.name(), e);
                }
                Err(_) => {
                    tracing::debug!(
                        "{} timed out after {:?}",
                        provider.name(),
                        self.provider_timeout
                    );
                }
            }
        }
        None
    }
}
