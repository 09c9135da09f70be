//! Learning coordinator: the session object tying everything together
//!
//! Flow per question: semantic index first; below the confidence threshold
//! the fallback cascade runs; when that also comes up empty the engine
//! asks the collaborator to teach the answer. Every accepted or taught
//! answer is paraphrase-expanded, persisted, indexed and audited.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::audit::AuditLog;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::fallback::{AnswerProvider, DuckDuckGoProvider, FallbackResolver, WikipediaProvider};
use crate::index::SemanticIndex;
use crate::providers::{
    EmbeddingProvider, OllamaClient, OllamaEmbedder, OllamaParaphraser, ParaphraseProvider,
};
use crate::store::KnowledgeStore;
use crate::types::{KnowledgeRecord, Reply};
use crate::variants::VariantGenerator;

/// Source label recorded for directly taught answers
const SOURCE_USER: &str = "user";

/// The human decision the session is waiting for, if any
#[derive(Debug, Clone)]
enum Pending {
    /// A fallback answer was offered; awaiting accept/reject
    Offer {
        question: String,
        text: String,
        source: String,
    },
    /// Nothing was found anywhere; awaiting a taught answer
    Teach { question: String },
}

#[derive(Default)]
struct Session {
    pending: Option<Pending>,
    last_question: Option<String>,
}

/// One interactive session over the knowledge base.
///
/// Constructed once at session start: loads the store, builds the index,
/// wires the providers. There is no global state; resetting a session
/// means dropping the engine and building a new one.
pub struct FaqEngine {
    config: EngineConfig,
    store: KnowledgeStore,
    index: SemanticIndex,
    resolver: FallbackResolver,
    generator: VariantGenerator,
    audit: AuditLog,
    session: Mutex<Session>,
}

impl FaqEngine {
    /// Build a session with explicit providers. Fails with
    /// [`Error::Embedding`] when the embedding backend does not pass its
    /// health check, so a dead backend surfaces at startup instead of on
    /// the first question.
    pub async fn new(
        config: EngineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        paraphraser: Arc<dyn ParaphraseProvider>,
        providers: Vec<Arc<dyn AnswerProvider>>,
    ) -> Result<Self> {
        if !embedder.health_check().await.unwrap_or(false) {
            return Err(Error::embedding(format!(
                "embedding backend {} is unreachable",
                embedder.name()
            )));
        }

        let store = KnowledgeStore::open(&config.storage.knowledge_path)?;
        let index = SemanticIndex::build(&store.records(), embedder).await?;
        let resolver = FallbackResolver::new(
            providers,
            Duration::from_secs(config.fallback.timeout_secs),
        );
        let generator = VariantGenerator::new(paraphraser);
        let audit = AuditLog::new(&config.storage.audit_path);

        tracing::info!(
            "FAQ engine ready: {} records, {} indexed variants, fallback {}",
            store.len(),
            index.len(),
            if config.matching.fallback_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(Self {
            config,
            store,
            index,
            resolver,
            generator,
            audit,
            session: Mutex::new(Session::default()),
        })
    }

    /// Build a session backed by a local Ollama server and the default web
    /// fallback providers (Wikipedia, then DuckDuckGo).
    pub async fn with_ollama(config: EngineConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(&config.model));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::from_client(
            Arc::clone(&client),
            config.model.dimensions,
        ));
        let paraphraser: Arc<dyn ParaphraseProvider> =
            Arc::new(OllamaParaphraser::from_client(client));
        let providers: Vec<Arc<dyn AnswerProvider>> = vec![
            Arc::new(WikipediaProvider::new(&config.fallback)),
            Arc::new(DuckDuckGoProvider::new(&config.fallback)),
        ];
        Self::new(config, embedder, paraphraser, providers).await
    }

    /// Resolve a question: local index first, then the fallback cascade,
    /// then ask the collaborator to teach. Submitting a new question
    /// discards any decision left pending from the previous one.
    pub async fn submit_question(&self, text: &str) -> Result<Reply> {
        let question = text.trim().to_string();

        {
            let mut session = self.session.lock();
            session.last_question = Some(question.clone());
            session.pending = None;
        }

        if let Some(m) = self.index.match_query(&question).await? {
            if m.score > self.config.matching.confidence_threshold {
                tracing::info!("Confident local match (score {:.3})", m.score);
                return Ok(Reply::Answered {
                    answer: m.answer,
                    score: m.score,
                });
            }
            tracing::debug!(
                "Best local score {:.3} below threshold {:.2}",
                m.score,
                self.config.matching.confidence_threshold
            );
        }

        if self.config.matching.fallback_enabled {
            if let Some(found) = self.resolver.resolve(&question).await {
                let mut session = self.session.lock();
                session.pending = Some(Pending::Offer {
                    question,
                    text: found.text.clone(),
                    source: found.source.clone(),
                });
                return Ok(Reply::Offer {
                    text: found.text,
                    source: found.source,
                });
            }
        }

        self.session.lock().pending = Some(Pending::Teach { question });
        Ok(Reply::TeachRequest)
    }

    /// Accept the pending fallback answer and learn it, with the
    /// provider's label as the audit source.
    pub async fn accept_offer(&self) -> Result<()> {
        let taken = {
            let mut session = self.session.lock();
            match session.pending.take() {
                Some(Pending::Offer {
                    question,
                    text,
                    source,
                }) => Some((question, text, source)),
                other => {
                    session.pending = other;
                    None
                }
            }
        };

        match taken {
            Some((question, text, source)) => self.learn(&question, &text, &source).await,
            None => Err(Error::NoPendingOffer),
        }
    }

    /// Reject the pending fallback answer. Nothing is learned; the session
    /// already reported the text to the collaborator.
    pub fn reject_offer(&self) -> Result<()> {
        let mut session = self.session.lock();
        match session.pending.take() {
            Some(Pending::Offer { .. }) => Ok(()),
            other => {
                session.pending = other;
                Err(Error::NoPendingOffer)
            }
        }
    }

    /// Teach the answer to the question awaiting one. Also usable as an
    /// unsolicited correction: with no pending request it applies to the
    /// most recently submitted question.
    pub async fn teach(&self, answer: &str) -> Result<()> {
        let question = {
            let mut session = self.session.lock();
            match session.pending.take() {
                Some(Pending::Teach { question }) | Some(Pending::Offer { question, .. }) => {
                    question
                }
                None => session
                    .last_question
                    .clone()
                    .ok_or(Error::NoQuestionToTeach)?,
            }
        };

        self.learn(&question, answer, SOURCE_USER).await
    }

    /// Snapshot of every known record (answer + variants). Read-only.
    pub fn list_known_questions(&self) -> Vec<KnowledgeRecord> {
        self.store.records()
    }

    /// Number of indexed question variants
    pub fn known_variant_count(&self) -> usize {
        self.index.len()
    }

    /// Re-derive the semantic index from the store. The index is a derived
    /// cache; this repairs it after a partial learning failure.
    pub async fn rebuild_index(&self) -> Result<()> {
        self.index.rebuild(&self.store.records()).await
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The four-step learning sequence: expand, persist, index, audit.
    ///
    /// A failed durable write is remembered and surfaced only after the
    /// in-memory updates finish, so store and index stay consistent for
    /// the rest of the session. An index-extend failure is logged, not
    /// fatal: the index is rebuilt from the store on the next start.
    async fn learn(&self, question: &str, answer: &str, source: &str) -> Result<()> {
        let generated = self
            .generator
            .expand(question, self.config.matching.paraphrase_count)
            .await;

        let mut variants = Vec::with_capacity(generated.len() + 1);
        variants.push(question.to_string());
        variants.extend(generated);

        let mut deferred: Option<Error> = None;
        if let Err(e) = self.store.append(&variants, answer) {
            if e.is_persistence() {
                tracing::warn!("Knowledge base write failed, continuing in memory: {}", e);
                deferred = Some(e);
            } else {
                return Err(e);
            }
        }

        if let Err(e) = self.index.extend(&variants, answer).await {
            tracing::warn!(
                "Index extend failed, index will be rebuilt on next start: {}",
                e
            );
        }

        if let Err(e) = self.audit.record(variants, answer, source) {
            tracing::warn!("Audit log write failed: {}", e);
        }

        tracing::info!("Learned new answer (source: {})", source);
        match deferred {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
