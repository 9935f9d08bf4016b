//! Mood analysis orchestration.
//!
//! Two modes share one shape of output:
//!
//! * **plain**: classifiers and generator only, no history;
//! * **augmented**: additionally embeds the entry, retrieves the user's most
//!   similar prior entries and mines their recent patterns.
//!
//! Retrieval is best-effort. When the user's embeddings cannot be read, or
//! the user has no analysed history yet, the call silently degrades to plain
//! mode. The entry's embedding is stored in both cases.

use std::sync::Arc;

use chrono::Utc;
use moodlens_core::AppConfig;

use crate::classifier::{classify_emotions, classify_sentiment};
use crate::embeddings::{EmbeddingProvider, EmbeddingSource};
use crate::error::AnalysisError;
use crate::inference::InferenceService;
use crate::patterns::{mine_patterns, PatternSummary};
use crate::store::EntryStore;
use crate::suggestion::suggest;
use crate::summary::{augmented_summary, plain_summary};
use crate::text::fingerprint;
use crate::types::{AnalysisResult, SimilarityCandidate};
use crate::vector_store::{rank_similar, VectorStore};

/// Tunables for the augmented pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub embedding_dim: usize,
    /// Top-K for similarity retrieval.
    pub similar_entries_limit: usize,
    /// Number of recent analyses fed to the pattern miner.
    pub pattern_history_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            similar_entries_limit: 3,
            pattern_history_limit: 50,
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            embedding_dim: config.embedding_dim,
            similar_entries_limit: config.similar_entries_limit,
            pattern_history_limit: config.pattern_history_limit,
        }
    }
}

/// History fetched for one augmented call.
struct RetrievalContext {
    candidates: Vec<SimilarityCandidate>,
    patterns: PatternSummary,
}

/// Runs the analysis pipeline against injected inference and storage.
#[derive(Clone)]
pub struct MoodAnalyzer {
    inference: Arc<dyn InferenceService>,
    store: Arc<dyn EntryStore>,
    embeddings: EmbeddingProvider,
    vectors: VectorStore,
    settings: AnalysisSettings,
}

impl MoodAnalyzer {
    #[must_use]
    pub fn new(
        inference: Arc<dyn InferenceService>,
        store: Arc<dyn EntryStore>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            embeddings: EmbeddingProvider::new(Arc::clone(&inference), settings.embedding_dim),
            vectors: VectorStore::new(Arc::clone(&store)),
            inference,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> AnalysisSettings {
        self.settings
    }

    /// Plain-mode analysis of `text`.
    pub async fn analyze_plain(&self, text: &str) -> AnalysisResult {
        analyze_plain(self.inference.as_ref(), text).await
    }

    /// Retrieval-augmented analysis of one entry's text.
    ///
    /// Never fails: classifier, embedding and generation failures each fall
    /// back on their own, and a failed retrieval degrades the call to plain
    /// mode.
    pub async fn analyze_augmented(&self, user_id: i64, entry_id: i64, text: &str) -> AnalysisResult {
        let inference = self.inference.as_ref();
        let (sentiment, emotions, context) = tokio::join!(
            classify_sentiment(inference, text),
            classify_emotions(inference, text),
            self.retrieval_context(user_id, entry_id, text),
        );

        let (summary, suggestion) = match context {
            Some(context) => (
                augmented_summary(
                    &sentiment.label,
                    &emotions,
                    &context.candidates,
                    &context.patterns,
                ),
                suggest(inference, text, &context.candidates, &context.patterns).await,
            ),
            None => (
                plain_summary(&sentiment.label, &emotions),
                suggest(inference, text, &[], &PatternSummary::default()).await,
            ),
        };

        AnalysisResult {
            overall_sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            emotions,
            summary,
            suggestion,
            analyzed_at: Utc::now(),
        }
    }

    /// Analyse a stored entry and persist the result.
    ///
    /// Returns `Ok(None)` without writing when the entry does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Store`] if the entry cannot be read or the
    /// result cannot be saved.
    pub async fn analyze_entry(&self, entry_id: i64) -> Result<Option<AnalysisResult>, AnalysisError> {
        let Some(entry) = self.store.get_entry(entry_id).await? else {
            tracing::debug!(entry_id, "entry not found, skipping analysis");
            return Ok(None);
        };

        let result = self
            .analyze_augmented(entry.user_id, entry.id, &entry.analysis_text())
            .await;
        self.store.save_analysis(entry.id, &result).await?;

        tracing::info!(
            entry_id,
            user_id = entry.user_id,
            sentiment = %result.overall_sentiment,
            "entry analysed"
        );
        Ok(Some(result))
    }

    /// Mine the user's recent analyses.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Store`] if the history cannot be read.
    pub async fn user_patterns(&self, user_id: i64) -> Result<PatternSummary, AnalysisError> {
        let history = self
            .store
            .recent_analyses(user_id, self.settings.pattern_history_limit)
            .await?;
        Ok(mine_patterns(&history))
    }

    async fn retrieval_context(
        &self,
        user_id: i64,
        entry_id: i64,
        text: &str,
    ) -> Option<RetrievalContext> {
        let content_fingerprint = fingerprint(text);
        let stored = self.vectors.query(user_id).await;
        let reusable = stored.as_ref().ok().and_then(|rows| {
            rows.iter()
                .find(|row| {
                    row.entry_id == entry_id
                        && row.content_fingerprint == content_fingerprint
                        && row.vector.len() == self.embeddings.dim()
                })
                .map(|row| row.vector.clone())
        });

        // The entry's own embedding is written even when the lookup failed.
        let vector = if let Some(vector) = reusable {
            tracing::debug!(entry_id, "text unchanged, reusing stored embedding");
            vector
        } else {
            let embedding = self.embeddings.embed(text).await;
            if embedding.source == EmbeddingSource::Fallback {
                tracing::debug!(entry_id, "stored fallback embedding");
            }
            if let Err(e) = self
                .vectors
                .upsert(entry_id, user_id, embedding.vector.clone(), content_fingerprint)
                .await
            {
                tracing::warn!(entry_id, error = %e, "embedding upsert failed");
            }
            embedding.vector
        };

        let stored = match stored {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(user_id, entry_id, error = %e, "embedding lookup failed, using plain mode");
                return None;
            }
        };

        let candidates = rank_similar(
            &vector,
            stored,
            entry_id,
            self.settings.similar_entries_limit,
        );

        let patterns = match self
            .store
            .recent_analyses(user_id, self.settings.pattern_history_limit)
            .await
        {
            Ok(history) if history.is_empty() => {
                tracing::debug!(user_id, entry_id, "no analysed history yet, using plain mode");
                return None;
            }
            Ok(history) => mine_patterns(&history),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "pattern history lookup failed");
                PatternSummary::default()
            }
        };

        tracing::debug!(
            entry_id,
            candidates = candidates.len(),
            common_emotions = patterns.common_emotions.len(),
            "retrieval context ready"
        );
        Some(RetrievalContext {
            candidates,
            patterns,
        })
    }
}

/// Classify `text` and build a suggestion without any user history.
pub async fn analyze_plain(inference: &dyn InferenceService, text: &str) -> AnalysisResult {
    let (sentiment, emotions) = tokio::join!(
        classify_sentiment(inference, text),
        classify_emotions(inference, text),
    );

    let summary = plain_summary(&sentiment.label, &emotions);
    let suggestion = suggest(inference, text, &[], &PatternSummary::default()).await;

    AnalysisResult {
        overall_sentiment: sentiment.label,
        sentiment_score: sentiment.score,
        emotions,
        summary,
        suggestion,
        analyzed_at: Utc::now(),
    }
}
