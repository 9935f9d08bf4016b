//! Retrieval-augmented mood analysis for journal entries.
//!
//! Classifies sentiment and emotions through an external inference service,
//! embeds entries (with a deterministic local fallback), retrieves a user's
//! most similar prior entries, mines their recent emotional patterns and
//! produces a summary plus a wellness suggestion. Persistence is injected
//! through [`EntryStore`].

pub mod classifier;
pub mod embeddings;
pub mod error;
pub mod inference;
pub mod patterns;
pub mod pipeline;
pub mod queue;
pub mod store;
pub mod suggestion;
pub mod summary;
pub mod text;
pub mod types;
pub mod vector_store;

pub use error::{AnalysisError, StoreError};
pub use inference::{ClassifierTask, HfInferenceClient, InferenceService, ModelSet};
pub use patterns::PatternSummary;
pub use pipeline::{analyze_plain, AnalysisSettings, MoodAnalyzer};
pub use queue::{AnalysisQueue, QueueMetrics, QueueSettings, TaskOutcome};
pub use store::EntryStore;
pub use types::{
    AnalysisResult, EmbeddingRecord, JournalEntry, LabelScore, Sentiment, SentimentLabel,
    SimilarityCandidate, StoredEmbedding,
};
