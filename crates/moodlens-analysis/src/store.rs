//! Persistence boundary for entries, analyses and embeddings.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{AnalysisResult, EmbeddingRecord, JournalEntry, StoredEmbedding};

/// Entry persistence as seen by the analysis pipeline.
///
/// Implementations must treat writes for an entry that no longer exists as
/// silent no-ops: a background analysis may finish after its entry was
/// deleted.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get_entry(&self, entry_id: i64) -> Result<Option<JournalEntry>, StoreError>;

    /// Replace the entry's analysis wholesale in one atomic write.
    async fn save_analysis(
        &self,
        entry_id: i64,
        result: &AnalysisResult,
    ) -> Result<(), StoreError>;

    async fn delete_analysis(&self, entry_id: i64) -> Result<(), StoreError>;

    /// Insert the record, or overwrite vector and fingerprint of the existing
    /// row for the same `entry_id`.
    async fn upsert_embedding(&self, record: &EmbeddingRecord) -> Result<(), StoreError>;

    /// All embeddings of one user, newest entry first.
    async fn query_embeddings(&self, user_id: i64) -> Result<Vec<StoredEmbedding>, StoreError>;

    /// The user's most recent analyses, newest first.
    async fn recent_analyses(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<AnalysisResult>, StoreError>;
}
