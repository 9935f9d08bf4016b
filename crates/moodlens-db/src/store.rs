//! Postgres implementation of the analysis pipeline's [`EntryStore`].

use async_trait::async_trait;
use moodlens_analysis::{
    AnalysisResult, EmbeddingRecord, EntryStore, JournalEntry, StoreError, StoredEmbedding,
};
use sqlx::PgPool;

use crate::{analyses, embeddings, entries};

#[derive(Debug, Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn get_entry(&self, entry_id: i64) -> Result<Option<JournalEntry>, StoreError> {
        let row = entries::get_entry(&self.pool, entry_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(JournalEntry::from))
    }

    async fn save_analysis(
        &self,
        entry_id: i64,
        result: &AnalysisResult,
    ) -> Result<(), StoreError> {
        let written = analyses::upsert_analysis(&self.pool, entry_id, result)
            .await
            .map_err(StoreError::backend)?;
        if !written {
            tracing::debug!(entry_id, "entry deleted before analysis was saved");
        }
        Ok(())
    }

    async fn delete_analysis(&self, entry_id: i64) -> Result<(), StoreError> {
        analyses::delete_analysis(&self.pool, entry_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn upsert_embedding(&self, record: &EmbeddingRecord) -> Result<(), StoreError> {
        let written = embeddings::upsert_embedding(&self.pool, record)
            .await
            .map_err(StoreError::backend)?;
        if !written {
            tracing::debug!(
                entry_id = record.entry_id,
                "entry deleted before embedding was saved"
            );
        }
        Ok(())
    }

    async fn query_embeddings(&self, user_id: i64) -> Result<Vec<StoredEmbedding>, StoreError> {
        embeddings::list_user_embeddings(&self.pool, user_id)
            .await
            .map_err(StoreError::backend)
    }

    async fn recent_analyses(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<AnalysisResult>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        analyses::list_recent_analyses(&self.pool, user_id, limit)
            .await
            .map_err(StoreError::backend)
    }
}
