//! Per-user embedding storage and cosine-similarity ranking.
//!
//! There is no index: retrieval is a flat scan over one user's embeddings.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;

use crate::error::StoreError;
use crate::store::EntryStore;
use crate::types::{EmbeddingRecord, SimilarityCandidate, StoredEmbedding};

/// Cosine similarity of two vectors, in `[-1.0, 1.0]`.
///
/// Returns `0.0` when the lengths differ, when either vector has zero norm,
/// or when the inputs contain non-finite values.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Score every candidate against `query` and keep the `k` most similar.
///
/// Sorted by similarity descending; the sort is stable so exact ties keep
/// their input order.
pub fn top_k<T, F>(query: &[f32], candidates: Vec<T>, k: usize, vector_of: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> &[f32],
{
    let mut scored: Vec<(T, f64)> = candidates
        .into_iter()
        .map(|c| {
            let similarity = cosine_similarity(query, vector_of(&c));
            (c, similarity)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Rank a user's stored embeddings against `query`, skipping `exclude_entry`.
#[must_use]
pub fn rank_similar(
    query: &[f32],
    stored: Vec<StoredEmbedding>,
    exclude_entry: i64,
    k: usize,
) -> Vec<SimilarityCandidate> {
    let others: Vec<StoredEmbedding> = stored
        .into_iter()
        .filter(|row| row.entry_id != exclude_entry)
        .collect();

    top_k(query, others, k, |row| row.vector.as_slice())
        .into_iter()
        .map(|(row, similarity)| SimilarityCandidate {
            entry_id: row.entry_id,
            title: row.title,
            text: row.text,
            created_at: row.created_at,
            similarity,
            analysis: row.analysis,
        })
        .collect()
}

/// Embedding accessor scoped to the entry store.
#[derive(Clone)]
pub struct VectorStore {
    store: Arc<dyn EntryStore>,
}

impl VectorStore {
    #[must_use]
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Insert or overwrite the embedding for `entry_id`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`StoreError`].
    pub async fn upsert(
        &self,
        entry_id: i64,
        user_id: i64,
        vector: Vec<f32>,
        fingerprint: String,
    ) -> Result<(), StoreError> {
        let record = EmbeddingRecord {
            entry_id,
            user_id,
            vector,
            content_fingerprint: fingerprint,
            created_at: Utc::now(),
        };
        self.store.upsert_embedding(&record).await
    }

    /// All stored embeddings for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`StoreError`].
    pub async fn query(&self, user_id: i64) -> Result<Vec<StoredEmbedding>, StoreError> {
        self.store.query_embeddings(user_id).await
    }
}
