//! In-memory fakes for the inference service and the entry store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use moodlens_analysis::{
    AnalysisError, AnalysisResult, ClassifierTask, EmbeddingRecord, EntryStore, InferenceService,
    JournalEntry, LabelScore, StoreError, StoredEmbedding,
};

fn unavailable() -> AnalysisError {
    AnalysisError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// Scripted inference responses; `None` makes the call fail.
#[derive(Default)]
pub struct FakeInference {
    pub sentiment: Option<Vec<LabelScore>>,
    pub emotions: Option<Vec<LabelScore>>,
    pub embedding: Option<Vec<f32>>,
    pub generation: Option<String>,
    /// Applied before every classifier answer.
    pub delay: Option<Duration>,
    pub embed_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
}

impl FakeInference {
    /// Every call fails, as if the service were unreachable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceService for FakeInference {
    async fn classify(
        &self,
        task: ClassifierTask,
        _text: &str,
    ) -> Result<Vec<LabelScore>, AnalysisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = match task {
            ClassifierTask::Sentiment => &self.sentiment,
            ClassifierTask::Emotion => &self.emotions,
        };
        scripted.clone().ok_or_else(unavailable)
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, AnalysisError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.embedding.clone().ok_or_else(unavailable)
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generation.clone().ok_or_else(unavailable)
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<i64, JournalEntry>,
    analyses: HashMap<i64, AnalysisResult>,
    embeddings: HashMap<i64, EmbeddingRecord>,
}

/// Entry store backed by hash maps, with the same missing-entry no-op
/// semantics as the database store.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
    pub fail_embedding_queries: bool,
}

pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, n, 9, 0, 0).unwrap()
}

impl FakeStore {
    /// A store whose embedding lookups always fail.
    pub fn failing_embeddings() -> Self {
        Self {
            state: Mutex::default(),
            fail_embedding_queries: true,
        }
    }

    pub fn add_entry(&self, id: i64, user_id: i64, title: &str, text: &str, created_at: DateTime<Utc>) {
        self.state.lock().unwrap().entries.insert(
            id,
            JournalEntry {
                id,
                user_id,
                title: title.to_string(),
                text: text.to_string(),
                created_at,
            },
        );
    }

    pub fn set_text(&self, id: i64, text: &str) {
        if let Some(entry) = self.state.lock().unwrap().entries.get_mut(&id) {
            entry.text = text.to_string();
        }
    }

    /// Removes the entry and, like a cascading delete, its dependents.
    pub fn remove_entry(&self, id: i64) {
        let mut state = self.state.lock().unwrap();
        state.entries.remove(&id);
        state.analyses.remove(&id);
        state.embeddings.remove(&id);
    }

    pub fn put_analysis(&self, id: i64, result: AnalysisResult) {
        self.state.lock().unwrap().analyses.insert(id, result);
    }

    pub fn put_embedding(&self, id: i64, vector: Vec<f32>, fingerprint: &str) {
        let mut state = self.state.lock().unwrap();
        let user_id = state.entries[&id].user_id;
        state.embeddings.insert(
            id,
            EmbeddingRecord {
                entry_id: id,
                user_id,
                vector,
                content_fingerprint: fingerprint.to_string(),
                created_at: Utc::now(),
            },
        );
    }

    pub fn analysis(&self, id: i64) -> Option<AnalysisResult> {
        self.state.lock().unwrap().analyses.get(&id).cloned()
    }

    pub fn embedding(&self, id: i64) -> Option<EmbeddingRecord> {
        self.state.lock().unwrap().embeddings.get(&id).cloned()
    }

    pub fn analysis_count(&self) -> usize {
        self.state.lock().unwrap().analyses.len()
    }

    pub fn embedding_count(&self) -> usize {
        self.state.lock().unwrap().embeddings.len()
    }
}

#[async_trait]
impl EntryStore for FakeStore {
    async fn get_entry(&self, entry_id: i64) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.state.lock().unwrap().entries.get(&entry_id).cloned())
    }

    async fn save_analysis(&self, entry_id: i64, result: &AnalysisResult) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.entries.contains_key(&entry_id) {
            state.analyses.insert(entry_id, result.clone());
        }
        Ok(())
    }

    async fn delete_analysis(&self, entry_id: i64) -> Result<(), StoreError> {
        self.state.lock().unwrap().analyses.remove(&entry_id);
        Ok(())
    }

    async fn upsert_embedding(&self, record: &EmbeddingRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.entries.contains_key(&record.entry_id) {
            state.embeddings.insert(record.entry_id, record.clone());
        }
        Ok(())
    }

    async fn query_embeddings(&self, user_id: i64) -> Result<Vec<StoredEmbedding>, StoreError> {
        if self.fail_embedding_queries {
            return Err(StoreError::backend(std::io::Error::other("embedding table offline")));
        }
        let state = self.state.lock().unwrap();
        let mut rows: Vec<StoredEmbedding> = state
            .embeddings
            .values()
            .filter(|record| record.user_id == user_id)
            .filter_map(|record| {
                let entry = state.entries.get(&record.entry_id)?;
                Some(StoredEmbedding {
                    entry_id: record.entry_id,
                    vector: record.vector.clone(),
                    content_fingerprint: record.content_fingerprint.clone(),
                    title: entry.title.clone(),
                    text: entry.text.clone(),
                    created_at: entry.created_at,
                    analysis: state.analyses.get(&record.entry_id).cloned(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.entry_id.cmp(&a.entry_id)));
        Ok(rows)
    }

    async fn recent_analyses(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<AnalysisResult>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<(DateTime<Utc>, AnalysisResult)> = state
            .analyses
            .iter()
            .filter(|(id, _)| state.entries.get(*id).is_some_and(|e| e.user_id == user_id))
            .map(|(_, result)| (result.analyzed_at, result.clone()))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(rows.into_iter().take(limit).map(|(_, r)| r).collect())
    }
}
