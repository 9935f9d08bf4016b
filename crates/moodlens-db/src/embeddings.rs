//! Database operations for the `entry_embeddings` table.

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use moodlens_analysis::{AnalysisResult, EmbeddingRecord, LabelScore, SentimentLabel, StoredEmbedding};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::{is_foreign_key_violation, DbError};

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// An `entry_embeddings` row joined with its entry and optional analysis.
///
/// The analysis columns are all `NULL` when the entry has not been analysed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmbeddingJoinRow {
    pub entry_id: i64,
    pub vector: Vec<f32>,
    pub content_fingerprint: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub overall_sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub emotions: Option<Json<Vec<LabelScore>>>,
    pub summary: Option<String>,
    pub suggestion: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl From<EmbeddingJoinRow> for StoredEmbedding {
    fn from(row: EmbeddingJoinRow) -> Self {
        let analysis = match (row.overall_sentiment, row.sentiment_score, row.analyzed_at) {
            (Some(sentiment), Some(score), Some(analyzed_at)) => Some(AnalysisResult {
                overall_sentiment: SentimentLabel::from(sentiment),
                sentiment_score: score,
                emotions: row.emotions.map(|e| e.0).unwrap_or_default(),
                summary: row.summary.unwrap_or_default(),
                suggestion: row.suggestion.unwrap_or_default(),
                analyzed_at,
            }),
            _ => None,
        };

        Self {
            entry_id: row.entry_id,
            vector: row.vector,
            content_fingerprint: row.content_fingerprint,
            title: row.title,
            text: row.body,
            created_at: row.created_at,
            analysis,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts the embedding, or overwrites vector and fingerprint of the
/// entry's existing one.
///
/// Writes nothing when the entry does not exist, including when it is deleted
/// while the statement runs. Returns `true` if a row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_embedding(pool: &PgPool, record: &EmbeddingRecord) -> Result<bool, DbError> {
    let outcome = sqlx::query(
        "INSERT INTO entry_embeddings (entry_id, user_id, vector, content_fingerprint, created_at) \
         SELECT $1, $2, $3, $4, $5 \
         WHERE EXISTS (SELECT 1 FROM journal_entries WHERE id = $1) \
         ON CONFLICT (entry_id) DO UPDATE SET \
             user_id = EXCLUDED.user_id, \
             vector = EXCLUDED.vector, \
             content_fingerprint = EXCLUDED.content_fingerprint, \
             created_at = EXCLUDED.created_at",
    )
    .bind(record.entry_id)
    .bind(record.user_id)
    .bind(&record.vector)
    .bind(&record.content_fingerprint)
    .bind(record.created_at)
    .execute(pool)
    .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) if is_foreign_key_violation(&e) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    Ok(outcome.rows_affected() > 0)
}

/// Returns every embedding of a user with entry metadata and any prior
/// analysis, newest entry first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_user_embeddings(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<StoredEmbedding>, DbError> {
    let rows: Vec<StoredEmbedding> = sqlx::query_as::<_, EmbeddingJoinRow>(
        "SELECT ee.entry_id, ee.vector, ee.content_fingerprint, \
                je.title, je.body, je.created_at, \
                ma.overall_sentiment, ma.sentiment_score, ma.emotions, \
                ma.summary, ma.suggestion, ma.analyzed_at \
         FROM entry_embeddings ee \
         JOIN journal_entries je ON je.id = ee.entry_id \
         LEFT JOIN mood_analyses ma ON ma.entry_id = ee.entry_id \
         WHERE ee.user_id = $1 \
         ORDER BY je.created_at DESC, ee.entry_id DESC",
    )
    .bind(user_id)
    .fetch(pool)
    .map_ok(StoredEmbedding::from)
    .try_collect()
    .await?;

    Ok(rows)
}
