//! Database operations for the `mood_analyses` table.

use chrono::{DateTime, Utc};
use moodlens_analysis::{AnalysisResult, LabelScore, SentimentLabel};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::{is_foreign_key_violation, DbError};

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `mood_analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MoodAnalysisRow {
    pub entry_id: i64,
    pub overall_sentiment: String,
    pub sentiment_score: f64,
    /// Stored as JSONB, in classifier order.
    pub emotions: Json<Vec<LabelScore>>,
    pub summary: String,
    pub suggestion: String,
    pub analyzed_at: DateTime<Utc>,
}

impl From<MoodAnalysisRow> for AnalysisResult {
    fn from(row: MoodAnalysisRow) -> Self {
        Self {
            overall_sentiment: SentimentLabel::from(row.overall_sentiment),
            sentiment_score: row.sentiment_score,
            emotions: row.emotions.0,
            summary: row.summary,
            suggestion: row.suggestion,
            analyzed_at: row.analyzed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts or replaces the analysis of an entry in a single statement.
///
/// Writes nothing when the entry does not exist, including when it is deleted
/// while the statement runs. Returns `true` if a row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_analysis(
    pool: &PgPool,
    entry_id: i64,
    result: &AnalysisResult,
) -> Result<bool, DbError> {
    let outcome = sqlx::query(
        "INSERT INTO mood_analyses \
             (entry_id, overall_sentiment, sentiment_score, emotions, summary, suggestion, analyzed_at) \
         SELECT $1, $2, $3, $4, $5, $6, $7 \
         WHERE EXISTS (SELECT 1 FROM journal_entries WHERE id = $1) \
         ON CONFLICT (entry_id) DO UPDATE SET \
             overall_sentiment = EXCLUDED.overall_sentiment, \
             sentiment_score = EXCLUDED.sentiment_score, \
             emotions = EXCLUDED.emotions, \
             summary = EXCLUDED.summary, \
             suggestion = EXCLUDED.suggestion, \
             analyzed_at = EXCLUDED.analyzed_at",
    )
    .bind(entry_id)
    .bind(result.overall_sentiment.as_str())
    .bind(result.sentiment_score)
    .bind(Json(&result.emotions))
    .bind(&result.summary)
    .bind(&result.suggestion)
    .bind(result.analyzed_at)
    .execute(pool)
    .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) if is_foreign_key_violation(&e) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    Ok(outcome.rows_affected() > 0)
}

/// Returns the analysis of an entry, or `None` if it has not been analysed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_analysis(pool: &PgPool, entry_id: i64) -> Result<Option<AnalysisResult>, DbError> {
    let row = sqlx::query_as::<_, MoodAnalysisRow>(
        "SELECT entry_id, overall_sentiment, sentiment_score, emotions, summary, suggestion, analyzed_at \
         FROM mood_analyses \
         WHERE entry_id = $1",
    )
    .bind(entry_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AnalysisResult::from))
}

/// Deletes the analysis of an entry. Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_analysis(pool: &PgPool, entry_id: i64) -> Result<bool, DbError> {
    let outcome = sqlx::query("DELETE FROM mood_analyses WHERE entry_id = $1")
        .bind(entry_id)
        .execute(pool)
        .await?;

    Ok(outcome.rows_affected() > 0)
}

/// Returns a user's most recent analyses, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_analyses(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<AnalysisResult>, DbError> {
    let rows = sqlx::query_as::<_, MoodAnalysisRow>(
        "SELECT ma.entry_id, ma.overall_sentiment, ma.sentiment_score, ma.emotions, \
                ma.summary, ma.suggestion, ma.analyzed_at \
         FROM mood_analyses ma \
         JOIN journal_entries je ON je.id = ma.entry_id \
         WHERE je.user_id = $1 \
         ORDER BY ma.analyzed_at DESC, ma.entry_id DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnalysisResult::from).collect())
}
