//! Database operations for the `journal_entries` table.

use chrono::{DateTime, Utc};
use moodlens_analysis::JournalEntry;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `journal_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JournalEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JournalEntryRow> for JournalEntry {
    fn from(row: JournalEntryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            text: row.body,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a new entry and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_entry(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    body: &str,
) -> Result<JournalEntryRow, DbError> {
    let row = sqlx::query_as::<_, JournalEntryRow>(
        "INSERT INTO journal_entries (user_id, title, body) \
         VALUES ($1, $2, $3) \
         RETURNING id, user_id, title, body, created_at, updated_at",
    )
    .bind(user_id)
    .bind(title)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates the title and/or body of an entry. `None` leaves a field unchanged.
///
/// Returns `None` if no entry has this id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_entry(
    pool: &PgPool,
    entry_id: i64,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<Option<JournalEntryRow>, DbError> {
    let row = sqlx::query_as::<_, JournalEntryRow>(
        "UPDATE journal_entries \
         SET title = COALESCE($2, title), \
             body = COALESCE($3, body), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, user_id, title, body, created_at, updated_at",
    )
    .bind(entry_id)
    .bind(title)
    .bind(body)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes an entry. Its analysis and embedding are removed by cascade.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_entry(pool: &PgPool, entry_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1")
        .bind(entry_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns a single entry by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_entry(pool: &PgPool, entry_id: i64) -> Result<Option<JournalEntryRow>, DbError> {
    let row = sqlx::query_as::<_, JournalEntryRow>(
        "SELECT id, user_id, title, body, created_at, updated_at \
         FROM journal_entries \
         WHERE id = $1",
    )
    .bind(entry_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the ids of all entries for a user, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entry_ids_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM journal_entries \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
