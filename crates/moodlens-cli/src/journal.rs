//! Entry management command handlers for the CLI.

use std::sync::Arc;

use moodlens_analysis::{
    AnalysisQueue, AnalysisSettings, HfInferenceClient, MoodAnalyzer, QueueSettings, TaskOutcome,
};
use moodlens_core::AppConfig;
use moodlens_db::PgEntryStore;
use sqlx::PgPool;

/// Database pool plus the analysis pipeline wired against it.
pub(crate) struct Services {
    pool: PgPool,
    analyzer: Arc<MoodAnalyzer>,
    queue: AnalysisQueue,
}

impl Services {
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing, the database is
    /// unreachable or the inference client cannot be built.
    pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = moodlens_db::connect_pool_from_config(config).await?;
        let inference = HfInferenceClient::from_app_config(config)?;
        let store = PgEntryStore::new(pool.clone());

        let analyzer = Arc::new(MoodAnalyzer::new(
            Arc::new(inference),
            Arc::new(store),
            AnalysisSettings::from_app_config(config),
        ));
        let queue = AnalysisQueue::new(
            Arc::clone(&analyzer),
            QueueSettings::from_app_config(config),
        );

        Ok(Self {
            pool,
            analyzer,
            queue,
        })
    }
}

/// Apply pending migrations and report how many ran.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = moodlens_db::connect_pool_from_config(config).await?;
    let applied = moodlens_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Insert an entry, analyse it in the background and print the result.
///
/// # Errors
///
/// Returns an error if the insert fails or the analysis task panics.
pub(crate) async fn run_add(
    services: &Services,
    user_id: i64,
    title: &str,
    text: &str,
) -> anyhow::Result<()> {
    let entry = moodlens_db::insert_entry(&services.pool, user_id, title, text).await?;
    println!("created entry {}", entry.id);

    let outcome = services.queue.submit(entry.id).await?;
    print_outcome(services, entry.id, outcome).await
}

/// Update an entry, re-analyse it and print the result.
///
/// # Errors
///
/// Returns an error if neither field is given, the entry does not exist, or
/// the update fails.
pub(crate) async fn run_edit(
    services: &Services,
    entry_id: i64,
    title: Option<&str>,
    text: Option<&str>,
) -> anyhow::Result<()> {
    if title.is_none() && text.is_none() {
        anyhow::bail!("nothing to update: pass --title and/or --text");
    }

    let entry = moodlens_db::update_entry(&services.pool, entry_id, title, text)
        .await?
        .ok_or_else(|| anyhow::anyhow!("entry {entry_id} not found"))?;
    println!("updated entry {}", entry.id);

    let outcome = services.queue.submit(entry.id).await?;
    print_outcome(services, entry.id, outcome).await
}

/// Delete an entry; its analysis and embedding go with it.
///
/// # Errors
///
/// Returns an error if the entry does not exist or the delete fails.
pub(crate) async fn run_delete(services: &Services, entry_id: i64) -> anyhow::Result<()> {
    if !moodlens_db::delete_entry(&services.pool, entry_id).await? {
        anyhow::bail!("entry {entry_id} not found");
    }
    println!("deleted entry {entry_id}");
    Ok(())
}

/// Queue analyses for one entry or all of a user's entries and wait for them.
///
/// # Errors
///
/// Returns an error if the user's entries cannot be listed.
pub(crate) async fn run_reanalyze(
    services: &Services,
    entry_id: Option<i64>,
    user_id: Option<i64>,
) -> anyhow::Result<()> {
    let entry_ids = match (entry_id, user_id) {
        (Some(id), _) => vec![id],
        (None, Some(user_id)) => moodlens_db::list_entry_ids_for_user(&services.pool, user_id).await?,
        (None, None) => anyhow::bail!("pass --entry or --user"),
    };

    tracing::info!(entries = entry_ids.len(), "queueing re-analysis");
    for id in &entry_ids {
        // Detached; drain() below waits for every task.
        drop(services.queue.submit(*id));
    }
    services.queue.drain().await;

    let metrics = services.queue.metrics();
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

/// Print the stored analysis of an entry.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_show(services: &Services, entry_id: i64) -> anyhow::Result<()> {
    match moodlens_db::get_analysis(&services.pool, entry_id).await? {
        Some(analysis) => println!("{}", serde_json::to_string_pretty(&analysis)?),
        None => println!("entry {entry_id} has no analysis yet"),
    }
    Ok(())
}

/// Print the mined pattern summary of a user.
///
/// # Errors
///
/// Returns an error if the user's history cannot be read.
pub(crate) async fn run_patterns(services: &Services, user_id: i64) -> anyhow::Result<()> {
    let patterns = services.analyzer.user_patterns(user_id).await?;
    println!("{}", serde_json::to_string_pretty(&patterns)?);
    Ok(())
}

async fn print_outcome(services: &Services, entry_id: i64, outcome: TaskOutcome) -> anyhow::Result<()> {
    if outcome != TaskOutcome::Succeeded {
        println!("analysis of entry {entry_id} did not complete: {outcome:?}");
        return Ok(());
    }
    run_show(services, entry_id).await
}
