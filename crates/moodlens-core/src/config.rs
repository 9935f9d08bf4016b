use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_INFERENCE_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models/";
const DEFAULT_SENTIMENT_MODEL: &str = "tabularisai/multilingual-sentiment-analysis";
const DEFAULT_EMOTION_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-small-en-v1.5";
const DEFAULT_GENERATION_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_nonzero = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_usize(var, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let database_url = lookup("DATABASE_URL").ok();
    let log_level = or_default("MOODLENS_LOG_LEVEL", "info");

    let inference_base_url = or_default("MOODLENS_INFERENCE_BASE_URL", DEFAULT_INFERENCE_BASE_URL);
    let inference_api_key = lookup("HUGGINGFACE_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let inference_timeout_secs = parse_u64("MOODLENS_INFERENCE_TIMEOUT_SECS", "30")?;

    let sentiment_model = or_default("MOODLENS_SENTIMENT_MODEL", DEFAULT_SENTIMENT_MODEL);
    let emotion_model = or_default("MOODLENS_EMOTION_MODEL", DEFAULT_EMOTION_MODEL);
    let embedding_model = or_default("MOODLENS_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL);
    let generation_model = or_default("MOODLENS_GENERATION_MODEL", DEFAULT_GENERATION_MODEL);

    let embedding_dim = parse_nonzero("MOODLENS_EMBEDDING_DIM", "384")?;
    let similar_entries_limit = parse_usize("MOODLENS_SIMILAR_ENTRIES", "3")?;
    let pattern_history_limit = parse_usize("MOODLENS_PATTERN_HISTORY", "50")?;
    let analysis_max_concurrent = parse_nonzero("MOODLENS_ANALYSIS_MAX_CONCURRENT", "4")?;
    let analysis_task_timeout_secs = parse_u64("MOODLENS_ANALYSIS_TASK_TIMEOUT_SECS", "120")?;

    let db_max_connections = parse_u32("MOODLENS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MOODLENS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MOODLENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        inference_base_url,
        inference_api_key,
        inference_timeout_secs,
        sentiment_model,
        emotion_model,
        embedding_model,
        generation_model,
        embedding_dim,
        similar_entries_limit,
        pattern_history_limit,
        analysis_max_concurrent,
        analysis_task_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
