#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that touch the entry store need this.
    pub database_url: Option<String>,
    pub log_level: String,
    /// Model endpoint prefix; the model name is appended verbatim.
    pub inference_base_url: String,
    pub inference_api_key: Option<String>,
    pub inference_timeout_secs: u64,
    pub sentiment_model: String,
    pub emotion_model: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// System-wide embedding width shared by remote and fallback vectors.
    pub embedding_dim: usize,
    pub similar_entries_limit: usize,
    pub pattern_history_limit: usize,
    pub analysis_max_concurrent: usize,
    pub analysis_task_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("inference_base_url", &self.inference_base_url)
            .field(
                "inference_api_key",
                &self.inference_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("sentiment_model", &self.sentiment_model)
            .field("emotion_model", &self.emotion_model)
            .field("embedding_model", &self.embedding_model)
            .field("generation_model", &self.generation_model)
            .field("embedding_dim", &self.embedding_dim)
            .field("similar_entries_limit", &self.similar_entries_limit)
            .field("pattern_history_limit", &self.pattern_history_limit)
            .field("analysis_max_concurrent", &self.analysis_max_concurrent)
            .field(
                "analysis_task_timeout_secs",
                &self.analysis_task_timeout_secs,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
