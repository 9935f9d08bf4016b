use thiserror::Error;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape from {context}")]
    UnexpectedShape { context: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("analysis of entry {entry_id} timed out after {secs}s")]
    Timeout { entry_id: i64, secs: u64 },
}
