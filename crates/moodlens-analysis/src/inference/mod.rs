//! The external NLP service boundary.

mod client;
pub mod responses;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::types::LabelScore;

pub use client::{HfInferenceClient, ModelSet};

/// The two independent classification tasks run per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierTask {
    Sentiment,
    Emotion,
}

impl std::fmt::Display for ClassifierTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierTask::Sentiment => write!(f, "sentiment"),
            ClassifierTask::Emotion => write!(f, "emotion"),
        }
    }
}

/// Classification, embedding and text generation as one injectable service.
///
/// Every method returns `Err` on transport failure, non-success status or an
/// unrecognised body; callers own the fallback policy.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Returns the `(label, score)` pairs in the order the service delivered them.
    async fn classify(
        &self,
        task: ClassifierTask,
        text: &str,
    ) -> Result<Vec<LabelScore>, AnalysisError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AnalysisError>;

    /// Returns the raw generated text, prompt echo included.
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}
