//! Hugging Face style inference HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use moodlens_core::AppConfig;
use reqwest::Client;
use serde::Serialize;

use super::responses::{parse_embedding, parse_generated_text, parse_label_scores};
use super::{ClassifierTask, InferenceService};
use crate::error::AnalysisError;
use crate::types::LabelScore;

/// Longest slice of an error body kept in [`AnalysisError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Model identifiers appended to the base URL, one per task.
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub sentiment: String,
    pub emotion: String,
    pub embedding: String,
    pub generation: String,
}

impl ModelSet {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            sentiment: config.sentiment_model.clone(),
            emotion: config.emotion_model.clone(),
            embedding: config.embedding_model.clone(),
            generation: config.generation_model.clone(),
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<GenerationParameters>,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_length: u32,
    temperature: f32,
    do_sample: bool,
    pad_token_id: u32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: 150,
            temperature: 0.7,
            do_sample: true,
            pad_token_id: 50256,
        }
    }
}

/// HTTP client for a hosted inference API.
///
/// Each call is a single `POST {base_url}/{model}` bounded by the configured
/// timeout. Use [`HfInferenceClient::from_app_config`] in production or
/// [`HfInferenceClient::new`] to point at a mock server in tests.
pub struct HfInferenceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    models: ModelSet,
}

impl HfInferenceClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        models: ModelSet,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("moodlens/0.1 (mood-analysis)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            models,
        })
    }

    /// Create a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        Self::new(
            &config.inference_base_url,
            config.inference_api_key.as_deref(),
            config.inference_timeout_secs,
            ModelSet::from_app_config(config),
        )
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model.trim_start_matches('/'))
    }

    fn model_for(&self, task: ClassifierTask) -> &str {
        match task {
            ClassifierTask::Sentiment => &self.models.sentiment,
            ClassifierTask::Emotion => &self.models.emotion,
        }
    }

    /// POST one request and return the raw body of a 2xx response.
    async fn post(&self, model: &str, request: &InferenceRequest<'_>) -> Result<String, AnalysisError> {
        let mut builder = self.client.post(self.model_url(model)).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl InferenceService for HfInferenceClient {
    async fn classify(
        &self,
        task: ClassifierTask,
        text: &str,
    ) -> Result<Vec<LabelScore>, AnalysisError> {
        let model = self.model_for(task);
        let body = self
            .post(model, &InferenceRequest { inputs: text, parameters: None })
            .await?;

        let Some((shape, items)) = parse_label_scores(&body) else {
            tracing::warn!(%task, model, "classifier response matched no known shape");
            return Err(AnalysisError::UnexpectedShape {
                context: format!("{task} classifier ({model})"),
            });
        };
        tracing::debug!(%task, model, ?shape, labels = items.len(), "classifier response parsed");
        Ok(items)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AnalysisError> {
        let model = &self.models.embedding;
        let body = self
            .post(model, &InferenceRequest { inputs: text, parameters: None })
            .await?;

        let Some((shape, vector)) = parse_embedding(&body) else {
            return Err(AnalysisError::UnexpectedShape {
                context: format!("embedding ({model})"),
            });
        };
        tracing::debug!(model, ?shape, dim = vector.len(), "embedding response parsed");
        Ok(vector)
    }

    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let model = &self.models.generation;
        let request = InferenceRequest {
            inputs: prompt,
            parameters: Some(GenerationParameters::default()),
        };
        let body = self.post(model, &request).await?;

        parse_generated_text(&body)
            .map(|(_, text)| text)
            .ok_or_else(|| AnalysisError::UnexpectedShape {
                context: format!("text generation ({model})"),
            })
    }
}
