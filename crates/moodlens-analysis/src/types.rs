use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall polarity of an entry.
///
/// Labels the classifier reports outside the three known polarities are kept
/// verbatim in [`SentimentLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
    Other(String),
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
            SentimentLabel::Other(label) => label,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "negative" => SentimentLabel::Negative,
            "neutral" => SentimentLabel::Neutral,
            "positive" => SentimentLabel::Positive,
            _ => SentimentLabel::Other(value),
        }
    }
}

impl From<SentimentLabel> for String {
    fn from(value: SentimentLabel) -> Self {
        match value {
            SentimentLabel::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// One `(label, score)` pair as delivered by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Normalized polarity: the sign of `score` encodes the direction, the
/// magnitude the classifier's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// Mood analysis attached 1:1 to a journal entry.
///
/// Replaced wholesale on re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: f64,
    /// Emotion scores in classifier order; they need not sum to 1.
    pub emotions: Vec<LabelScore>,
    pub summary: String,
    pub suggestion: String,
    pub analyzed_at: DateTime<Utc>,
}

/// A journal entry as read from the entry store.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Text fed to the analysis pipeline: title and body joined by a space.
    #[must_use]
    pub fn analysis_text(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

/// Per-entry embedding, upserted by `entry_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub entry_id: i64,
    pub user_id: i64,
    pub vector: Vec<f32>,
    /// Hex SHA-256 of the normalized source text.
    pub content_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// An embedding row joined with its entry and any prior analysis.
#[derive(Debug, Clone)]
pub struct StoredEmbedding {
    pub entry_id: i64,
    pub vector: Vec<f32>,
    pub content_fingerprint: String,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub analysis: Option<AnalysisResult>,
}

/// A prior entry scored against the current one. Never persisted.
#[derive(Debug, Clone)]
pub struct SimilarityCandidate {
    pub entry_id: i64,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub similarity: f64,
    pub analysis: Option<AnalysisResult>,
}

impl SimilarityCandidate {
    /// The prior entry's suggestion, if it has a non-empty one.
    #[must_use]
    pub fn prior_suggestion(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .map(|a| a.suggestion.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}
