//! Sentiment and emotion classification with neutral fallbacks.

use crate::inference::{ClassifierTask, InferenceService};
use crate::types::{LabelScore, Sentiment, SentimentLabel};

/// Map a raw classifier label onto a polarity and signed score.
///
/// Negative labels negate the score, `neutral` forces it to zero, and any
/// label the model invents passes through verbatim with its reported score.
#[must_use]
pub fn normalize_sentiment(label: &str, score: f64) -> Sentiment {
    match label.to_lowercase().as_str() {
        "negative" | "very negative" => Sentiment {
            label: SentimentLabel::Negative,
            score: -score,
        },
        "positive" | "very positive" => Sentiment {
            label: SentimentLabel::Positive,
            score,
        },
        "neutral" => Sentiment::neutral(),
        _ => Sentiment {
            label: SentimentLabel::Other(label.to_string()),
            score,
        },
    }
}

/// The highest-scoring item; ties keep the first one delivered.
#[must_use]
pub fn top_label(items: &[LabelScore]) -> Option<&LabelScore> {
    items.iter().fold(None, |best, item| match best {
        Some(current) if item.score > current.score => Some(item),
        Some(current) => Some(current),
        None => Some(item),
    })
}

/// Reduce a classifier's label list to one normalized sentiment.
///
/// An empty list is neutral.
#[must_use]
pub fn sentiment_from_labels(items: &[LabelScore]) -> Sentiment {
    top_label(items).map_or_else(Sentiment::neutral, |best| {
        normalize_sentiment(&best.label, best.score)
    })
}

/// Classify polarity, substituting neutral/0 when the service fails.
pub async fn classify_sentiment(inference: &dyn InferenceService, text: &str) -> Sentiment {
    match inference.classify(ClassifierTask::Sentiment, text).await {
        Ok(items) => sentiment_from_labels(&items),
        Err(e) => {
            tracing::warn!(error = %e, "sentiment classification failed, using neutral");
            Sentiment::neutral()
        }
    }
}

/// Classify discrete emotions, substituting an empty list when the service fails.
pub async fn classify_emotions(inference: &dyn InferenceService, text: &str) -> Vec<LabelScore> {
    match inference.classify(ClassifierTask::Emotion, text).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "emotion classification failed, using no emotions");
            Vec::new()
        }
    }
}
