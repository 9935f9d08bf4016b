//! Human-readable summary sentences for an analysis.

use crate::classifier::top_label;
use crate::patterns::{PatternSummary, EMOTION_PRESENCE_THRESHOLD};
use crate::text::capitalize_first;
use crate::types::{LabelScore, SentimentLabel, SimilarityCandidate};

/// The top candidate must score above this for the recurrence sentence.
pub const RECURRENCE_SIMILARITY_THRESHOLD: f64 = 0.7;

const RECURRENCE_SENTENCE: &str =
    "This entry is similar to previous experiences you've written about.";

/// Sentiment sentence, plus the primary emotion when it is confident enough.
#[must_use]
pub fn plain_summary(sentiment: &SentimentLabel, emotions: &[LabelScore]) -> String {
    sentences(sentiment, emotions).join(" ").trim().to_string()
}

/// [`plain_summary`] extended with history context.
///
/// Adds at most one sentence for the first current emotion that is also a
/// common emotion, and one when the most similar prior entry scores above
/// [`RECURRENCE_SIMILARITY_THRESHOLD`]. `candidates` must be ordered by
/// similarity, highest first.
#[must_use]
pub fn augmented_summary(
    sentiment: &SentimentLabel,
    emotions: &[LabelScore],
    candidates: &[SimilarityCandidate],
    patterns: &PatternSummary,
) -> String {
    let mut parts = sentences(sentiment, emotions);

    if let Some(recurring) = emotions
        .iter()
        .find(|e| patterns.has_common_emotion(&e.label))
    {
        parts.push(format!(
            "This aligns with your typical {} patterns.",
            recurring.label
        ));
    }

    if candidates
        .first()
        .is_some_and(|top| top.similarity > RECURRENCE_SIMILARITY_THRESHOLD)
    {
        parts.push(RECURRENCE_SENTENCE.to_string());
    }

    parts.join(" ").trim().to_string()
}

fn sentences(sentiment: &SentimentLabel, emotions: &[LabelScore]) -> Vec<String> {
    let mut parts = vec![format!(
        "Overall sentiment: {}.",
        capitalize_first(sentiment.as_str())
    )];

    if let Some(primary) = top_label(emotions).filter(|e| e.score > EMOTION_PRESENCE_THRESHOLD) {
        parts.push(format!(
            "Primary emotion: {} ({:.1}% confidence).",
            capitalize_first(&primary.label),
            primary.score * 100.0
        ));
    }

    parts
}
