//! Mining a user's recent analysis history.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::{AnalysisResult, LabelScore};

/// Emotions at or below this score do not count as present in a result.
pub const EMOTION_PRESENCE_THRESHOLD: f64 = 0.3;

/// How many common emotions a summary keeps.
pub const COMMON_EMOTION_LIMIT: usize = 5;

/// Emotion-label families and the coping strategy offered for each.
///
/// A small heuristic table, matched case-insensitively against common
/// emotion labels.
pub const COPING_STRATEGIES: &[(&[&str], &str)] = &[
    (
        &["anxiety", "fear"],
        "Practice deep breathing exercises when feeling anxious",
    ),
    (
        &["sadness"],
        "Engage in activities that bring you joy, like listening to music",
    ),
    (
        &["anger"],
        "Try physical exercise or journaling to release tension",
    ),
    (
        &["joy", "happiness"],
        "Continue doing activities that bring you happiness",
    ),
];

/// Emitted when no common emotion belongs to a known family.
pub const DEFAULT_COPING_STRATEGY: &str =
    "Practice mindfulness and self-reflection through journaling";

/// Aggregated view of a user's recent emotional history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternSummary {
    /// Up to five labels, scored as the fraction of analysed results they appeared in.
    pub common_emotions: Vec<LabelScore>,
    /// Ordered, one per matched family; never empty once mined.
    pub coping_strategies: Vec<String>,
    /// Result count per overall sentiment label.
    pub sentiment_counts: BTreeMap<String, usize>,
    pub analyzed_count: usize,
    /// Mean `sentiment_score`; `0.0` when nothing was analysed.
    pub average_sentiment_score: f64,
}

impl PatternSummary {
    /// Whether `label` is among the common emotions (case-insensitive).
    #[must_use]
    pub fn has_common_emotion(&self, label: &str) -> bool {
        self.common_emotions
            .iter()
            .any(|e| e.label.eq_ignore_ascii_case(label))
    }
}

/// Aggregate `history` (most recent first) into a [`PatternSummary`].
#[must_use]
pub fn mine_patterns(history: &[AnalysisResult]) -> PatternSummary {
    let mut sentiment_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut score_sum = 0.0_f64;

    // First-seen order is kept so equal counts rank by first appearance.
    let mut frequencies: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in history {
        *sentiment_counts
            .entry(result.overall_sentiment.to_string())
            .or_insert(0) += 1;
        score_sum += result.sentiment_score;

        for emotion in &result.emotions {
            if emotion.score <= EMOTION_PRESENCE_THRESHOLD {
                continue;
            }
            match index.get(&emotion.label) {
                Some(&i) => frequencies[i].1 += 1,
                None => {
                    index.insert(emotion.label.clone(), frequencies.len());
                    frequencies.push((emotion.label.clone(), 1));
                }
            }
        }
    }

    let analyzed_count = history.len();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));

    #[allow(clippy::cast_precision_loss)]
    let common_emotions: Vec<LabelScore> = frequencies
        .into_iter()
        .take(COMMON_EMOTION_LIMIT)
        .map(|(label, count)| LabelScore::new(label, count as f64 / analyzed_count as f64))
        .collect();

    let coping_strategies = coping_strategies_for(&common_emotions);

    #[allow(clippy::cast_precision_loss)]
    let average_sentiment_score = if analyzed_count == 0 {
        0.0
    } else {
        score_sum / analyzed_count as f64
    };

    PatternSummary {
        common_emotions,
        coping_strategies,
        sentiment_counts,
        analyzed_count,
        average_sentiment_score,
    }
}

/// Look up one strategy per matching family, deduplicated in first-match order.
///
/// Falls back to [`DEFAULT_COPING_STRATEGY`] when nothing matches.
#[must_use]
pub fn coping_strategies_for(emotions: &[LabelScore]) -> Vec<String> {
    let mut strategies: Vec<String> = Vec::new();
    for emotion in emotions {
        let label = emotion.label.to_lowercase();
        let matched = COPING_STRATEGIES
            .iter()
            .find(|(family, _)| family.contains(&label.as_str()));
        if let Some((_, strategy)) = matched {
            if !strategies.iter().any(|s| s == strategy) {
                strategies.push((*strategy).to_string());
            }
        }
    }

    if strategies.is_empty() {
        strategies.push(DEFAULT_COPING_STRATEGY.to_string());
    }
    strategies
}
