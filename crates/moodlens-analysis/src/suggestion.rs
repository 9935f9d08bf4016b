//! Wellness suggestion generation.
//!
//! Tiers, first non-empty wins:
//! 1. a fresh generation from the text-generation model, cleaned up;
//! 2. a prior suggestion from a sufficiently similar entry;
//! 3. the first pattern-derived coping strategy;
//! 4. a keyword-matched or generic canned suggestion.

use crate::inference::InferenceService;
use crate::patterns::PatternSummary;
use crate::text::capitalize_first;
use crate::types::SimilarityCandidate;

/// A similar entry must score above this for its suggestion to be reused.
pub const REUSE_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Prefix for a reused suggestion.
pub const REUSE_PREFIX: &str = "Previously, you found this helpful: ";

/// Generated lines shorter than this (in characters) are dropped.
const MIN_LINE_CHARS: usize = 10;

/// Lowercase fragments marking a line as prompt echo.
const ECHO_MARKERS: &[&str] = &["journal entry", "suggestion:", "based on"];

/// Quoting and markup characters trimmed from candidate lines.
const MARKUP_CHARS: &[char] = &['"', '\'', '*', '-'];

/// Keyword groups scanned in order against the lowercase entry text.
pub const KEYWORD_SUGGESTIONS: &[(&[&str], &str)] = &[
    (
        &["stress", "anxious", "worry"],
        "Try a 5-minute breathing exercise: breathe in for 4 counts, hold for 4, breathe out for 6. This can help calm your nervous system.",
    ),
    (
        &["sad", "down", "depressed"],
        "Consider taking a short walk outside or doing something creative like drawing or listening to your favorite music.",
    ),
    (
        &["tired", "exhausted", "sleep"],
        "Focus on getting quality rest tonight. Try creating a calming bedtime routine without screens for the last hour before sleep.",
    ),
    (
        &["angry", "frustrated", "mad"],
        "Try some physical activity to release tension, like stretching, going for a walk, or doing jumping jacks for 2 minutes.",
    ),
    (
        &["lonely", "alone"],
        "Reach out to a friend or family member, even if just to say hello. Consider joining a community activity or volunteering.",
    ),
    (
        &["happy", "good", "great"],
        "Celebrate this positive moment! Consider writing down three things you're grateful for today.",
    ),
];

/// Used when no keyword group matches.
pub const GENERIC_SUGGESTIONS: &[&str] = &[
    "Take a few minutes to practice mindfulness by focusing on your breathing and being present in the moment.",
    "Try journaling about three things you're grateful for today, no matter how small they might seem.",
    "Consider doing some light physical activity like stretching or taking a short walk to boost your mood.",
    "Reach out to someone you care about and let them know you're thinking of them.",
    "Practice self-compassion by treating yourself with the same kindness you'd show a good friend.",
];

/// The generation prompt for a journal text.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        "Based on this journal entry, suggest one helpful wellness activity:\n\nJournal: \"{text}\"\n\nSuggestion:"
    )
}

/// Reduce raw model output to one clean suggestion sentence.
///
/// Strips the echoed prompt, drops blank, short and echo-looking lines,
/// trims quoting and markup, then takes the first survivor, capitalizes it
/// and makes sure it ends in terminal punctuation.
#[must_use]
pub fn clean_generated(generated: &str, prompt: &str) -> Option<String> {
    let without_prompt = generated.replacen(prompt, "", 1);

    let line = without_prompt
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !ECHO_MARKERS.iter().any(|marker| lower.contains(marker))
                && line.chars().count() >= MIN_LINE_CHARS
        })
        .map(|line| line.trim_matches(MARKUP_CHARS).trim())
        .find(|line| !line.is_empty())?;

    let mut suggestion = capitalize_first(line);
    if !suggestion.ends_with(['.', '!', '?']) {
        suggestion.push('.');
    }
    Some(suggestion)
}

/// Tier 4: deterministic keyword suggestion.
///
/// When no keyword group matches, the generic suggestion at index
/// `text.len() % GENERIC_SUGGESTIONS.len()` is returned. Keying on the byte
/// length keeps the choice reproducible for a given text.
#[must_use]
pub fn keyword_suggestion(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    KEYWORD_SUGGESTIONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or_else(
            || GENERIC_SUGGESTIONS[text.len() % GENERIC_SUGGESTIONS.len()],
            |(_, suggestion)| *suggestion,
        )
}

/// Tier 1: ask the generation model and clean its output.
pub async fn generated_suggestion(inference: &dyn InferenceService, text: &str) -> Option<String> {
    let prompt = build_prompt(text);
    match inference.generate(&prompt).await {
        Ok(generated) => {
            let cleaned = clean_generated(&generated, &prompt);
            if cleaned.is_none() {
                tracing::debug!("generated text had no usable suggestion line");
            }
            cleaned
        }
        Err(e) => {
            tracing::warn!(error = %e, "suggestion generation failed");
            None
        }
    }
}

/// Tier 2: reuse the suggestion of the most similar qualifying prior entry.
///
/// `candidates` must already be ordered by similarity, highest first.
#[must_use]
pub fn reused_suggestion(candidates: &[SimilarityCandidate]) -> Option<String> {
    candidates
        .iter()
        .filter(|c| c.similarity > REUSE_SIMILARITY_THRESHOLD)
        .find_map(SimilarityCandidate::prior_suggestion)
        .map(|prior| format!("{REUSE_PREFIX}{prior}"))
}

/// Produce one non-empty suggestion, walking the tiers in order.
pub async fn suggest(
    inference: &dyn InferenceService,
    text: &str,
    candidates: &[SimilarityCandidate],
    patterns: &PatternSummary,
) -> String {
    if let Some(suggestion) = generated_suggestion(inference, text).await {
        tracing::debug!(tier = "generated", "suggestion selected");
        return suggestion;
    }

    if let Some(suggestion) = reused_suggestion(candidates) {
        tracing::debug!(tier = "similar_entry", "suggestion selected");
        return suggestion;
    }

    if let Some(strategy) = patterns.coping_strategies.first() {
        tracing::debug!(tier = "coping_strategy", "suggestion selected");
        return strategy.clone();
    }

    tracing::debug!(tier = "keyword", "suggestion selected");
    keyword_suggestion(text).to_string()
}
