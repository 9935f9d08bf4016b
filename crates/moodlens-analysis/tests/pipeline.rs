//! Orchestrator behaviour against in-memory inference and storage fakes.

mod support;

use std::sync::Arc;

use chrono::Utc;
use moodlens_analysis::embeddings::{fallback_embedding, EmbeddingProvider, EmbeddingSource};
use moodlens_analysis::text::fingerprint;
use moodlens_analysis::{
    analyze_plain, AnalysisResult, AnalysisSettings, LabelScore, MoodAnalyzer, SentimentLabel,
};
use support::{day, FakeInference, FakeStore};

const BREATHING: &str = "Try a 5-minute breathing exercise: breathe in for 4 counts, hold for 4, breathe out for 6. This can help calm your nervous system.";

fn small_settings() -> AnalysisSettings {
    AnalysisSettings {
        embedding_dim: 4,
        ..AnalysisSettings::default()
    }
}

fn analyzer(inference: FakeInference, store: &Arc<FakeStore>) -> MoodAnalyzer {
    MoodAnalyzer::new(Arc::new(inference), Arc::clone(store) as _, small_settings())
}

fn prior(emotions: &[(&str, f64)], suggestion: &str) -> AnalysisResult {
    AnalysisResult {
        overall_sentiment: SentimentLabel::Negative,
        sentiment_score: -0.6,
        emotions: emotions
            .iter()
            .map(|(label, score)| LabelScore::new(*label, *score))
            .collect(),
        summary: "Overall sentiment: Negative.".to_string(),
        suggestion: suggestion.to_string(),
        analyzed_at: Utc::now(),
    }
}

#[tokio::test]
async fn unreachable_service_yields_neutral_keyword_analysis() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Exam", "I feel so anxious about my exam tomorrow", day(1));
    let analyzer = analyzer(FakeInference::unavailable(), &store);

    let result = analyzer
        .analyze_entry(1)
        .await
        .expect("analysis should not fail")
        .expect("entry exists");

    assert_eq!(result.overall_sentiment, SentimentLabel::Neutral);
    assert_eq!(result.sentiment_score, 0.0);
    assert!(result.emotions.is_empty());
    assert_eq!(result.summary, "Overall sentiment: Neutral.");
    assert_eq!(result.suggestion, BREATHING);
    assert_eq!(store.analysis(1), Some(result));

    let embedding = store.embedding(1).expect("fallback embedding is stored");
    assert_eq!(embedding.vector.len(), 4);
    assert_eq!(embedding.content_fingerprint, fingerprint("Exam I feel so anxious about my exam tomorrow"));
}

#[tokio::test]
async fn plain_analysis_without_store_matches_keyword_tier() {
    let inference = FakeInference::unavailable();
    let result = analyze_plain(&inference, "I feel so anxious about my exam tomorrow").await;

    assert_eq!(result.overall_sentiment, SentimentLabel::Neutral);
    assert_eq!(result.suggestion, BREATHING);
}

#[tokio::test]
async fn suggestion_is_never_empty() {
    let inference = FakeInference {
        generation: Some("ok\n\n".to_string()),
        ..FakeInference::default()
    };
    for text in ["", "   ", "x", "nothing much happened at all today, just errands"] {
        let result = analyze_plain(&inference, text).await;
        assert!(!result.suggestion.trim().is_empty(), "empty suggestion for {text:?}");
    }
}

#[tokio::test]
async fn classifier_results_flow_into_summary() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Weekend", "Hiked with friends", day(1));
    let inference = FakeInference {
        sentiment: Some(vec![
            LabelScore::new("Very Positive", 0.88),
            LabelScore::new("Neutral", 0.1),
        ]),
        emotions: Some(vec![LabelScore::new("joy", 0.92), LabelScore::new("surprise", 0.05)]),
        generation: Some("Plan another hike with the same friends next month".to_string()),
        ..FakeInference::default()
    };

    let result = analyzer(inference, &store)
        .analyze_entry(1)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.overall_sentiment, SentimentLabel::Positive);
    assert!((result.sentiment_score - 0.88).abs() < 1e-9);
    assert_eq!(
        result.summary,
        "Overall sentiment: Positive. Primary emotion: Joy (92.0% confidence)."
    );
    assert_eq!(
        result.suggestion,
        "Plan another hike with the same friends next month."
    );
}

#[tokio::test]
async fn reanalysis_replaces_the_previous_result() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Monday", "Work was fine", day(1));

    let first = FakeInference {
        sentiment: Some(vec![LabelScore::new("positive", 0.9)]),
        ..FakeInference::default()
    };
    analyzer(first, &store).analyze_entry(1).await.unwrap();

    store.set_text(1, "Work was awful");
    let second = FakeInference {
        sentiment: Some(vec![LabelScore::new("negative", 0.7)]),
        ..FakeInference::default()
    };
    analyzer(second, &store).analyze_entry(1).await.unwrap();

    assert_eq!(store.analysis_count(), 1);
    assert_eq!(store.embedding_count(), 1);
    let stored = store.analysis(1).unwrap();
    assert_eq!(stored.overall_sentiment, SentimentLabel::Negative);
    assert!((stored.sentiment_score + 0.7).abs() < 1e-9);
    assert_eq!(
        store.embedding(1).unwrap().content_fingerprint,
        fingerprint("Monday Work was awful")
    );
}

#[tokio::test]
async fn similar_prior_entry_suggestion_is_reused() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Lonely", "Missing my family", day(1));
    store.put_embedding(1, vec![0.9, 0.1, 0.0, 0.0], "old");
    store.put_analysis(1, prior(&[("sadness", 0.8)], "Call your sister."));
    store.add_entry(2, 7, "Again", "Missing home a lot", day(2));

    let inference = FakeInference {
        emotions: Some(vec![LabelScore::new("sadness", 0.7)]),
        embedding: Some(vec![1.0, 0.0, 0.0, 0.0]),
        ..FakeInference::default()
    };

    let result = analyzer(inference, &store)
        .analyze_entry(2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        result.suggestion,
        "Previously, you found this helpful: Call your sister."
    );
    assert_eq!(
        result.summary,
        "Overall sentiment: Neutral. Primary emotion: Sadness (70.0% confidence). \
         This aligns with your typical sadness patterns. \
         This entry is similar to previous experiences you've written about."
    );
}

#[tokio::test]
async fn coping_strategy_is_used_when_no_similar_suggestion_qualifies() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Storm", "Thunder kept me up", day(1));
    store.put_embedding(1, vec![0.0, 1.0, 0.0, 0.0], "old");
    store.put_analysis(1, prior(&[("fear", 0.9)], "Close the curtains."));
    store.add_entry(2, 7, "Commute", "Bus was late", day(2));

    let inference = FakeInference {
        embedding: Some(vec![1.0, 0.0, 0.0, 0.0]),
        ..FakeInference::default()
    };

    let result = analyzer(inference, &store)
        .analyze_entry(2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        result.suggestion,
        "Practice deep breathing exercises when feeling anxious"
    );
    assert_eq!(result.summary, "Overall sentiment: Neutral.");
}

#[tokio::test]
async fn entry_is_never_its_own_similar_entry() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Quiet", "A quiet afternoon reading", day(1));
    store.put_embedding(1, vec![1.0, 0.0, 0.0, 0.0], "stale");
    store.put_analysis(1, prior(&[], "Read another chapter."));

    let inference = FakeInference {
        embedding: Some(vec![1.0, 0.0, 0.0, 0.0]),
        ..FakeInference::default()
    };

    let result = analyzer(inference, &store)
        .analyze_entry(1)
        .await
        .unwrap()
        .unwrap();

    assert!(!result.suggestion.starts_with("Previously"));
    assert_eq!(
        result.suggestion,
        "Practice mindfulness and self-reflection through journaling"
    );
    assert!(!result.summary.contains("similar to previous experiences"));
}

#[tokio::test]
async fn unchanged_text_reuses_stored_embedding() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Walk", "Long walk by the river", day(1));
    store.put_embedding(
        1,
        vec![0.5, 0.5, 0.5, 0.5],
        &fingerprint("Walk Long walk by the river"),
    );

    let inference = Arc::new(FakeInference {
        embedding: Some(vec![1.0, 0.0, 0.0, 0.0]),
        ..FakeInference::default()
    });
    let analyzer = MoodAnalyzer::new(
        Arc::clone(&inference) as _,
        Arc::clone(&store) as _,
        small_settings(),
    );

    analyzer.analyze_entry(1).await.unwrap();
    assert_eq!(inference.embed_calls(), 0);
    assert_eq!(store.embedding(1).unwrap().vector, vec![0.5, 0.5, 0.5, 0.5]);

    store.set_text(1, "Short walk in the rain");
    analyzer.analyze_entry(1).await.unwrap();
    assert_eq!(inference.embed_calls(), 1);
    assert_eq!(store.embedding(1).unwrap().vector, vec![1.0, 0.0, 0.0, 0.0]);
}

#[tokio::test]
async fn retrieval_failure_degrades_to_plain_mode() {
    let store = Arc::new(FakeStore::failing_embeddings());
    store.add_entry(1, 7, "Night", "So tired after the late shift", day(1));
    store.put_analysis(1, prior(&[("sadness", 0.9)], "Old advice."));

    let inference = FakeInference {
        emotions: Some(vec![LabelScore::new("sadness", 0.6)]),
        ..FakeInference::default()
    };

    let result = analyzer(inference, &store)
        .analyze_entry(1)
        .await
        .unwrap()
        .unwrap();

    assert!(result.suggestion.starts_with("Focus on getting quality rest tonight."));
    assert_eq!(
        result.summary,
        "Overall sentiment: Neutral. Primary emotion: Sadness (60.0% confidence)."
    );

    let embedding = store
        .embedding(1)
        .expect("embedding is stored even when the lookup fails");
    assert_eq!(embedding.vector.len(), 4);
    assert_eq!(
        embedding.content_fingerprint,
        fingerprint("Night So tired after the late shift")
    );
}

#[tokio::test]
async fn remote_embedding_of_wrong_width_is_replaced_by_fallback() {
    let provider = EmbeddingProvider::new(
        Arc::new(FakeInference {
            embedding: Some(vec![1.0, 0.0, 0.0]),
            ..FakeInference::default()
        }),
        4,
    );

    let embedding = provider.embed("calm walk by the river").await;

    assert_eq!(embedding.source, EmbeddingSource::Fallback);
    assert_eq!(embedding.vector, fallback_embedding("calm walk by the river", 4));
}

#[tokio::test]
async fn stored_embedding_always_has_configured_width() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "Walk", "Calm walk by the river", day(1));
    let inference = FakeInference {
        embedding: Some(vec![1.0, 0.0, 0.0]),
        ..FakeInference::default()
    };

    analyzer(inference, &store).analyze_entry(1).await.unwrap();

    let embedding = store.embedding(1).expect("embedding is stored");
    assert_eq!(
        embedding.vector,
        fallback_embedding("Walk Calm walk by the river", 4)
    );
}

#[tokio::test]
async fn missing_entry_is_skipped_without_writes() {
    let store = Arc::new(FakeStore::default());
    let outcome = analyzer(FakeInference::unavailable(), &store)
        .analyze_entry(42)
        .await
        .expect("missing entry is not an error");

    assert!(outcome.is_none());
    assert_eq!(store.analysis_count(), 0);
    assert_eq!(store.embedding_count(), 0);
}

#[tokio::test]
async fn user_patterns_are_mined_from_history() {
    let store = Arc::new(FakeStore::default());
    store.add_entry(1, 7, "a", "a", day(1));
    store.add_entry(2, 7, "b", "b", day(2));
    store.add_entry(3, 8, "c", "c", day(3));
    store.put_analysis(1, prior(&[("anger", 0.8)], ""));
    store.put_analysis(2, prior(&[("anger", 0.6), ("joy", 0.4)], ""));
    store.put_analysis(3, prior(&[("fear", 0.9)], ""));

    let patterns = analyzer(FakeInference::unavailable(), &store)
        .user_patterns(7)
        .await
        .unwrap();

    assert_eq!(patterns.analyzed_count, 2);
    assert_eq!(patterns.common_emotions[0].label, "anger");
    assert!((patterns.common_emotions[0].score - 1.0).abs() < 1e-9);
    assert!(!patterns.has_common_emotion("fear"));
    assert_eq!(
        patterns.coping_strategies,
        vec![
            "Try physical exercise or journaling to release tension",
            "Continue doing activities that bring you happiness",
        ]
    );
}
