//! Parsers for the response shapes the inference service is known to emit.
//!
//! The service answers one logical request in several JSON layouts (it
//! sometimes batches even a single input). Each layout has its own parser
//! returning `None` when the body does not match; callers walk the parser
//! table in order and keep the first hit.

use serde::Deserialize;

use crate::types::LabelScore;

/// JSON layout a response body was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A bare object.
    Single,
    /// A flat list.
    Flat,
    /// A list of lists; only the first inner list is used.
    Nested,
}

type LabelParser = fn(&str) -> Option<Vec<LabelScore>>;
type VectorParser = fn(&str) -> Option<Vec<f32>>;
type TextParser = fn(&str) -> Option<String>;

const LABEL_PARSERS: [(ResponseShape, LabelParser); 3] = [
    (ResponseShape::Single, parse_single_label),
    (ResponseShape::Flat, parse_flat_labels),
    (ResponseShape::Nested, parse_nested_labels),
];

const VECTOR_PARSERS: [(ResponseShape, VectorParser); 2] = [
    (ResponseShape::Flat, parse_flat_vector),
    (ResponseShape::Nested, parse_nested_vector),
];

const TEXT_PARSERS: [(ResponseShape, TextParser); 2] = [
    (ResponseShape::Flat, parse_flat_generation),
    (ResponseShape::Single, parse_single_generation),
];

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

/// Parse classifier output: single object, then flat list, then list-of-lists.
#[must_use]
pub fn parse_label_scores(body: &str) -> Option<(ResponseShape, Vec<LabelScore>)> {
    LABEL_PARSERS
        .iter()
        .find_map(|(shape, parse)| parse(body).map(|items| (*shape, items)))
}

/// Parse embedding output: flat vector, then list-of-vectors.
///
/// An empty vector is not a usable embedding and counts as unparsed.
#[must_use]
pub fn parse_embedding(body: &str) -> Option<(ResponseShape, Vec<f32>)> {
    VECTOR_PARSERS
        .iter()
        .find_map(|(shape, parse)| parse(body).map(|vector| (*shape, vector)))
}

/// Parse text-generation output: `[{"generated_text": ..}]` or the bare object.
#[must_use]
pub fn parse_generated_text(body: &str) -> Option<(ResponseShape, String)> {
    TEXT_PARSERS
        .iter()
        .find_map(|(shape, parse)| parse(body).map(|text| (*shape, text)))
}

fn parse_single_label(body: &str) -> Option<Vec<LabelScore>> {
    serde_json::from_str::<LabelScore>(body)
        .ok()
        .map(|item| vec![item])
}

fn parse_flat_labels(body: &str) -> Option<Vec<LabelScore>> {
    serde_json::from_str::<Vec<LabelScore>>(body).ok()
}

fn parse_nested_labels(body: &str) -> Option<Vec<LabelScore>> {
    serde_json::from_str::<Vec<Vec<LabelScore>>>(body)
        .ok()?
        .into_iter()
        .next()
}

fn parse_flat_vector(body: &str) -> Option<Vec<f32>> {
    serde_json::from_str::<Vec<f32>>(body)
        .ok()
        .filter(|v| !v.is_empty())
}

fn parse_nested_vector(body: &str) -> Option<Vec<f32>> {
    serde_json::from_str::<Vec<Vec<f32>>>(body)
        .ok()?
        .into_iter()
        .next()
        .filter(|v| !v.is_empty())
}

fn parse_flat_generation(body: &str) -> Option<String> {
    serde_json::from_str::<Vec<Generation>>(body)
        .ok()?
        .into_iter()
        .next()
        .map(|g| g.generated_text)
}

fn parse_single_generation(body: &str) -> Option<String> {
    serde_json::from_str::<Generation>(body)
        .ok()
        .map(|g| g.generated_text)
}
