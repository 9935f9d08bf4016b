//! Entry embeddings: remote service first, deterministic local vector otherwise.

use std::collections::BTreeMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::inference::InferenceService;
use crate::text::normalize;

/// Weight added per token occurrence in the fallback vector.
const FALLBACK_TOKEN_WEIGHT: f32 = 0.1;

/// Hash bytes are consumed one per stride of this many dimensions.
const FALLBACK_STRIDE: usize = 32;

/// Which path produced an embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingSource {
    Remote,
    Fallback,
}

/// An embedding plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub source: EmbeddingSource,
}

/// Produces fixed-width embeddings, never failing.
#[derive(Clone)]
pub struct EmbeddingProvider {
    inference: Arc<dyn InferenceService>,
    dim: usize,
}

impl EmbeddingProvider {
    #[must_use]
    pub fn new(inference: Arc<dyn InferenceService>, dim: usize) -> Self {
        Self { inference, dim }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed `text` with the remote service, falling back to
    /// [`fallback_embedding`] on any error or unparseable response.
    ///
    /// A remote vector of the wrong width counts as unparseable; the result
    /// always has exactly [`dim`](Self::dim) components.
    pub async fn embed(&self, text: &str) -> Embedding {
        match self.inference.embed(text).await {
            Ok(vector) if vector.len() == self.dim => Embedding {
                vector,
                source: EmbeddingSource::Remote,
            },
            Ok(vector) => {
                tracing::warn!(
                    expected = self.dim,
                    got = vector.len(),
                    "remote embedding has wrong width, using local fallback"
                );
                self.fallback(text)
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote embedding failed, using local fallback");
                self.fallback(text)
            }
        }
    }

    fn fallback(&self, text: &str) -> Embedding {
        Embedding {
            vector: fallback_embedding(text, self.dim),
            source: EmbeddingSource::Fallback,
        }
    }
}

/// Deterministic hash-projection embedding of width `dim`.
///
/// Token frequencies come from [`normalize`]. Each distinct token is hashed
/// with SHA-256 and `frequency * 0.1` is added at `dim / 32` (at least one)
/// positions, each picked by one hash byte modulo `dim`. The result is
/// L2-normalized unless it is all zeros. Tokens are visited in sorted order
/// so the floating-point sums are identical on every call.
#[must_use]
pub fn fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
    let mut vector = vec![0.0_f32; dim];
    if dim == 0 {
        return vector;
    }

    let mut frequencies: BTreeMap<String, u32> = BTreeMap::new();
    for token in normalize(text) {
        *frequencies.entry(token).or_insert(0) += 1;
    }

    let positions = (dim / FALLBACK_STRIDE).max(1);
    for (token, frequency) in &frequencies {
        let hash = Sha256::digest(token.as_bytes());
        #[allow(clippy::cast_precision_loss)]
        let weight = *frequency as f32 * FALLBACK_TOKEN_WEIGHT;
        for k in 0..positions {
            let idx = usize::from(hash[k % hash.len()]) % dim;
            vector[idx] += weight;
        }
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn fallback_is_deterministic() {
        let text = "I feel so anxious about my exam tomorrow";
        assert_eq!(fallback_embedding(text, 384), fallback_embedding(text, 384));
    }

    #[test]
    fn fallback_has_requested_width() {
        assert_eq!(fallback_embedding("hello world", 384).len(), 384);
        assert_eq!(fallback_embedding("hello world", 16).len(), 16);
    }

    #[test]
    fn fallback_is_unit_length() {
        let v = fallback_embedding("walked the dog and felt better", 384);
        assert!((l2(&v) - 1.0).abs() < 1e-5, "norm was {}", l2(&v));
    }

    #[test]
    fn fallback_of_empty_text_is_zero_vector() {
        let v = fallback_embedding("", 384);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn fallback_of_only_short_tokens_is_zero_vector() {
        let v = fallback_embedding("a an to of", 64);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn fallback_ignores_case_and_punctuation() {
        assert_eq!(
            fallback_embedding("Happy, happy day!", 384),
            fallback_embedding("happy happy DAY", 384)
        );
    }

    #[test]
    fn fallback_differs_for_different_text() {
        assert_ne!(
            fallback_embedding("quiet morning coffee", 384),
            fallback_embedding("loud argument tonight", 384)
        );
    }

    #[test]
    fn fallback_with_zero_width_is_empty() {
        assert!(fallback_embedding("anything at all", 0).is_empty());
    }
}
