//! Text normalization and content fingerprinting.

use sha2::{Digest, Sha256};

/// Characters stripped from both ends of every token.
const TRIM_CHARS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Tokens of this many characters or fewer are dropped.
const MIN_TOKEN_CHARS: usize = 2;

/// Split text into lowercase tokens, trimming surrounding punctuation and
/// discarding tokens of two characters or fewer.
///
/// Empty input yields an empty sequence.
#[must_use]
pub fn normalize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(TRIM_CHARS))
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// The canonical form of `text`: normalized tokens joined by single spaces.
#[must_use]
pub fn canonical_text(text: &str) -> String {
    normalize(text).join(" ")
}

/// Hex-encoded SHA-256 of the canonical form of `text`.
///
/// Two texts that differ only in case, spacing, punctuation or short words
/// share a fingerprint.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(canonical_text(text).as_bytes());
    format!("{digest:x}")
}

/// `s` with its first character uppercased.
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
