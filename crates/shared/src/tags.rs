//! Interest tag normalization.
//!
//! Profiles and events share one tag vocabulary. Tags are compared as
//! case-insensitive, whitespace-trimmed tokens, so every tag set is
//! normalized once on write and raw strings never reach a comparison.

use std::collections::HashSet;

/// Normalize a single tag token.
///
/// Trims surrounding whitespace and lowercases (Unicode-aware, so tokens
/// like "Schröder" normalize consistently). Returns `None` for tokens that
/// are empty after trimming.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Normalize a set of tag tokens.
///
/// Empty tokens are dropped and duplicates are collapsed. First-seen order
/// is preserved so stored arrays stay stable across rewrites.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in raw {
        if let Some(normalized) = normalize_tag(token.as_ref()) {
            if seen.insert(normalized.clone()) {
                out.push(normalized);
            }
        }
    }
    out
}

/// Count of tokens shared between two normalized tag sets.
pub fn overlap_count(a: &[String], b: &[String]) -> usize {
    let smaller: HashSet<&str> = if a.len() <= b.len() {
        a.iter().map(String::as_str).collect()
    } else {
        b.iter().map(String::as_str).collect()
    };
    let larger = if a.len() <= b.len() { b } else { a };
    larger
        .iter()
        .filter(|token| smaller.contains(token.as_str()))
        .count()
}
