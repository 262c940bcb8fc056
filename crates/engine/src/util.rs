//! Internal helpers for text validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every entry point enforces the same invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim a required text field and collapse internal whitespace runs.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let mut out = String::with_capacity(value.len());
    for token in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    Ok(out)
}

/// Fold text into a comparison key for case-insensitive matching.
///
/// Applies NFKC so composed and decomposed forms (or full-width letters)
/// compare equal, then lowercases.
pub(crate) fn search_key(value: &str) -> String {
    value.nfkc().flat_map(char::to_lowercase).collect()
}
