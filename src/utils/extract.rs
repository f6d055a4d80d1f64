//! Structured-output extraction
//!
//! Generation output is supposed to be a JSON object but frequently arrives
//! wrapped in markdown fences or surrounded by prose. [`extract`] recovers the
//! object using three strategies, in order:
//!
//! 1. Parse the whole text as a JSON object.
//! 2. Parse the contents of the first fenced block (```` ``` ```` or ```` ```json ````).
//! 3. Parse the first balanced `{ ... }` span starting at the first `{`.
//!
//! Extraction never retries on its own; callers decide whether to regenerate.

use crate::types::{Document, ExtractionError};
use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*\n([\s\S]*?)\n```").expect("fenced block pattern is valid")
});

/// Recover a JSON object from arbitrary generation output.
pub fn extract(text: &str) -> Result<Document, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    if let Ok(doc) = serde_json::from_str::<Document>(text) {
        return Ok(doc);
    }

    if let Some(block) = FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        if let Ok(doc) = serde_json::from_str::<Document>(block.as_str()) {
            return Ok(doc);
        }
    }

    let span = balanced_object_span(text)?;
    serde_json::from_str::<Document>(span)
        .map_err(|e| ExtractionError::InvalidObject(e.to_string()))
}

/// The first balanced `{ ... }` span beginning at the first `{`.
///
/// Braces inside string literals do not count towards nesting depth. A scan
/// that runs off the end inside a string literal is an invalid object; one
/// that runs off with unclosed braces found no object at all.
fn balanced_object_span(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoObjectFound)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    if in_string {
        return Err(ExtractionError::InvalidObject(
            "unterminated string literal".to_string(),
        ));
    }
    Err(ExtractionError::NoObjectFound)
}
