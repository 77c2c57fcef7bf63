//! Pull a JSON object out of free-form model output.
//!
//! Models prepend commentary, wrap JSON in markdown fences, or trail off with
//! notes. Extraction locates a candidate span; a strict serde parse of that
//! span always follows (`parse_json_object`), so over-capture surfaces as an
//! `Invalid` error rather than silently wrong data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How aggressively to search for the JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// The whole (trimmed) text must be the object.
    Strict,
    /// Bracket-depth scan from the first `{`, aware of strings and escapes.
    /// Falls back to `Greedy` when the object never closes.
    #[default]
    Balanced,
    /// First `{` to last `}`. Over-captures when several objects are present.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsonExtractError {
    #[error("no JSON object found in text")]
    NotFound,
    #[error("captured span is not valid JSON: {0}")]
    Invalid(String),
}

/// First `{` through last `}`; `None` when there is no such span.
pub fn extract_first_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn extract_json_object(text: &str, mode: ExtractionMode) -> Option<&str> {
    match mode {
        ExtractionMode::Strict => {
            let trimmed = text.trim();
            (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
        }
        ExtractionMode::Balanced => balanced_object(text).or_else(|| extract_first_json(text)),
        ExtractionMode::Greedy => extract_first_json(text),
    }
}

/// Extract with `mode`, then parse the captured span strictly.
pub fn parse_json_object<T: DeserializeOwned>(
    text: &str,
    mode: ExtractionMode,
) -> Result<T, JsonExtractError> {
    let span = extract_json_object(text, mode).ok_or(JsonExtractError::NotFound)?;
    serde_json::from_str(span).map_err(|e| JsonExtractError::Invalid(e.to_string()))
}

fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
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
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
