//! Extraction of a JSON array from free-form model output.
//!
//! Models asked for "just the raw JSON array" still wrap it in prose or a
//! markdown code block now and then. Extraction strips the fences, takes the
//! greedy span from the first `[` to the last `]`, and parses it. Invalid JSON
//! is reported, never repaired.

use serde_json::Value;
use thiserror::Error;

const LANGUAGE_FENCE: &str = "```json";
const FENCE: &str = "```";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no JSON array found in upstream text")]
    NoArrayFound,

    #[error("malformed JSON array: {source}")]
    MalformedJson {
        /// The bracketed span that failed to parse.
        candidate: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Extract the embedded array. Elements are passed through untouched.
pub fn extract(raw: &str) -> Result<Vec<Value>, ExtractError> {
    let cleaned = strip_code_fences(raw);
    let candidate = array_span(&cleaned).ok_or(ExtractError::NoArrayFound)?;

    serde_json::from_str(candidate).map_err(|source| ExtractError::MalformedJson {
        candidate: candidate.to_string(),
        source,
    })
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace(LANGUAGE_FENCE, "")
        .replace(FENCE, "")
        .trim()
        .to_string()
}

/// First `[` through the last `]` after it, newlines included.
fn array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
