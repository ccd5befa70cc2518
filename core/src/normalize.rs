//! Reduces the heterogeneous output of a generation backend to one reply string.

use crate::types::{GeneratedRecord, GeneratedText, GenerationResult};

/// Extract the assistant's newest contribution from a backend result.
///
/// A list is read through its first record, a bare record is read directly.
/// A dialogue yields the content of its last turn, plain text is used as-is.
/// Anything else (no `generated_text`, an empty string or dialogue, an
/// unknown shape) falls back to the JSON serialization of the whole result,
/// so the caller always has something visible to show.
pub fn extract_reply(result: &GenerationResult) -> String {
    find_reply(result).unwrap_or_else(|| serialize_fallback(result))
}

/// The reply carried by `result`, if it has one
pub(crate) fn find_reply(result: &GenerationResult) -> Option<String> {
    match result {
        GenerationResult::Text(text) => non_empty(text),
        GenerationResult::Records(records) => records.first().and_then(reply_from_record),
        GenerationResult::Record(record) => reply_from_record(record),
        GenerationResult::Other(_) => None,
    }
}

fn reply_from_record(record: &GeneratedRecord) -> Option<String> {
    match record.generated_text.as_ref()? {
        GeneratedText::Dialogue(turns) => turns.last().map(|turn| turn.content.clone()),
        GeneratedText::Plain(text) => non_empty(text),
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn serialize_fallback(result: &GenerationResult) -> String {
    let serialized = match result {
        GenerationResult::Other(raw) => serde_json::to_string(raw),
        _ => serde_json::to_string(result),
    };
    match serialized {
        Ok(json) => json,
        Err(_) => format!("{:?}", result),
    }
}
