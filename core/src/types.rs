use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";
pub const ROLE_SYSTEM: &str = "system";

/// One role-tagged utterance in a conversation.
///
/// Roles are free-form strings; `user` and `assistant` are the conventional
/// values but nothing rejects others. A missing role decodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }
}

/// Generation configuration options passed to a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub max_new_tokens: usize,
    pub temperature: f64,
    pub do_sample: bool,
    /// When set, the backend echoes the whole dialogue instead of only the
    /// new continuation.
    pub return_full_text: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.7,
            do_sample: true,
            return_full_text: false,
        }
    }
}

/// The `generated_text` payload of a backend record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedText {
    Plain(String),
    Dialogue(Vec<Turn>),
}

/// One record of backend output. Fields other than `generated_text` are kept
/// alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<GeneratedText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeneratedRecord {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            generated_text: Some(GeneratedText::Plain(text.into())),
            extra: Map::new(),
        }
    }

    pub fn dialogue(turns: Vec<Turn>) -> Self {
        Self {
            generated_text: Some(GeneratedText::Dialogue(turns)),
            extra: Map::new(),
        }
    }
}

/// Raw output of a generation backend.
///
/// Backends answer with a bare string, a single record, a list of records,
/// or something else entirely. Variant order matters for untagged decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Text(String),
    Records(Vec<GeneratedRecord>),
    Record(GeneratedRecord),
    Other(Value),
}

/// Decodes backend JSON. A value that carries no reply is kept verbatim as
/// `Other`, so the fallback shows exactly what the backend sent.
impl From<Value> for GenerationResult {
    fn from(value: Value) -> Self {
        match serde_json::from_value::<GenerationResult>(value.clone()) {
            Ok(decoded) if crate::normalize::find_reply(&decoded).is_some() => decoded,
            _ => GenerationResult::Other(value),
        }
    }
}
