use serde::{Deserialize, Serialize};

use crate::types::Turn;

/// Body of `POST /chat`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChatRequest {
    /// Conversation window to continue, oldest turn first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Turn>>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Turn>) -> Self {
        Self {
            messages: Some(messages),
        }
    }
}

/// Successful reply from `POST /chat`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

/// Error body returned with every non-2xx status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
