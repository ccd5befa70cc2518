use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::GenerationError;
use crate::types::{GenerationOptions, GenerationResult, Turn};

/// A text-generation backend: continues a conversation with new text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a continuation for `messages`, oldest turn first.
    async fn generate(
        &self,
        messages: &[Turn],
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError>;
}

/// Type alias for Arc-wrapped Generator trait objects
pub type GeneratorRef = Arc<dyn Generator>;
