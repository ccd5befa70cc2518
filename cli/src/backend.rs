use async_trait::async_trait;
use localchat_core::{extract_reply, GenerationError, GenerationOptions, GeneratorRef, Turn};
use thiserror::Error;

/// Hint printed after a failed connection to the chat server
pub const SERVER_HINT: &str = "Is the server running? (localchat-server)";

/// Why a single exchange produced no reply
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Error generating response: {0}")]
    Generation(#[from] GenerationError),
}

impl ExchangeError {
    /// Extra guidance for the user, if any applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ExchangeError::Connection(_) => Some(SERVER_HINT),
            _ => None,
        }
    }
}

/// Something that turns a conversation window into the assistant's reply
#[async_trait]
pub trait ChatBackend {
    async fn exchange(&self, window: &[Turn]) -> Result<String, ExchangeError>;
}

/// Runs the generator in-process
pub struct LocalBackend {
    generator: GeneratorRef,
    options: GenerationOptions,
}

impl LocalBackend {
    pub fn new(generator: GeneratorRef, options: GenerationOptions) -> Self {
        Self { generator, options }
    }
}

#[async_trait]
impl ChatBackend for LocalBackend {
    async fn exchange(&self, window: &[Turn]) -> Result<String, ExchangeError> {
        let result = self.generator.generate(window, &self.options).await?;
        Ok(extract_reply(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localchat_core::{GeneratedRecord, GenerationResult, Generator};
    use std::sync::Arc;

    /// Echoes the whole dialogue back, as a backend returning full text would
    struct FullText;

    #[async_trait]
    impl Generator for FullText {
        async fn generate(
            &self,
            messages: &[Turn],
            options: &GenerationOptions,
        ) -> Result<GenerationResult, GenerationError> {
            let mut dialogue = messages.to_vec();
            dialogue.push(Turn::assistant(format!("{} tokens max", options.max_new_tokens)));
            Ok(GenerationResult::Records(vec![GeneratedRecord::dialogue(dialogue)]))
        }
    }

    struct Failing;

    #[async_trait]
    impl Generator for Failing {
        async fn generate(
            &self,
            _messages: &[Turn],
            _options: &GenerationOptions,
        ) -> Result<GenerationResult, GenerationError> {
            Err(GenerationError::Tokenizer("bad input".to_string()))
        }
    }

    #[tokio::test]
    async fn test_local_backend_normalizes_dialogue() {
        let options = GenerationOptions {
            max_new_tokens: 128,
            ..GenerationOptions::default()
        };
        let backend = LocalBackend::new(Arc::new(FullText), options);

        let reply = backend.exchange(&[Turn::user("hi")]).await.unwrap();
        assert_eq!(reply, "128 tokens max");
    }

    #[tokio::test]
    async fn test_local_backend_surfaces_generation_error() {
        let backend = LocalBackend::new(Arc::new(Failing), GenerationOptions::default());
        let err = backend.exchange(&[Turn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Generation(_)));
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_only_connection_errors_carry_hint() {
        let refused = ExchangeError::Connection("connection refused".to_string());
        assert_eq!(refused.hint(), Some(SERVER_HINT));

        let http = ExchangeError::Http {
            status_code: 503,
            message: "loading".to_string(),
        };
        assert_eq!(http.to_string(), "Error: 503 - loading");
        assert!(http.hint().is_none());
    }
}
