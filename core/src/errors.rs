use thiserror::Error;

/// Errors shared by the localchat crates
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Model Error: {0}")]
    ModelError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for localchat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Failures raised by a generation backend while producing a reply
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Tokenizer Error: {0}")]
    Tokenizer(String),

    #[error("Inference Error: {0}")]
    Inference(String),

    #[error("Generation task failed: {0}")]
    Task(String),
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::Inference(err.to_string())
    }
}

impl From<tokenizers::Error> for GenerationError {
    fn from(err: tokenizers::Error) -> Self {
        GenerationError::Tokenizer(err.to_string())
    }
}

impl From<tokio::task::JoinError> for GenerationError {
    fn from(err: tokio::task::JoinError) -> Self {
        GenerationError::Task(err.to_string())
    }
}
