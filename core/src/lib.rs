// Core localchat functionality:
// - Conversation turns and the bounded history window
// - Generation backends and the normalizer for their output
// - Wire types for the /chat endpoint
// - Configuration loading
// - Shared error types

pub mod types;
pub use types::*;

pub mod session;
pub use session::*;

pub mod normalize;
pub use normalize::extract_reply;

pub mod generator;
pub use generator::*;

pub mod template;

pub mod local_model;
pub use local_model::{select_device, CandleGenerator, ModelFiles};

pub mod protocol;
pub use protocol::{ChatRequest, ChatResponse, ErrorResponse};

pub mod config;
pub use config::*;

pub mod errors;
pub use errors::*;
