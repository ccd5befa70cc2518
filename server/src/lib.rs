//! HTTP daemon exposing the `/chat` endpoint over a local generator.

pub mod http_server;
pub mod state;

pub use state::{AppState, GeneratorState, ModelHandle};
