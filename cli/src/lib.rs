// Console clients for localchat:
// - `localchat` talks to the server over HTTP
// - `localchat-local` runs the model in-process

pub mod app;
pub mod backend;
pub mod cli;
pub mod logging;
pub mod output;
pub mod server_client;

pub use app::ChatLoop;
pub use backend::{ChatBackend, ExchangeError, LocalBackend};
pub use server_client::ServerClient;
