use anyhow::Context;
use clap::Parser;
use localchat_core::{CandleGenerator, GeneratorRef, LocalChatConfig};
use localchat_server::http_server;
use localchat_server::{AppState, ModelHandle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "localchat-server", about = "Serves a local chat model over HTTP")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server address
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding the downloaded model
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config =
        LocalChatConfig::load(args.config.as_deref()).context("Configuration error")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(models_dir) = args.models_dir {
        config.model.models_dir = models_dir;
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_addr))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    // Requests are answered with 503 until the model is ready
    let state = AppState::new(ModelHandle::new(), config.generation.clone());

    info!(
        "Loading model from: {}",
        config.model.models_dir.join(&config.model.gguf_file).display()
    );
    let load = async {
        CandleGenerator::load(&config.model)
            .await
            .map(|generator| Arc::new(generator) as GeneratorRef)
    };

    http_server::run_server(listener, state, load, http_server::shutdown_signal()).await?;
    info!("localchat server shutting down");
    Ok(())
}
