use clap::Parser;
use localchat_core::LocalChatConfig;
use localchat_tools::fetch_model;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Download the chat model into the local models directory
#[derive(Parser, Debug)]
#[command(name = "fetch-model", about = "Download the localchat model files")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to download into
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = LocalChatConfig::load(args.config.as_deref())?;
    if let Some(models_dir) = args.models_dir {
        config.model.models_dir = models_dir;
    }

    info!("Starting model download to {}", config.model.models_dir.display());
    match fetch_model(&config.model) {
        Ok(paths) => {
            for path in &paths {
                info!("Ready: {}", path.display());
            }
            info!("Model downloaded successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Download failed: {:#}", e);
            Err(e)
        }
    }
}
