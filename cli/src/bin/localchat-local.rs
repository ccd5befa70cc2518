use anyhow::Context;
use clap::Parser;
use colored::*;
use localchat_cli::cli::LocalArgs;
use localchat_cli::logging::{init_logging, stderr_is_terminal};
use localchat_cli::output::{print_local_banner, print_local_ready};
use localchat_cli::{ChatLoop, LocalBackend};
use localchat_core::{CandleGenerator, LocalChatConfig};
use log::error;
use std::io;
use std::sync::Arc;

/// Standalone tester - loads the model in-process and chats on stdin
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = LocalArgs::parse();

    let mut config =
        LocalChatConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(models_dir) = args.models_dir {
        config.model.models_dir = models_dir;
    }

    init_logging(&config.client.log_level);

    let location = config.model.models_dir.join(&config.model.gguf_file);
    print_local_banner(&mut io::stdout(), &location.display().to_string())?;

    let generator = match CandleGenerator::load(&config.model).await {
        Ok(generator) => generator,
        Err(e) => {
            error!("Failed to load model: {}", e);
            eprintln!("{}", format!("Failed to load model: {}", e).red());
            return Err(e.into());
        }
    };
    print_local_ready(&mut io::stdout())?;

    let options = config.local.generation_options(&config.generation);
    let backend = LocalBackend::new(Arc::new(generator), options);
    let mut chat = ChatLoop::new(backend)
        .with_history_window(config.local.history_window)
        .with_spinner(stderr_is_terminal());

    let stdin = io::stdin();
    chat.run(stdin.lock(), &mut io::stdout(), &mut io::stderr())
        .await
}
