use anyhow::Context;
use clap::Parser;
use localchat_cli::cli::ClientArgs;
use localchat_cli::logging::{init_logging, stderr_is_terminal};
use localchat_cli::output::print_client_banner;
use localchat_cli::{ChatLoop, ServerClient};
use localchat_core::LocalChatConfig;
use log::info;
use std::io;

/// Main function - reads turns from stdin and sends them to the chat server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = ClientArgs::parse();

    let mut config =
        LocalChatConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = args.url {
        config.client.endpoint_url = url;
    }

    init_logging(&config.client.log_level);

    let client = ServerClient::new(config.client.endpoint_url.clone());
    print_client_banner(&mut io::stdout(), client.endpoint())?;

    let mut chat = ChatLoop::new(client)
        .with_history_window(config.client.history_window)
        .with_spinner(stderr_is_terminal());

    let stdin = io::stdin();
    chat.run(stdin.lock(), &mut io::stdout(), &mut io::stderr())
        .await?;

    info!("Chat ended after {} turns", chat.session().len());
    Ok(())
}
