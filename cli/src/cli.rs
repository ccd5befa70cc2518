use clap::Parser;
use std::path::PathBuf;

/// Chat with a running localchat server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ClientArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Chat endpoint URL
    #[arg(long, env = "LOCALCHAT_URL")]
    pub url: Option<String>,
}

/// Chat with the model in-process, without a server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct LocalArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the downloaded model
    #[arg(long)]
    pub models_dir: Option<PathBuf>,
}
