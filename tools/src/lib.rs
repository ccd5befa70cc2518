//! Download helpers for populating the local models directory.

use anyhow::{Context, Result};
use hf_hub::api::sync::ApiBuilder;
use localchat_core::local_model::TOKENIZER_FILE;
use localchat_core::{ModelConfig, ModelFiles};
use std::path::PathBuf;
use tracing::info;

/// One file to fetch from the Hugging Face hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub repo: String,
    pub file: String,
}

/// Files the generator needs, weights first
pub fn planned_downloads(config: &ModelConfig) -> Vec<Download> {
    vec![
        Download {
            repo: config.repo.clone(),
            file: config.gguf_file.clone(),
        },
        Download {
            repo: config.tokenizer_repo.clone(),
            file: TOKENIZER_FILE.to_string(),
        },
    ]
}

/// Fetch every planned file into `models_dir`, reusing anything already cached.
pub fn fetch_model(config: &ModelConfig) -> Result<Vec<PathBuf>> {
    if let Ok(files) = ModelFiles::resolve(config) {
        info!("Model already present in {}", config.models_dir.display());
        return Ok(vec![files.weights, files.tokenizer]);
    }

    std::fs::create_dir_all(&config.models_dir).with_context(|| {
        format!(
            "Failed to create models directory {}",
            config.models_dir.display()
        )
    })?;

    let api = ApiBuilder::new()
        .with_cache_dir(config.models_dir.clone())
        .with_progress(true)
        .build()
        .context("Failed to initialize Hugging Face Hub API")?;

    let mut paths = Vec::new();
    for download in planned_downloads(config) {
        info!(repo = %download.repo, file = %download.file, "Downloading");
        let path = api
            .model(download.repo.clone())
            .get(&download.file)
            .with_context(|| {
                format!(
                    "Failed to download '{}' from '{}'",
                    download.file, download.repo
                )
            })?;
        paths.push(path);
    }

    Ok(paths)
}
