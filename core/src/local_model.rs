//! Local inference backend: runs a GGUF-quantized Gemma 3 model through candle.
//!
//! Weights and tokenizer are read from the models directory only. Nothing is
//! downloaded here; `fetch-model` populates the directory beforehand.

use async_trait::async_trait;
use candle_core::quantized::gguf_file;
use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::quantized_gemma3::ModelWeights;
use hf_hub::Cache;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::config::{DevicePreference, ModelConfig};
use crate::errors::{ChatError, ChatResult, GenerationError};
use crate::generator::Generator;
use crate::template;
use crate::types::{GeneratedRecord, GenerationOptions, GenerationResult, Turn};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Resolved on-disk locations of the model weights and tokenizer
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelFiles {
    /// Find the model files without touching the network.
    ///
    /// Files placed directly in `models_dir` win; otherwise the Hugging Face
    /// cache layout written by `fetch-model` is searched.
    pub fn resolve(config: &ModelConfig) -> ChatResult<Self> {
        let weights = locate(&config.models_dir, &config.repo, &config.gguf_file)?;
        let tokenizer = locate(&config.models_dir, &config.tokenizer_repo, TOKENIZER_FILE)?;
        Ok(Self { weights, tokenizer })
    }
}

fn locate(models_dir: &Path, repo: &str, file: &str) -> ChatResult<PathBuf> {
    let direct = models_dir.join(file);
    if direct.is_file() {
        return Ok(direct);
    }

    Cache::new(models_dir.to_path_buf())
        .model(repo.to_string())
        .get(file)
        .ok_or_else(|| {
            ChatError::ModelError(format!(
                "Local file missing: '{}' from '{}' not found under {}. Run `fetch-model` first.",
                file,
                repo,
                models_dir.display()
            ))
        })
}

/// Pick the device to run on, falling back to CPU when an accelerator is unusable
pub fn select_device(preference: DevicePreference) -> Device {
    if preference == DevicePreference::Cpu {
        return Device::Cpu;
    }

    if candle_core::utils::cuda_is_available() {
        match Device::new_cuda(0) {
            Ok(device) => return device,
            Err(e) => warn!(error = %e, "CUDA reported available but failed to initialize"),
        }
    } else if candle_core::utils::metal_is_available() {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(e) => warn!(error = %e, "Metal reported available but failed to initialize"),
        }
    }

    Device::Cpu
}

/// The loaded model state (tokenizer + weights + device)
struct LocalModel {
    model: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
    eos_token_ids: Vec<u32>,
}

impl LocalModel {
    fn load(files: &ModelFiles, preference: DevicePreference) -> ChatResult<Self> {
        let device = select_device(preference);
        info!(path = %files.weights.display(), device = ?device, "Loading local GGUF model");

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| ChatError::ModelError(format!("Failed to load tokenizer: {}", e)))?;

        let mut file = std::fs::File::open(&files.weights)?;
        let gguf = gguf_file::Content::read(&mut file)
            .map_err(|e| ChatError::ModelError(format!("Failed to parse GGUF file: {}", e)))?;
        let model = ModelWeights::from_gguf(gguf, &mut file, &device)
            .map_err(|e| ChatError::ModelError(format!("Failed to load model weights: {}", e)))?;

        let eos_token_ids: Vec<u32> = [template::END_OF_TURN, "<eos>"]
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();
        if eos_token_ids.is_empty() {
            warn!("Tokenizer has no end-of-turn token, generation stops only at max_new_tokens");
        }

        Ok(Self {
            model,
            tokenizer,
            device,
            eos_token_ids,
        })
    }

    /// Run inference: tokenize, sample until end of turn, decode.
    fn generate(
        &mut self,
        prompt: &str,
        options: &GenerationOptions,
        seed: u64,
    ) -> Result<String, GenerationError> {
        let encoding = self.tokenizer.encode(prompt, true)?;
        let prompt_tokens = encoding.get_ids();
        debug!(
            prompt_tokens = prompt_tokens.len(),
            max_new_tokens = options.max_new_tokens,
            temperature = options.temperature,
            "Starting local generation"
        );

        let sampling = if options.do_sample && options.temperature > 0.0 {
            Sampling::All {
                temperature: options.temperature,
            }
        } else {
            Sampling::ArgMax
        };
        let mut logits_processor = LogitsProcessor::from_sampling(seed, sampling);

        let mut generated: Vec<u32> = Vec::new();
        let mut input = Tensor::new(prompt_tokens, &self.device)?.unsqueeze(0)?;
        let mut index_pos = 0;

        for _ in 0..options.max_new_tokens {
            let seq_len = input.dim(1)?;
            let logits = self.model.forward(&input, index_pos)?;
            index_pos += seq_len;

            let next_token = logits_processor.sample(&last_position(&logits)?)?;
            if self.eos_token_ids.contains(&next_token) {
                break;
            }
            generated.push(next_token);

            input = Tensor::new(&[next_token][..], &self.device)?.unsqueeze(0)?;
        }

        let text = self.tokenizer.decode(&generated, true)?;
        debug!(completion_tokens = generated.len(), "Generation complete");
        Ok(text.trim().to_string())
    }
}

/// Logits of the final sequence position as a 1-D f32 tensor
fn last_position(logits: &Tensor) -> Result<Tensor, GenerationError> {
    let mut logits = logits.squeeze(0)?;
    if logits.rank() == 2 {
        let last = logits.dim(0)? - 1;
        logits = logits.get(last)?;
    }
    Ok(logits.to_dtype(DType::F32)?)
}

/// [`Generator`] backed by a local candle model.
///
/// Candle inference is CPU-bound and the KV cache is per model, so calls are
/// serialized behind a mutex and run on the blocking pool.
pub struct CandleGenerator {
    inner: Arc<Mutex<LocalModel>>,
    seed: AtomicU64,
}

impl CandleGenerator {
    /// Resolve and load the configured model on the blocking pool.
    pub async fn load(config: &ModelConfig) -> ChatResult<Self> {
        let files = ModelFiles::resolve(config)?;
        let preference = config.device;
        let model = tokio::task::spawn_blocking(move || LocalModel::load(&files, preference))
            .await
            .map_err(|e| ChatError::ModelError(format!("Model loading task failed: {}", e)))??;

        info!("Model loaded successfully");
        Ok(Self {
            inner: Arc::new(Mutex::new(model)),
            seed: AtomicU64::new(config.seed),
        })
    }
}

#[async_trait]
impl Generator for CandleGenerator {
    async fn generate(
        &self,
        messages: &[Turn],
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = template::format_prompt(messages);
        let opts = options.clone();
        let seed = self.seed.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        let text = tokio::task::spawn_blocking(move || {
            let mut model = inner
                .lock()
                .map_err(|e| GenerationError::Inference(format!("Model lock poisoned: {}", e)))?;
            model.generate(&prompt, &opts, seed)
        })
        .await??;

        let record = if options.return_full_text {
            let mut dialogue = messages.to_vec();
            dialogue.push(Turn::assistant(text));
            GeneratedRecord::dialogue(dialogue)
        } else {
            GeneratedRecord::plain(text)
        };

        Ok(GenerationResult::Records(vec![record]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> ModelConfig {
        ModelConfig {
            models_dir: dir.to_path_buf(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_cpu_preference_is_honoured() {
        assert!(matches!(select_device(DevicePreference::Cpu), Device::Cpu));
    }

    #[test]
    fn test_missing_files_name_fetch_tool() {
        let dir = tempdir().unwrap();
        let err = ModelFiles::resolve(&config_in(dir.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Local file missing"));
        assert!(message.contains("fetch-model"));
    }

    #[test]
    fn test_files_placed_directly_in_models_dir() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(dir.path().join(&config.gguf_file), b"gguf").unwrap();
        std::fs::write(dir.path().join(TOKENIZER_FILE), b"{}").unwrap();

        let files = ModelFiles::resolve(&config).unwrap();
        assert_eq!(files.weights, dir.path().join(&config.gguf_file));
        assert_eq!(files.tokenizer, dir.path().join(TOKENIZER_FILE));
    }

    #[tokio::test]
    async fn test_load_without_files_fails() {
        let dir = tempdir().unwrap();
        let result = CandleGenerator::load(&config_in(dir.path())).await;
        assert!(matches!(result, Err(ChatError::ModelError(_))));
    }
}
