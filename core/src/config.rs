use crate::errors::{ChatError, ChatResult};
use crate::session::DEFAULT_HISTORY_WINDOW;
use crate::types::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "localchat";

/// Which device the generator should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// CUDA, then Metal, then CPU
    #[default]
    Auto,
    Cpu,
}

/// Where the model weights and tokenizer come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local cache directory populated by `fetch-model`
    pub models_dir: PathBuf,
    pub repo: String,
    pub gguf_file: String,
    pub tokenizer_repo: String,
    pub device: DevicePreference,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            repo: "unsloth/gemma-3-1b-it-GGUF".to_string(),
            gguf_file: "gemma-3-1b-it-Q4_K_M.gguf".to_string(),
            tokenizer_repo: "unsloth/gemma-3-1b-it".to_string(),
            device: DevicePreference::Auto,
            seed: 299792458,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint_url: String,
    pub history_window: usize,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:3000/chat".to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            log_level: "warn".to_string(),
        }
    }
}

/// Settings for the standalone in-process tester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub max_new_tokens: usize,
    pub history_window: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl LocalConfig {
    /// Endpoint generation options with the tester's shorter output budget
    pub fn generation_options(&self, base: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            max_new_tokens: self.max_new_tokens,
            ..base.clone()
        }
    }
}

/// Configuration shared by every localchat binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocalChatConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub generation: GenerationOptions,
    pub client: ClientConfig,
    pub local: LocalConfig,
}

impl LocalChatConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> ChatResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ChatError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                ChatError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the explicit file when given, else the per-user default location
    pub fn load(path: Option<&Path>) -> ChatResult<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match get_default_config_file(APP_NAME) {
                Ok(path) => Self::load_from_file(&path),
                // No home directory: nothing to read, run on defaults
                Err(_) => Ok(Self::default()),
            },
        }
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        ChatError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> ChatResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
