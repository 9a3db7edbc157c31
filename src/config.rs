// ABOUTME: Configuration loading for parley.
// ABOUTME: Reads ~/.parley/config.toml, then applies env and CLI overrides on top.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::llm::ModelSpec;
use crate::session::SessionMode;
use crate::session::log::DEFAULT_LOG_FILE;
use crate::session::message::GenerationParams;

/// Environment variable holding a `provider:model` override.
pub const MODEL_ENV_VAR: &str = "PARLEY_MODEL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub session: SessionConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub ollama: OllamaConfig,
    pub gemini: GeminiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "deepseek-r1:8b".to_string(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            ollama: OllamaConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }

    /// Replace provider and model with a parsed `provider:model` spec.
    pub fn apply_model_spec(&mut self, spec: &ModelSpec) {
        self.provider = spec.provider.as_str().to_string();
        self.model = spec.model.clone();
    }
}

/// Ollama-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: crate::llm::ollama::DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

/// Gemini-specific configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: Option<String>,
}

/// Session loop and persistence settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub log_file: PathBuf,
    /// Directory for file-backed checkpoints. Unset keeps checkpoints in memory.
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Replay,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            checkpoint_dir: None,
        }
    }
}

impl Config {
    /// Load config from ~/.parley/config.toml, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply a `provider:model` override taken from the environment, if any.
    pub fn apply_env_model(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = value.filter(|s| !s.trim().is_empty()) {
            let spec: ModelSpec = raw.parse()?;
            self.llm.apply_model_spec(&spec);
        }
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".parley")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path to the user-level secrets file loaded after the local `.env`.
    pub fn secrets_env_path() -> PathBuf {
        Self::config_dir().join(".env")
    }
}
