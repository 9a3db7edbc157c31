// ABOUTME: LLM provider factory — creates the right chat model based on config.
// ABOUTME: Supports ollama and google_genai (gemini); parses provider:model specs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::{ChatModel, GeminiModel, OllamaModel};
use crate::config::LlmConfig;
use crate::error::ConfigError;

/// Environment variable holding the Google Generative AI key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    Gemini,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "gemini" | "google_genai" => Ok(Provider::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// A `provider:model` string such as `ollama:deepseek-r1:8b`.
///
/// Only the first colon separates the provider; the model keeps any others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl FromStr for ModelSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .trim()
            .split_once(':')
            .filter(|(p, m)| !p.is_empty() && !m.is_empty())
            .ok_or_else(|| ConfigError::InvalidModelSpec(s.to_string()))?;
        Ok(Self {
            provider: provider.parse()?,
            model: model.to_string(),
        })
    }
}

/// Create a chat model based on config, reading credentials from the environment.
pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>, ConfigError> {
    let google_api_key = std::env::var(GOOGLE_API_KEY_VAR).ok();
    create_model_with_key(config, google_api_key)
}

/// Create a chat model with an explicitly supplied Google API key.
pub fn create_model_with_key(
    config: &LlmConfig,
    google_api_key: Option<String>,
) -> Result<Arc<dyn ChatModel>, ConfigError> {
    let params = config.params();
    match config.provider.parse::<Provider>()? {
        Provider::Ollama => Ok(Arc::new(OllamaModel::new(
            Some(&config.ollama.base_url),
            &config.model,
            params,
        ))),
        Provider::Gemini => {
            let api_key = google_api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential {
                    provider: config.provider.clone(),
                    var: GOOGLE_API_KEY_VAR,
                })?;
            Ok(Arc::new(GeminiModel::new(
                config.gemini.base_url.as_deref(),
                &config.model,
                api_key,
                params,
            )))
        }
    }
}
