// ABOUTME: Model invocation boundary — the ChatModel trait and its HTTP providers.
// ABOUTME: A call takes the ordered conversation and returns one assistant message.

pub mod gemini;
pub mod ollama;
pub mod provider;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::ModelError;
use crate::session::message::{GenerationParams, Message};

pub use gemini::GeminiModel;
pub use ollama::OllamaModel;
pub use provider::{ModelSpec, Provider, create_model, create_model_with_key};

/// A chat model that answers a full conversation with a single reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the ordered conversation and return the assistant's reply.
    async fn invoke(&self, messages: &[Message]) -> Result<Message, ModelError>;

    /// Identifier recorded in the interaction log.
    fn model_name(&self) -> &str;

    fn params(&self) -> GenerationParams;
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Turn a non-success HTTP response into the matching [`ModelError`].
pub(crate) async fn error_from_response(
    provider: &'static str,
    response: reqwest::Response,
) -> ModelError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect::<String>();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Auth {
            provider,
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited { provider, message },
        _ => ModelError::Http {
            provider,
            status: status.as_u16(),
            message,
        },
    }
}

pub(crate) fn network_error(provider: &'static str) -> impl FnOnce(reqwest::Error) -> ModelError {
    move |source| ModelError::Network { provider, source }
}

pub(crate) fn malformed(provider: &'static str) -> impl FnOnce(reqwest::Error) -> ModelError {
    move |err| ModelError::MalformedResponse {
        provider,
        message: err.to_string(),
    }
}
