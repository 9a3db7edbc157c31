// ABOUTME: Ollama chat client — non-streaming POST to /api/chat on a local server.
// ABOUTME: Sampling options are only sent when configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, build_http_client, error_from_response, malformed, network_error};
use crate::error::ModelError;
use crate::session::message::{GenerationParams, Message, Role};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const PROVIDER: &str = "ollama";

pub struct OllamaModel {
    base_url: String,
    model: String,
    params: GenerationParams,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Options::is_empty")]
    options: Options,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Serialize)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

impl Options {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none() && self.top_p.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaModel {
    pub fn new(base_url: Option<&str>, model: &str, params: GenerationParams) -> Self {
        Self {
            base_url: base_url
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            params,
            // Local models can be slow to answer.
            client: build_http_client(300),
        }
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
            stream: false,
            options: Options {
                temperature: self.params.temperature,
                num_predict: self.params.max_tokens,
                top_p: self.params.top_p,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OllamaModel {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, ModelError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = self.build_request(messages);
        debug!(%url, model = %self.model, messages = messages.len(), "ollama request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(network_error(PROVIDER))?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let body: ChatResponse = response.json().await.map_err(malformed(PROVIDER))?;
        Ok(Message::assistant(body.message.content))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn params(&self) -> GenerationParams {
        self.params
    }
}
