// ABOUTME: Google Generative AI (Gemini) client using the generateContent endpoint.
// ABOUTME: Maps user/assistant roles to user/model and concatenates text parts of the reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, build_http_client, error_from_response, malformed, network_error};
use crate::error::ModelError;
use crate::session::message::{GenerationParams, Message, Role};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "gemini";

pub struct GeminiModel {
    base_url: String,
    model: String,
    api_key: String,
    params: GenerationParams,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "GenerationConfig::is_empty")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none() && self.top_p.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiModel {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        api_key: String,
        params: GenerationParams,
    ) -> Self {
        Self {
            base_url: base_url
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            api_key,
            params,
            client: build_http_client(120),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&self, messages: &'a [Message]) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: messages
                .iter()
                .map(|m| Content {
                    role: match m.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    },
                    parts: vec![Part { text: &m.content }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_tokens,
                top_p: self.params.top_p,
            },
        }
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    if let Some(err) = response.error {
        return Err(ModelError::MalformedResponse {
            provider: PROVIDER,
            message: err.message,
        });
    }
    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ModelError::MalformedResponse {
            provider: PROVIDER,
            message: "response contained no text candidates".to_string(),
        });
    }
    Ok(text)
}

#[async_trait]
impl ChatModel for GeminiModel {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, ModelError> {
        let url = self.endpoint();
        debug!(model = %self.model, messages = messages.len(), "gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(messages))
            .send()
            .await
            .map_err(network_error(PROVIDER))?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(malformed(PROVIDER))?;
        extract_text(body).map(Message::assistant)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn params(&self) -> GenerationParams {
        self.params
    }
}
