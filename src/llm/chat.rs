use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ChatModel;
use crate::config::LlmConfig;

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One non-streaming completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// Call an OpenAI-compatible `/v1/chat/completions` endpoint and return the
/// first choice's content.
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    request: CompletionRequest,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);

    let req = OpenAiChatRequest {
        model: request.model,
        messages: request.messages,
        temperature: request.temperature,
    };

    let resp = client
        .post(&url)
        .header(
            "Authorization",
            format!("Bearer {}", config.api_key.as_deref().unwrap_or("")),
        )
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp
        .json()
        .await
        .context("Failed to parse OpenAI chat response")?;

    first_choice_content(body)
}

fn first_choice_content(body: OpenAiChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI chat API returned no content")
}

/// [`ChatModel`] backed by the OpenAI chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChat {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        complete(&self.client, &self.config, request).await
    }
}

// ─── Request/Response types ────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}
