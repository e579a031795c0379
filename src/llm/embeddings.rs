use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Embedder;
use crate::config::LlmConfig;

/// Texts per request to the embeddings endpoint.
const EMBED_BATCH_SIZE: usize = 64;

/// Generate embeddings for a batch of texts via an OpenAI-compatible API.
pub async fn embed_batch(
    client: &reqwest::Client,
    config: &LlmConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let url = format!("{}/v1/embeddings", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let mut all_embeddings = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(EMBED_BATCH_SIZE) {
        let req = OpenAiEmbedRequest {
            model: config.embedding_model.clone(),
            input: chunk.to_vec(),
        };

        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&req)
            .send()
            .await
            .context("Failed to call OpenAI embed API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI embed API returned {status}: {body}");
        }

        let body: OpenAiEmbedResponse = resp
            .json()
            .await
            .context("Failed to parse OpenAI embed response")?;

        all_embeddings.extend(order_embeddings(body.data, chunk.len())?);
    }

    Ok(all_embeddings)
}

/// Put embeddings back in input order and check nothing went missing.
fn order_embeddings(mut data: Vec<OpenAiEmbedData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        anyhow::bail!(
            "OpenAI embed API returned {} embeddings for {expected} inputs",
            data.len()
        );
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

/// [`Embedder`] backed by the OpenAI embeddings endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiEmbedder {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        embed_batch(&self.client, &self.config, texts).await
    }
}

// ─── Request/Response types ────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
