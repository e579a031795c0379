//! Clients for the hosted model services: embeddings and chat completions
//! (OpenAI-compatible) and cross-encoder reranking (Cohere).
//!
//! Each service sits behind a trait so the pipeline can run against stubs.

pub mod chat;
pub mod cross_encoder;
pub mod embeddings;

use anyhow::{Context, Result};
use async_trait::async_trait;

pub use chat::{ChatMessage, CompletionRequest, OpenAiChat};
pub use cross_encoder::{CohereReranker, RerankResult};
pub use embeddings::OpenAiEmbedder;

/// Turns text into fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts; the output is parallel with `texts`.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .context("No embedding returned")
    }
}

/// Reorders candidate documents by relevance to a query.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns at most `top_n` results sorted by score descending. Each
    /// result points back into `documents` by index.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankResult>>;
}

/// Produces a single completion for a list of chat messages.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
