//! Cross-encoder reranker via the Cohere `/v1/rerank` endpoint.
//!
//! Sends one batch request with the query and all candidate documents and
//! gets back relevance scores in the 0-1 range.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Reranker;
use crate::config::RerankerConfig;

/// Result of reranking a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankResult {
    /// Index into the original documents array.
    pub index: usize,
    /// Relevance score (0.0 - 1.0).
    pub score: f32,
}

/// Rerank documents against a query using a cross-encoder model.
///
/// Returns at most `top_n` results sorted by score descending. Returns Err
/// if the reranker endpoint is unreachable or returns an error.
pub async fn rerank(
    client: &reqwest::Client,
    config: &RerankerConfig,
    query: &str,
    documents: &[String],
    top_n: usize,
) -> Result<Vec<RerankResult>> {
    if documents.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }

    let url = format!("{}/v1/rerank", config.base_url.trim_end_matches('/'));

    let req_body = RerankRequest {
        model: config.model.clone(),
        query: query.to_string(),
        documents: documents.to_vec(),
        top_n: top_n.min(documents.len()),
        return_documents: false,
    };

    let resp = client
        .post(&url)
        .header(
            "Authorization",
            format!("Bearer {}", config.api_key.as_deref().unwrap_or("")),
        )
        .json(&req_body)
        .send()
        .await
        .context("Failed to reach reranker endpoint")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Reranker returned {status}: {body}");
    }

    let body: RerankResponse = resp
        .json()
        .await
        .context("Failed to parse reranker response")?;

    Ok(collect_results(body, documents.len(), top_n))
}

/// Drop out-of-range indices, sort by score descending, keep `top_n`.
fn collect_results(body: RerankResponse, document_count: usize, top_n: usize) -> Vec<RerankResult> {
    let mut results: Vec<RerankResult> = body
        .results
        .into_iter()
        .filter(|r| r.index < document_count)
        .map(|r| RerankResult {
            index: r.index,
            score: r.relevance_score,
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_n);
    results
}

/// [`Reranker`] backed by Cohere.
#[derive(Clone)]
pub struct CohereReranker {
    client: reqwest::Client,
    config: RerankerConfig,
}

impl CohereReranker {
    pub fn new(client: reqwest::Client, config: RerankerConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankResult>> {
        rerank(&self.client, &self.config, query, documents, top_n).await
    }
}

// ─── Request/Response types ────────────────────────────

#[derive(Serialize)]
struct RerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: usize,
    return_documents: bool,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResultRaw>,
}

#[derive(Deserialize)]
struct RerankResultRaw {
    index: usize,
    relevance_score: f32,
}
