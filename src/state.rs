use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::ProjectError;
use crate::llm::{ChatModel, CohereReranker, Embedder, OpenAiChat, OpenAiEmbedder, Reranker};
use crate::vector::{QdrantStore, VectorStore};

/// Reject an ingest that would take a project past `limit` pages.
pub fn check_page_limit(
    existing: usize,
    incoming: usize,
    limit: usize,
) -> Result<(), ProjectError> {
    if existing.saturating_add(incoming) > limit {
        return Err(ProjectError::PageLimitExceeded {
            existing,
            incoming,
            limit,
        });
    }
    Ok(())
}

/// Handles to the external services a request talks to.
#[derive(Clone)]
pub struct Services {
    pub vector_store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub reranker: Arc<dyn Reranker>,
    pub chat: Arc<dyn ChatModel>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub services: Services,
    pub http_client: reqwest::Client,
    /// Pages ingested by this process, per collection.
    pub page_ledger: Arc<RwLock<HashMap<String, usize>>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let services = Services {
            vector_store: Arc::new(QdrantStore::connect(&config.qdrant)?),
            embedder: Arc::new(OpenAiEmbedder::new(http_client.clone(), config.llm.clone())),
            reranker: Arc::new(CohereReranker::new(
                http_client.clone(),
                config.reranker.clone(),
            )),
            chat: Arc::new(OpenAiChat::new(http_client.clone(), config.llm.clone())),
        };

        Ok(Self::with_services(config, services, http_client))
    }

    /// Build state around caller-provided services.
    pub fn with_services(config: Config, services: Services, http_client: reqwest::Client) -> Self {
        Self {
            config,
            services,
            http_client,
            page_ledger: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Pages this process has ingested into `collection`.
    pub fn ledger_pages(&self, collection: &str) -> usize {
        self.page_ledger.read().get(collection).copied().unwrap_or(0)
    }

    /// Add freshly ingested pages to a collection's tally and return the new
    /// total.
    pub fn add_pages(&self, collection: &str, pages: usize) -> usize {
        let mut ledger = self.page_ledger.write();
        let total = ledger.entry(collection.to_string()).or_insert(0);
        *total += pages;
        *total
    }

    /// Check the page limit and claim `incoming` pages in one step, so two
    /// concurrent ingests into the same collection cannot both pass. The
    /// existing count is the larger of `reported` and the ledger.
    pub fn reserve_pages(
        &self,
        collection: &str,
        reported: usize,
        incoming: usize,
        limit: usize,
    ) -> Result<usize, ProjectError> {
        let mut ledger = self.page_ledger.write();
        let held = ledger.get(collection).copied().unwrap_or(0);
        check_page_limit(reported.max(held), incoming, limit)?;
        let total = held + incoming;
        ledger.insert(collection.to_string(), total);
        Ok(total)
    }

    /// Give back pages claimed by [`reserve_pages`](Self::reserve_pages)
    /// for an ingest that failed.
    pub fn release_pages(&self, collection: &str, pages: usize) {
        let mut ledger = self.page_ledger.write();
        if let Some(total) = ledger.get_mut(collection) {
            *total = total.saturating_sub(pages);
            if *total == 0 {
                ledger.remove(collection);
            }
        }
    }

    pub fn forget_pages(&self, collection: &str) {
        self.page_ledger.write().remove(collection);
    }
}
