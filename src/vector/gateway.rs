//! Collection bootstrap and chunk ingestion on top of a [`VectorStore`].

use anyhow::{Context, Result};
use std::sync::Arc;

use super::{PointInput, VectorStore};
use crate::llm::Embedder;
use crate::models::{Chunk, RetrievedChunk};

/// Chunks embedded per request to the embedding service.
const INGEST_BATCH_SIZE: usize = 64;

/// Make sure a cosine-distance collection named `name` exists.
///
/// An existing collection is left untouched, whatever its vector size. A
/// failed create is logged and swallowed; later writes surface the real
/// problem if the collection is truly missing.
pub async fn ensure_collection(
    store: &dyn VectorStore,
    name: &str,
    dimensions: usize,
) -> Result<()> {
    let existing = store.list_collections().await?;
    if existing.iter().any(|c| c == name) {
        tracing::info!(collection = name, "Collection already exists");
        return Ok(());
    }

    match store.create_collection(name, dimensions).await {
        Ok(()) => tracing::info!(collection = name, dimensions, "Collection created"),
        Err(e) => tracing::warn!(collection = name, "Failed to create collection: {e:#}"),
    }
    Ok(())
}

/// Drop a collection and everything stored in it.
pub async fn delete_collection(store: &dyn VectorStore, name: &str) -> Result<()> {
    store.delete_collection(name).await?;
    tracing::info!(collection = name, "Collection deleted");
    Ok(())
}

/// A named collection paired with the embedder used to write and query it.
#[derive(Clone)]
pub struct CollectionHandle {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    name: String,
}

impl CollectionHandle {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embed and store chunks. Nothing is deduplicated: adding the same chunk
    /// twice stores it twice.
    pub async fn add_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let mut stored = 0;
        for batch in chunks.chunks(INGEST_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self
                .embedder
                .embed_documents(&texts)
                .await
                .context("Failed to embed chunks")?;
            if vectors.len() != batch.len() {
                anyhow::bail!(
                    "Embedding count mismatch: sent {}, got {}",
                    batch.len(),
                    vectors.len()
                );
            }

            let points = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| PointInput {
                    vector,
                    text: chunk.text.clone(),
                    metadata: chunk.metadata.clone(),
                })
                .collect();
            self.store.upsert(&self.name, points).await?;
            stored += batch.len();
        }

        tracing::info!(collection = %self.name, chunks = stored, "Stored chunks");
        Ok(stored)
    }

    /// Embed `query` and return the `k` closest chunks, best first.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let vector = self
            .embedder
            .embed_query(query)
            .await
            .context("Failed to embed query")?;
        self.store.search(&self.name, &vector, k).await
    }
}

/// Ensure the collection exists, then embed and store `chunks` in it.
pub async fn insert_or_fetch_embeddings(
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    name: &str,
    dimensions: usize,
    chunks: &[Chunk],
) -> Result<CollectionHandle> {
    ensure_collection(store.as_ref(), name, dimensions).await?;
    let handle = CollectionHandle::new(store, embedder, name);
    handle.add_chunks(chunks).await?;
    Ok(handle)
}
