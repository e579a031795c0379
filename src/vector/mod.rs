//! Vector database access.
//!
//! [`VectorStore`] is the narrow surface the service needs from a vector
//! database. [`qdrant::QdrantStore`] talks to a real Qdrant server;
//! [`memory::InMemoryVectorStore`] keeps everything in process and is used in
//! tests. [`gateway`] layers collection bootstrap and chunk ingestion on top.

pub mod gateway;
pub mod memory;
pub mod qdrant;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Metadata, RetrievedChunk};

pub use gateway::{
    delete_collection, ensure_collection, insert_or_fetch_embeddings, CollectionHandle,
};
pub use memory::InMemoryVectorStore;
pub use qdrant::QdrantStore;

/// A vector plus the chunk text and metadata stored next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointInput {
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Metadata,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of every collection on the server.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Create a cosine-distance collection. Fails if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Drop a collection and all of its points.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert points under fresh ids.
    async fn upsert(&self, collection: &str, points: Vec<PointInput>) -> Result<()>;

    /// The `limit` nearest points by cosine similarity, best first. Fails if
    /// the collection does not exist.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>>;
}
