use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{PointInput, VectorStore};
use crate::models::RetrievedChunk;

struct Collection {
    dimensions: usize,
    points: Vec<PointInput>,
}

/// In-memory vector store with cosine similarity search.
///
/// Mirrors the server behaviour the service relies on: creating an existing
/// collection fails, and searching or writing a missing one fails.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector size of a collection, if it exists.
    pub fn dimensions(&self, name: &str) -> Option<usize> {
        self.collections.read().get(name).map(|c| c.dimensions)
    }

    /// Number of points in a collection, if it exists.
    pub fn point_count(&self, name: &str) -> Option<usize> {
        self.collections.read().get(name).map(|c| c.points.len())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            anyhow::bail!("Collection `{name}` already exists");
        }
        collections.insert(
            name.to_string(),
            Collection {
                dimensions,
                points: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<PointInput>) -> Result<()> {
        let mut collections = self.collections.write();
        let Some(target) = collections.get_mut(collection) else {
            anyhow::bail!("Collection `{collection}` doesn't exist");
        };
        if let Some(bad) = points.iter().find(|p| p.vector.len() != target.dimensions) {
            anyhow::bail!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                target.dimensions,
                bad.vector.len()
            );
        }
        target.points.extend(points);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let collections = self.collections.read();
        let Some(target) = collections.get(collection) else {
            anyhow::bail!("Collection `{collection}` doesn't exist");
        };

        let mut scored: Vec<(f32, &PointInput)> = target
            .points
            .iter()
            .map(|p| (cosine_similarity(vector, &p.vector), p))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, p)| RetrievedChunk {
                text: p.text.clone(),
                metadata: p.metadata.clone(),
                score,
            })
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
