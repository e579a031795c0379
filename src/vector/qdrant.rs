//! Qdrant backend over gRPC.
//!
//! Points are stored with the payload layout `{"page_content": <text>,
//! "metadata": {...}}` under random UUID ids, so collections written by other
//! LangChain-style clients can be queried as well.

use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use super::{PointInput, VectorStore};
use crate::config::QdrantConfig;
use crate::models::{Metadata, RetrievedChunk};

const CONTENT_KEY: &str = "page_content";
const METADATA_KEY: &str = "metadata";

pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Build a client for the configured URL and API key. Connections are
    /// opened lazily on first use.
    pub fn connect(config: &QdrantConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .build()
            .with_context(|| format!("Failed to build Qdrant client for {}", config.url))?;
        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .context("Failed to list Qdrant collections")?;
        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .with_context(|| format!("Failed to create Qdrant collection {name}"))?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client
            .delete_collection(name)
            .await
            .with_context(|| format!("Failed to delete Qdrant collection {name}"))?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<PointInput>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let count = points.len();
        let points = points
            .into_iter()
            .map(|p| {
                let payload = Payload::try_from(point_payload(p.text, p.metadata))
                    .context("Failed to build point payload")?;
                Ok(PointStruct::new(point_id(), p.vector, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .with_context(|| format!("Failed to upsert {count} points into {collection}"))?;

        tracing::debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .with_context(|| format!("Failed to search Qdrant collection {collection}"))?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| {
                let text = scored
                    .payload
                    .get(CONTENT_KEY)
                    .and_then(|v| match &v.kind {
                        Some(Kind::StringValue(s)) => Some(s.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();

                let metadata = match scored.payload.get(METADATA_KEY).map(to_json) {
                    Some(serde_json::Value::Object(map)) => map,
                    _ => Metadata::new(),
                };

                RetrievedChunk {
                    text,
                    metadata,
                    score: scored.score,
                }
            })
            .collect())
    }
}

fn point_payload(text: String, metadata: Metadata) -> serde_json::Value {
    serde_json::json!({
        CONTENT_KEY: text,
        METADATA_KEY: metadata,
    })
}

/// Convert a Qdrant payload value back into JSON.
fn to_json(value: &QdrantValue) -> serde_json::Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(*i),
        Some(Kind::DoubleValue(d)) => serde_json::Value::from(*d),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Fresh random point id in Qdrant's UUID string form.
fn point_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_payload_layout() {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), "a.pdf".into());
        metadata.insert("page".into(), 4.into());

        let payload = point_payload("chunk text".into(), metadata);
        assert_eq!(payload["page_content"], "chunk text");
        assert_eq!(payload["metadata"]["source"], "a.pdf");
        assert_eq!(payload["metadata"]["page"], 4);
    }

    #[test]
    fn test_payload_round_trips_through_qdrant_values() {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), "https://example.com".into());
        metadata.insert("page".into(), 2.into());
        metadata.insert("tags".into(), serde_json::json!(["a", true]));

        let payload = Payload::try_from(point_payload("body".into(), metadata.clone())).unwrap();
        let map: std::collections::HashMap<String, QdrantValue> = payload.into();

        assert_eq!(to_json(&map[CONTENT_KEY]), "body");
        assert_eq!(to_json(&map[METADATA_KEY]), serde_json::Value::Object(metadata));
    }

    #[test]
    fn test_point_ids_are_random_v4_uuids() {
        let a = point_id();
        let b = point_id();
        assert_ne!(a, b);
        for id in [a, b] {
            let parsed = Uuid::parse_str(&id).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
            assert_eq!(parsed.hyphenated().to_string(), id);
        }
    }

    #[tokio::test]
    async fn test_connect_builds_lazily() {
        let config = QdrantConfig {
            url: "http://127.0.0.1:6334".into(),
            api_key: Some("secret".into()),
        };
        assert!(QdrantStore::connect(&config).is_ok());
    }
}
