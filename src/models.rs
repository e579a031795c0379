use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Free-form metadata carried from a loaded page onto its chunks and into
/// the stored point payload.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One loaded page (files) or one fetched URL (web pages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUnit {
    pub text: String,
    pub metadata: Metadata,
}

impl DocumentUnit {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), serde_json::Value::String(source.into()));
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Attach a 0-based page index.
    pub fn with_page(mut self, page: usize) -> Self {
        self.metadata.insert("page".to_string(), serde_json::Value::from(page));
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }
}

/// A bounded text segment of a [`DocumentUnit`], carrying a copy of its
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Create-project request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// `"url"` ingests `urls`; anything else downloads `file_link`.
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub file_link: Option<String>,
    pub urls: Option<Vec<String>>,
    pub collection_name: Option<String>,
    pub best_guess: Option<serde_json::Value>,
    pub data_anomiyzer: Option<serde_json::Value>,
    pub model: Option<String>,
    pub source_chat_gpt: Option<serde_json::Value>,
    pub language: Option<String>,
    /// Pages the caller says the project already holds. JSON clients may
    /// send it as a float (`480.0`).
    #[serde(default, deserialize_with = "page_count")]
    pub no_of_pages: Option<usize>,
}

/// A non-negative page count given as an integer or a float. Fractions
/// round up.
fn page_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_u64() {
        return usize::try_from(n).map(Some).map_err(D::Error::custom);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f <= usize::MAX as f64 => {
            Ok(Some(f.ceil() as usize))
        }
        _ => Err(D::Error::custom(format!("invalid page count: {number}"))),
    }
}

/// Answer-query request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQueryRequest {
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub filename: Option<String>,
    pub file_index: Option<serde_json::Value>,
    pub urls: Option<Vec<String>>,
    pub collection_name: Option<String>,
    pub best_guess: Option<serde_json::Value>,
    pub data_anomiyzer: Option<serde_json::Value>,
    pub model: Option<String>,
    pub source_chat_gpt: Option<serde_json::Value>,
    pub language: Option<String>,
    pub query: Option<String>,
}

/// Delete-collection request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCollectionRequest {
    pub collection_name: Option<String>,
}

/// Edit-collection request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCollectionRequest {
    pub old_collection_name: Option<String>,
    pub new_collection_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    pub success: bool,
    pub message: String,
    pub no_of_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Body of every failed request. `message` is omitted by endpoints whose
/// failure contract is a bare `{"success": false}`.
#[derive(Debug, Clone, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
