use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Qdrant connection settings
    pub qdrant: QdrantConfig,
    /// OpenAI-compatible embedding and chat settings
    pub llm: LlmConfig,
    /// Cohere reranker settings
    pub reranker: RerankerConfig,
    /// Chunker settings
    pub chunking: ChunkingConfig,
    /// Maximum cumulative pages a single project may hold
    pub max_project_pages: usize,
    /// Number of chunks fetched by similarity search
    pub retrieval_top_k: usize,
    /// Outbound HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// gRPC URL of the Qdrant server
    pub url: String,
    /// API key (only needed for Qdrant Cloud)
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// Default model for chat completions when a request names none
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key
    pub api_key: Option<String>,
    /// Embedding vector dimension, also the vector size of new collections
    pub embedding_dim: usize,
}

/// Configuration for the Cohere rerank endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// How many candidates survive reranking.
    pub top_n: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            qdrant: QdrantConfig::default(),
            llm: LlmConfig::default(),
            reranker: RerankerConfig::default(),
            chunking: ChunkingConfig::default(),
            max_project_pages: 500,
            retrieval_top_k: 3,
            request_timeout_secs: 120,
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            api_key: None,
            embedding_dim: 1536,
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cohere.ai".to_string(),
            model: "rerank-multilingual-v2.0".to_string(),
            api_key: None,
            top_n: 3,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PROJECT_RAG_BIND_ADDR") {
            config.bind_addr = addr;
        }

        // Qdrant
        if let Ok(url) = std::env::var("QDRANT_HOST") {
            config.qdrant.url = url;
        }
        if let Ok(key) = std::env::var("QDRANT_API") {
            config.qdrant.api_key = Some(key);
        }

        // OpenAI
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(model) = std::env::var("CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(dim) = std::env::var("EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        // Cohere
        if let Ok(key) = std::env::var("COHERE_API_KEY") {
            config.reranker.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("COHERE_BASE_URL") {
            config.reranker.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("RERANK_MODEL") {
            config.reranker.model = model;
        }
        if let Ok(val) = std::env::var("RERANK_TOP_N") {
            if let Ok(v) = val.parse() {
                config.reranker.top_n = v;
            }
        }

        // Pipeline sizes
        if let Ok(val) = std::env::var("CHUNK_SIZE") {
            if let Ok(v) = val.parse() {
                config.chunking.chunk_size = v;
            }
        }
        if let Ok(val) = std::env::var("CHUNK_OVERLAP") {
            if let Ok(v) = val.parse() {
                config.chunking.chunk_overlap = v;
            }
        }
        if let Ok(val) = std::env::var("MAX_PROJECT_PAGES") {
            if let Ok(v) = val.parse() {
                config.max_project_pages = v;
            }
        }
        if let Ok(val) = std::env::var("RETRIEVAL_TOP_K") {
            if let Ok(v) = val.parse() {
                config.retrieval_top_k = v;
            }
        }
        if let Ok(val) = std::env::var("REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.request_timeout_secs = v;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hosted_services() {
        let config = Config::default();
        assert_eq!(config.llm.embedding_model, "text-embedding-ada-002");
        assert_eq!(config.llm.embedding_dim, 1536);
        assert_eq!(config.reranker.model, "rerank-multilingual-v2.0");
        assert_eq!(config.reranker.top_n, 3);
        assert_eq!(config.retrieval_top_k, 3);
        assert_eq!(config.max_project_pages, 500);
    }

    #[test]
    fn test_default_chunking() {
        let chunking = ChunkingConfig::default();
        assert_eq!(chunking.chunk_size, 500);
        assert_eq!(chunking.chunk_overlap, 50);
    }
}
