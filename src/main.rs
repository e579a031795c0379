use tracing_subscriber::EnvFilter;

use project_rag::api;
use project_rag::config::Config;
use project_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Qdrant: {}", config.qdrant.url);
    tracing::info!(
        "Models: {} / {} (dim {}), reranker {}",
        config.llm.chat_model,
        config.llm.embedding_model,
        config.llm.embedding_dim,
        config.reranker.model
    );
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set");
    }
    if config.reranker.api_key.is_none() {
        tracing::warn!("COHERE_API_KEY is not set");
    }

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
