use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::{payload, required, ApiError};
use crate::chunking::chunk_data;
use crate::error::ProjectError;
use crate::ingest::{download_file, load_document, load_websites};
use crate::models::{
    AnswerQueryRequest, AnswerResponse, CreateProjectRequest, CreateProjectResponse, DocumentUnit,
};
use crate::pipeline::{ask_and_get_answer, AnswerOptions};
use crate::state::AppState;
use crate::vector::insert_or_fetch_embeddings;

/// POST /api/v1/createAiPorject - Load a source, chunk it, and store it in
/// the project's collection.
pub async fn create_ai_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<CreateProjectResponse>, ApiError> {
    let req = payload(body)?;
    let collection = required(&req.collection_name, "collectionName")?.to_string();

    let units = if req.source_type.as_deref() == Some("url") {
        let urls = req.urls.as_deref().unwrap_or_default();
        if urls.is_empty() {
            return Err(ProjectError::InvalidRequest("urls is required".to_string()).into());
        }
        load_websites(&state.http_client, urls).await?
    } else {
        let link = required(&req.file_link, "fileLink")?;
        // Removed with the downloaded file once this branch ends.
        let scratch = tempfile::tempdir().context("Failed to create download directory")?;
        let path = download_file(&state.http_client, link, scratch.path()).await?;
        load_document(&path).await?.ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string();
            ProjectError::UnsupportedFormat(ext)
        })?
    };

    let new_pages = ingest_documents(&state, &collection, req.no_of_pages, &units).await?;

    Ok(Json(CreateProjectResponse {
        success: true,
        message: "Project created successfully".to_string(),
        no_of_pages: new_pages,
    }))
}

/// Page-check, chunk, and store `units`. Returns the number of new pages.
async fn ingest_documents(
    state: &AppState,
    collection: &str,
    reported_pages: Option<usize>,
    units: &[DocumentUnit],
) -> Result<usize, ApiError> {
    let incoming = units.len();
    let total = state.reserve_pages(
        collection,
        reported_pages.unwrap_or(0),
        incoming,
        state.config.max_project_pages,
    )?;

    if let Err(e) = store_documents(state, collection, units).await {
        state.release_pages(collection, incoming);
        return Err(e.into());
    }

    tracing::info!(collection, total_pages = total, "Project created");
    Ok(incoming)
}

async fn store_documents(
    state: &AppState,
    collection: &str,
    units: &[DocumentUnit],
) -> anyhow::Result<()> {
    let chunks = chunk_data(units, &state.config.chunking)?;
    tracing::info!(collection, pages = units.len(), chunks = chunks.len(), "Chunked project data");

    insert_or_fetch_embeddings(
        state.services.vector_store.clone(),
        state.services.embedder.clone(),
        collection,
        state.config.llm.embedding_dim,
        &chunks,
    )
    .await?;
    Ok(())
}

/// POST /api/v1/answerQuery - Answer a question from a project's collection.
pub async fn answer_query(
    State(state): State<AppState>,
    body: Result<Json<AnswerQueryRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    answer(&state, body)
        .await
        .map(Json)
        .map_err(|e| e.bare().in_body_only())
}

async fn answer(
    state: &AppState,
    body: Result<Json<AnswerQueryRequest>, JsonRejection>,
) -> Result<AnswerResponse, ApiError> {
    let req = payload(body)?;
    let collection = required(&req.collection_name, "collectionName")?;
    let question = required(&req.query, "query")?;

    let options = AnswerOptions {
        model: req
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(state.config.llm.chat_model.as_str())
            .to_string(),
        temperature: 0.0,
        top_k: state.config.retrieval_top_k,
        top_n: state.config.reranker.top_n,
    };

    let answer = ask_and_get_answer(&state.services, collection, question, &options).await?;

    Ok(AnswerResponse {
        success: true,
        answer,
    })
}
