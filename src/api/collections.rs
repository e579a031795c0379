use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::{payload, required, ApiError};
use crate::models::{DeleteCollectionRequest, EditCollectionRequest, MessageResponse};
use crate::state::AppState;
use crate::vector;

/// POST /api/v1/collection/delete - Drop a project's collection
pub async fn delete_collection(
    State(state): State<AppState>,
    body: Result<Json<DeleteCollectionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete(&state, body)
        .await
        .map(Json)
        .map_err(ApiError::in_body_only)
}

async fn delete(
    state: &AppState,
    body: Result<Json<DeleteCollectionRequest>, JsonRejection>,
) -> Result<MessageResponse, ApiError> {
    let req = payload(body)?;
    let collection = required(&req.collection_name, "collectionName")?;

    vector::delete_collection(state.services.vector_store.as_ref(), collection).await?;
    state.forget_pages(collection);

    Ok(MessageResponse {
        success: true,
        message: "Collection deleted successfully".to_string(),
    })
}

/// POST /api/v1/collection/edit - Accept a rename request. Collections keep
/// their current name; the request is only validated and logged.
pub async fn edit_collection(
    State(_state): State<AppState>,
    body: Result<Json<EditCollectionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    edit(body).map(Json).map_err(ApiError::in_body_only)
}

fn edit(body: Result<Json<EditCollectionRequest>, JsonRejection>) -> Result<MessageResponse, ApiError> {
    let req = payload(body)?;
    let old_name = required(&req.old_collection_name, "oldCollectionName")?;
    let new_name = required(&req.new_collection_name, "newCollectionName")?;

    tracing::info!(old_name, new_name, "Collection rename requested; renaming is not supported");

    Ok(MessageResponse {
        success: true,
        message: "Collection rename is not supported; the collection keeps its name".to_string(),
    })
}
