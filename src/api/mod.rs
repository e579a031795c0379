//! HTTP endpoints.

pub mod collections;
pub mod projects;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::error::ProjectError;
use crate::models::FailureResponse;
use crate::state::AppState;

/// All project routes, ready to serve.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/createAiPorject", post(projects::create_ai_project))
        .route("/api/v1/answerQuery", post(projects::answer_query))
        .route("/api/v1/collection/delete", post(collections::delete_collection))
        .route("/api/v1/collection/edit", post(collections::edit_collection))
        .with_state(state)
}

/// A failed request: an error kind, whether the body carries a message, and
/// whether the status reflects the kind or stays 200.
#[derive(Debug)]
pub struct ApiError {
    kind: ProjectError,
    with_message: bool,
    in_body_only: bool,
}

impl ApiError {
    /// Respond with a bare `{"success": false}`.
    pub fn bare(mut self) -> Self {
        self.with_message = false;
        self
    }

    /// Answer 200; `success: false` in the body carries the failure.
    pub fn in_body_only(mut self) -> Self {
        self.in_body_only = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        if self.in_body_only {
            return StatusCode::OK;
        }
        match self.kind {
            ProjectError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ProjectError::PageLimitExceeded { .. } => StatusCode::PRECONDITION_FAILED,
            ProjectError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProjectError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match &self.kind {
            ProjectError::UnsupportedFormat(_) => "Document format is not supported".to_string(),
            ProjectError::PageLimitExceeded { .. } => "Assistant page limit reached".to_string(),
            ProjectError::InvalidRequest(msg) => msg.clone(),
            ProjectError::Upstream(_) => "Something went wrong".to_string(),
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(kind: ProjectError) -> Self {
        Self {
            kind,
            with_message: true,
            in_body_only: false,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ProjectError::Upstream(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.kind {
            ProjectError::Upstream(e) => tracing::error!("Request failed: {e:#}"),
            other => tracing::warn!("Request rejected: {other}"),
        }

        let body = FailureResponse {
            success: false,
            message: self.with_message.then(|| self.client_message()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Unreadable request body: {}", rejection.body_text());
        ProjectError::InvalidRequest("Invalid request body".to_string()).into()
    }
}

/// Unwrap a JSON body, turning an unreadable one into an [`ApiError`].
pub(crate) fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(req)| req).map_err(ApiError::from)
}

/// Trimmed, non-empty value of a required string field.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProjectError::InvalidRequest(format!("{field} is required")).into()),
    }
}
