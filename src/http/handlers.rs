use super::error::ApiError;
use super::state::AppState;
use crate::correction::{CorrectionResult, SynthesisRequestPayload};
use crate::storage::AudioReference;
use crate::task::{TaskId, TaskStatus};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: TaskId,
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

#[tracing::instrument(skip_all)]
pub async fn submit_correction(
    State(state): State<AppState>,
    payload: Result<Json<SynthesisRequestPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let request = payload.into_request(state.defaults)?;
    let task_id = state.runner.submit(request).await?;

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { task_id })))
}

#[tracing::instrument(skip(state))]
pub async fn correction_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatus>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    Ok(Json(state.runner.get_status(task_id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn correction_result(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<CorrectionResult>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    Ok(Json(state.runner.get_result(task_id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn cancel_correction(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatus>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    Ok(Json(state.runner.cancel(task_id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn fetch_audio(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let reference = AudioReference::parse(&reference)?;
    let clip = state.audio_store.get(&reference).await?;

    Ok(([(header::CONTENT_TYPE, clip.content_type)], clip.bytes))
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid task ID: {}", raw)))
}
