use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use mg_core::{ProcessData, Stage};
use mg_pipeline::{RunOutcome, RunRequest};
use serde_json::{json, Value};

use crate::{ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// A JSON body, or the rejection axum produced while reading it.
type JsonBody<T> = Result<Json<T>, JsonRejection>;

async fn advance(state: &AppState, stage: Stage, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    let Json(data) = body.map_err(|rejection| ApiError::bad_body(stage.as_str(), rejection))?;
    state
        .orchestrator
        .run_stage(stage, &data)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(stage.as_str(), e))
}

pub async fn init(State(state): State<Arc<AppState>>, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    advance(&state, Stage::Init, body).await
}

pub async fn fetch_articles(State(state): State<Arc<AppState>>, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    advance(&state, Stage::Fetch, body).await
}

pub async fn rewrite_articles(
    State(state): State<Arc<AppState>>,
    body: JsonBody<ProcessData>,
) -> ApiResult<ProcessData> {
    advance(&state, Stage::Rewrite, body).await
}

pub async fn create_cover(State(state): State<Arc<AppState>>, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    advance(&state, Stage::Compose, body).await
}

pub async fn generate_image(State(state): State<Arc<AppState>>, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    advance(&state, Stage::Image, body).await
}

pub async fn finalize(State(state): State<Arc<AppState>>, body: JsonBody<ProcessData>) -> ApiResult<ProcessData> {
    advance(&state, Stage::Finalize, body).await
}

pub async fn run(State(state): State<Arc<AppState>>, body: JsonBody<RunRequest>) -> ApiResult<RunOutcome> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_body("run", rejection))?;
    Ok(Json(state.runner.run(&request).await?))
}

pub async fn run_legacy(
    State(state): State<Arc<AppState>>,
    Path((user_id, language, topic, quota)): Path<(String, String, String, String)>,
) -> ApiResult<RunOutcome> {
    let request = RunRequest {
        user_id,
        topic,
        language,
        quota,
    };
    Ok(Json(state.runner.run(&request).await?))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
