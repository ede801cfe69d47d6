use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::dto::{ApiCallRequest, FaceRegion};
use super::services;
use crate::{error::AppError, state::AppState};

pub fn inference_routes() -> Router<AppState> {
    Router::new().route("/apiCall", post(api_call))
}

#[instrument(skip(state, payload))]
pub async fn api_call(
    State(state): State<AppState>,
    payload: Result<Json<ApiCallRequest>, JsonRejection>,
) -> Result<Json<Vec<FaceRegion>>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let regions = services::detect_faces(&state, body.input).await?;
    Ok(Json(regions))
}
