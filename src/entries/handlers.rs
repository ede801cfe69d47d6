use axum::{
    extract::{rejection::JsonRejection, State},
    routing::put,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::services;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ImageEntryRequest {
    pub id: Option<i64>,
}

pub fn entries_routes() -> Router<AppState> {
    Router::new().route("/imageEntry", put(image_entry))
}

/// Responds with the bare new count.
#[instrument(skip(state, payload))]
pub async fn image_entry(
    State(state): State<AppState>,
    payload: Result<Json<ImageEntryRequest>, JsonRejection>,
) -> Result<Json<i64>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let entries = services::increment_entries(&state, body.id).await?;
    Ok(Json(entries))
}
