use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{RegisterRequest, SignInRequest, UserResponse},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(sign_in))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let user = services::register(&state, payload).await?;
    Ok(Json(UserResponse::present(user, state.config.display_offset)))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let user = services::sign_in(&state, payload).await?;
    Ok(Json(UserResponse::present(user, state.config.display_offset)))
}
