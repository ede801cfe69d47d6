use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::inference::client::InferenceError;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Everything a handler can fail with. The wire shape is always 400 plus a
/// JSON string; there is no structured error code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unable to register. Credentials already exist.")]
    DuplicateCredential,

    #[error("Missing credentials. Please try again.")]
    MissingCredentials,

    #[error("Incorrect credentials. Please try again.")]
    InvalidCredentials,

    #[error("Unable to update entries.")]
    NotFound,

    #[error("Unable to work with API.")]
    Inference(#[from] InferenceError),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::Inference(e) => {
                warn!(error = %e, "inference call failed");
                self.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_bad_request() {
        for err in [
            AppError::DuplicateCredential,
            AppError::MissingCredentials,
            AppError::InvalidCredentials,
            AppError::NotFound,
            AppError::validation("Name is required."),
            AppError::Inference(InferenceError::Timeout),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{err:?}");
        }
    }

    #[tokio::test]
    async fn internal_is_400_and_hides_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 5432"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let msg: String = serde_json::from_slice(&body).unwrap();
        assert_eq!(msg, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn body_is_a_json_string() {
        let res = AppError::InvalidCredentials.into_response();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let msg: String = serde_json::from_slice(&body).unwrap();
        assert_eq!(msg, "Incorrect credentials. Please try again.");
    }
}
