use reqwest::Url;
use tracing::info;

use super::dto::FaceRegion;
use crate::{error::AppError, state::AppState};

fn parse_image_url(input: Option<String>) -> Result<Url, AppError> {
    let raw = input
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation("Image URL is required."))?;
    let url = Url::parse(raw.trim()).map_err(|_| AppError::validation("Image URL is invalid."))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::validation("Image URL is invalid.")),
    }
}

/// Forwards the image URL to the inference service.
pub async fn detect_faces(st: &AppState, input: Option<String>) -> Result<Vec<FaceRegion>, AppError> {
    let url = parse_image_url(input)?;
    let regions = st.inference.detect_faces(url.as_str()).await?;
    info!(count = regions.len(), "face detection done");
    Ok(regions)
}
