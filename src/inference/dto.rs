use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ApiCallRequest {
    pub input: Option<String>, // image URL
}

/// Relative coordinates, each in `0.0..=1.0` of the image size.
/// Zero-valued coordinates are omitted upstream, so missing fields read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub top_row: f64,
    pub left_col: f64,
    pub bottom_row: f64,
    pub right_col: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub id: String,
    pub bounding_box: BoundingBox,
}
