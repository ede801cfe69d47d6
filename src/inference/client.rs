use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use super::dto::{BoundingBox, FaceRegion};
use crate::config::ClarifaiConfig;

pub const MODEL_ID: &str = "face-detection";
pub const MODEL_VERSION_ID: &str = "6dc7e46bc9124c5c8824be4822abe105";

/// Clarifai's status code for a successful call.
const STATUS_SUCCESS: u32 = 10000;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("inference request timed out")]
    Timeout,

    #[error("inference service answered HTTP {0}")]
    Http(u16),

    #[error("inference failed with status {code}: {description} {details}")]
    Upstream {
        code: u32,
        description: String,
        details: String,
    },

    #[error("malformed inference response: {0}")]
    Malformed(String),
}

impl InferenceError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::Transport(e)
        }
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Detected faces in the order the service reports them.
    async fn detect_faces(&self, image_url: &str) -> Result<Vec<FaceRegion>, InferenceError>;
}

#[derive(Debug, Serialize)]
struct PostModelOutputs<'a> {
    inputs: [Input<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Input<'a> {
    data: InputData<'a>,
}

#[derive(Debug, Serialize)]
struct InputData<'a> {
    image: Image<'a>,
}

#[derive(Debug, Serialize)]
struct Image<'a> {
    url: &'a str,
}

impl<'a> PostModelOutputs<'a> {
    fn for_image_url(url: &'a str) -> Self {
        Self {
            inputs: [Input {
                data: InputData {
                    image: Image { url },
                },
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    code: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    details: String,
}

#[derive(Debug, Deserialize)]
struct ModelOutputsResponse {
    status: ApiStatus,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Output {
    #[serde(default)]
    data: OutputData,
}

#[derive(Debug, Default, Deserialize)]
struct OutputData {
    #[serde(default)]
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    id: String,
    region_info: Option<RegionInfo>,
}

#[derive(Debug, Deserialize)]
struct RegionInfo {
    bounding_box: Option<BoundingBox>,
}

/// Keeps only the region id and bounding box of the first output.
fn parse_outputs(http_status: StatusCode, body: &[u8]) -> Result<Vec<FaceRegion>, InferenceError> {
    let parsed: ModelOutputsResponse = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(_) if !http_status.is_success() => {
            return Err(InferenceError::Http(http_status.as_u16()))
        }
        Err(e) => return Err(InferenceError::Malformed(e.to_string())),
    };

    if parsed.status.code != STATUS_SUCCESS {
        return Err(InferenceError::Upstream {
            code: parsed.status.code,
            description: parsed.status.description,
            details: parsed.status.details,
        });
    }
    if !http_status.is_success() {
        return Err(InferenceError::Http(http_status.as_u16()));
    }

    let output = parsed
        .outputs
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::Malformed("response has no outputs".into()))?;

    Ok(output
        .data
        .regions
        .into_iter()
        .filter_map(|r| {
            let bounding_box = r.region_info?.bounding_box?;
            Some(FaceRegion {
                id: r.id,
                bounding_box,
            })
        })
        .collect())
}

/// Clarifai REST client for the face-detection model.
#[derive(Clone)]
pub struct ClarifaiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ClarifaiClient {
    pub fn new(cfg: &ClarifaiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn outputs_url(&self) -> String {
        format!(
            "{}/v2/models/{}/versions/{}/outputs",
            self.base_url, MODEL_ID, MODEL_VERSION_ID
        )
    }
}

#[async_trait]
impl InferenceClient for ClarifaiClient {
    #[instrument(skip(self))]
    async fn detect_faces(&self, image_url: &str) -> Result<Vec<FaceRegion>, InferenceError> {
        let res = self
            .http
            .post(self.outputs_url())
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
            .json(&PostModelOutputs::for_image_url(image_url))
            .send()
            .await
            .map_err(InferenceError::from_transport)?;

        let status = res.status();
        let body = res.bytes().await.map_err(InferenceError::from_transport)?;
        let regions = parse_outputs(status, &body)?;
        debug!(count = regions.len(), "faces detected");
        Ok(regions)
    }
}
