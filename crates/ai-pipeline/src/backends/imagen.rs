/// Imagen backend integration
///
/// Calls the Google Generative Language API `:predict` endpoint for Imagen
/// models, one image per request.
use super::{BackendConfig, BackendError, BackendType, ImageBackend};
use crate::payload::ImagePayload;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-4.0-generate-001";

/// Imagen API backend
pub struct ImagenBackend {
    api_key: String,
    api_url: String,
    model: String,
    aspect_ratio: String,
    client: reqwest::Client,
}

impl ImagenBackend {
    /// Create new Imagen backend
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BackendError::configuration("Imagen backend requires an API key"))?;
        let model = config
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGEN_MODEL.to_string());

        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(20));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            api_url: config.api_url.unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            model,
            aspect_ratio: config.aspect_ratio,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:predict",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(&self, prompt: &str) -> PredictRequest {
        PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: self.aspect_ratio.clone(),
                output_options: OutputOptions {
                    mime_type: "image/jpeg".to_string(),
                },
            },
        }
    }
}

fn classify_status(status: StatusCode, body: &str) -> BackendError {
    let msg = format!("Imagen API error: {status} - {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Authentication(msg),
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited(msg),
        _ => BackendError::Transport(msg),
    }
}

fn first_image(response: PredictResponse) -> Result<ImagePayload, BackendError> {
    let prediction = response
        .predictions
        .into_iter()
        .find(|p| p.bytes_base64_encoded.is_some())
        .ok_or_else(|| BackendError::invalid_response("Imagen response had no images"))?;
    ImagePayload::from_base64(prediction.bytes_base64_encoded.as_deref().unwrap_or_default())
}

#[async_trait::async_trait]
impl ImageBackend for ImagenBackend {
    fn name(&self) -> &str {
        "Imagen"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Imagen
    }

    async fn generate(&self, prompt: &str) -> Result<ImagePayload, BackendError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body = response.text().await?;
        let parsed: PredictResponse = serde_json::from_str(&body).map_err(|e| {
            BackendError::invalid_response(format!("invalid Imagen response JSON: {e}"))
        })?;
        let payload = first_image(parsed)?;
        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = payload.byte_len(),
            "Imagen returned image"
        );
        Ok(payload)
    }
}

/// Predict request for Imagen
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

/// Predict response from Imagen
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    mime_type: Option<String>,
}
