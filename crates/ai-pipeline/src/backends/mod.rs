/// Image generation backends
///
/// Provides a unified interface over the services that turn a text prompt
/// into one image:
/// - Imagen via the Google Generative Language API
/// - Mock (offline, deterministic frames)

pub mod imagen;
pub mod mock;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub use imagen::ImagenBackend;
pub use mock::{MockBackend, MockConfig};

use crate::payload::ImagePayload;

/// Backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Google Imagen over the Generative Language REST API
    Imagen,
    /// Offline backend producing solid-colour frames
    Mock,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imagen => write!(f, "imagen"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for BackendType {
    type Err = BackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagen" | "gemini" => Ok(Self::Imagen),
            "mock" => Ok(Self::Mock),
            other => Err(BackendError::configuration(format!(
                "unknown backend '{other}' (expected imagen or mock)"
            ))),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        BackendError::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        BackendError::Transport(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        BackendError::InvalidResponse(msg.into())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// Image generation backend trait
#[async_trait::async_trait]
pub trait ImageBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Backend type
    fn backend_type(&self) -> BackendType;

    /// Generate one image for `prompt`
    async fn generate(&self, prompt: &str) -> std::result::Result<ImagePayload, BackendError>;
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend type
    pub backend_type: BackendType,

    /// API endpoint base URL (defaults per backend)
    pub api_url: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// Model name (defaults per backend)
    pub model: Option<String>,

    /// Output aspect ratio, e.g. "16:9"
    pub aspect_ratio: String,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// Create new backend config
    pub fn new(backend_type: BackendType) -> Self {
        Self {
            backend_type,
            api_url: None,
            api_key: None,
            model: None,
            aspect_ratio: "16:9".to_string(),
            timeout_secs: Some(120),
        }
    }

    /// With API endpoint
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = Some(url);
        self
    }

    /// With API key
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// With model
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// With aspect ratio
    pub fn with_aspect_ratio(mut self, aspect_ratio: String) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// With timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Backend factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create backend from config
    pub fn create(config: BackendConfig) -> Result<Box<dyn ImageBackend>> {
        match config.backend_type {
            BackendType::Imagen => {
                let backend = ImagenBackend::new(config)?;
                Ok(Box::new(backend))
            }
            BackendType::Mock => Ok(Box::new(MockBackend::new(MockConfig::default()))),
        }
    }
}
