use super::{BackendError, BackendType, ImageBackend};
use crate::payload::ImagePayload;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MockFailure {
    #[default]
    Transport,
    Authentication,
    /// Succeeds at the transport level but returns no image data
    EmptyPayload,
}

#[derive(Clone, Debug)]
pub struct MockConfig {
    /// 1-based call number that fails; `None` never fails
    pub fail_on_call: Option<usize>,
    pub failure: MockFailure,
    /// Artificial latency per call
    pub latency: Duration,
    pub width: u32,
    pub height: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_on_call: None,
            failure: MockFailure::default(),
            latency: Duration::ZERO,
            width: 64,
            height: 36,
        }
    }
}

/// Offline backend. Each prompt maps to a solid-colour JPEG whose colour is
/// taken from the prompt's SHA-256.
pub struct MockBackend {
    config: MockConfig,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `call`-th request with `failure`.
    pub fn failing_on(call: usize, failure: MockFailure) -> Self {
        Self::new(MockConfig {
            fail_on_call: Some(call),
            failure,
            ..MockConfig::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn render(&self, prompt: &str) -> Result<ImagePayload, BackendError> {
        let digest = Sha256::digest(prompt.as_bytes());
        let color = Rgb([digest[0], digest[1], digest[2]]);
        let frame = RgbImage::from_pixel(self.config.width.max(1), self.config.height.max(1), color);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(frame)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .map_err(|e| BackendError::invalid_response(format!("mock encode failed: {e}")))?;
        ImagePayload::from_bytes(&bytes)
    }
}

#[async_trait::async_trait]
impl ImageBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mock
    }

    async fn generate(&self, prompt: &str) -> Result<ImagePayload, BackendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().push(prompt.to_string());
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if self.config.fail_on_call == Some(call) {
            return match self.config.failure {
                MockFailure::Transport => Err(BackendError::transport("mock transport failure")),
                MockFailure::Authentication => Err(BackendError::Authentication(
                    "mock API key rejected".to_string(),
                )),
                MockFailure::EmptyPayload => ImagePayload::from_base64(""),
            };
        }
        self.render(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_jpeg() {
        let backend = MockBackend::new(MockConfig::default());
        let payload = backend.generate("a cat").await.unwrap();
        assert_eq!(payload.format(), ImageFormat::Jpeg);
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.prompts(), vec!["a cat".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_same_prompt_same_frame() {
        let backend = MockBackend::new(MockConfig::default());
        let a = backend.generate("neon city").await.unwrap();
        let b = backend.generate("neon city").await.unwrap();
        assert_eq!(a.as_base64(), b.as_base64());
    }

    #[tokio::test]
    async fn test_mock_fails_on_configured_call() {
        let backend = MockBackend::failing_on(2, MockFailure::Authentication);
        assert!(backend.generate("one").await.is_ok());
        assert!(matches!(
            backend.generate("two").await,
            Err(BackendError::Authentication(_))
        ));
        assert!(backend.generate("three").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_empty_payload_is_invalid() {
        let backend = MockBackend::failing_on(1, MockFailure::EmptyPayload);
        assert!(matches!(
            backend.generate("one").await,
            Err(BackendError::InvalidResponse(_))
        ));
    }
}
