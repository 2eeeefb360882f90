use crate::state::SessionMode;
use ai_pipeline::PipelineError;
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please upload an audio file and enter a prompt.";
pub const AUDIO_LOAD_MESSAGE: &str = "Could not load audio file metadata.";
pub const GENERATION_MESSAGE: &str =
    "Failed to generate images. Please check your API key and try again.";
pub const NOT_IDLE_MESSAGE: &str = "A video is already in progress. Start over to create another.";

/// Failures a user sees. `Display` is the message shown; the cause stays in
/// the error chain for logs.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please upload an audio file and enter a prompt.")]
    Validation,
    #[error("Could not load audio file metadata.")]
    AudioLoad(String),
    #[error("Failed to generate images. Please check your API key and try again.")]
    Generation(#[source] PipelineError),
    /// Generation was requested outside `Idle`; the session is left as is.
    #[error("A video is already in progress. Start over to create another.")]
    NotIdle(SessionMode),
}

impl SessionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Validation => VALIDATION_MESSAGE,
            SessionError::AudioLoad(_) => AUDIO_LOAD_MESSAGE,
            SessionError::Generation(_) => GENERATION_MESSAGE,
            SessionError::NotIdle(_) => NOT_IDLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_user_message() {
        let errors = [
            SessionError::Validation,
            SessionError::AudioLoad("no duration".to_string()),
            SessionError::Generation(PipelineError::NoSegments),
            SessionError::NotIdle(SessionMode::Ready),
        ];
        for err in errors {
            assert_eq!(err.to_string(), err.user_message());
        }
    }

    #[test]
    fn test_generation_cause_is_kept() {
        let err = SessionError::Generation(PipelineError::NoSegments);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("no segments to generate"));
    }
}
