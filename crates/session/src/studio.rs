/// Run driver
///
/// Owns the session state and carries a submission through duration probing,
/// segment planning and sequential generation to `Ready`, or back to `Idle`
/// with a single message.
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::observer::SessionObserver;
use crate::state::{GenerationRequest, RunId, SessionMode, SessionState};
use ai_pipeline::{ArtStyle, GenerationPipeline, ImageBackend};
use media_io::{AudioFile, AudioProbe};
use timeline::{plan, Seconds};
use tracing::{error, info, warn};

pub struct Studio<'a> {
    probe: &'a dyn AudioProbe,
    backend: &'a dyn ImageBackend,
    config: SessionConfig,
    state: SessionState,
}

impl<'a> Studio<'a> {
    pub fn new(probe: &'a dyn AudioProbe, backend: &'a dyn ImageBackend) -> Self {
        Self {
            probe,
            backend,
            config: SessionConfig::default(),
            state: SessionState::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn select_audio(&mut self, audio: Option<AudioFile>) {
        self.transition(|state| state.select_audio(audio));
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.transition(|state| state.with_prompt(prompt));
    }

    pub fn set_style(&mut self, style: &'static ArtStyle) {
        self.transition(|state| state.with_style(style));
    }

    pub fn start_over(&mut self) {
        self.transition(SessionState::start_over);
    }

    /// Submit the current inputs and run generation to completion.
    ///
    /// Only valid from `Idle`; any other mode returns `NotIdle` and leaves
    /// the state untouched. On failure the state is back in `Idle` carrying
    /// the error's user message, and the same error is returned.
    pub async fn generate(
        &mut self,
        observer: &mut dyn SessionObserver,
    ) -> Result<(), SessionError> {
        let mode = self.state.mode();
        if mode != SessionMode::Idle {
            warn!(?mode, "generate requested outside idle");
            return Err(SessionError::NotIdle(mode));
        }
        self.transition(SessionState::submit);
        observer.on_state(&self.state);

        let SessionState::Generating(generating) = &self.state else {
            return Err(SessionError::Validation);
        };
        let (run_id, request) = (generating.run_id, generating.request.clone());
        info!(
            %run_id,
            audio = %request.audio.path().display(),
            style = request.style.name,
            "run submitted"
        );

        match self.run_pipeline(run_id, &request, observer).await {
            Ok(()) => {
                observer.on_state(&self.state);
                Ok(())
            }
            Err(err) => {
                error!(%run_id, error = ?err, "run failed");
                let message = err.user_message();
                self.transition(|state| state.failed(run_id, message));
                observer.on_state(&self.state);
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &mut self,
        run_id: RunId,
        request: &GenerationRequest,
        observer: &mut dyn SessionObserver,
    ) -> Result<(), SessionError> {
        let duration = read_duration(self.probe, &request.audio)?;
        let segments = plan(duration, self.config.segment_length)
            .map_err(|e| SessionError::AudioLoad(e.to_string()))?;
        info!(%run_id, duration, segments = segments.len(), "segments planned");

        self.transition(|state| state.planned(run_id, segments.len()));
        observer.on_state(&self.state);

        let backend = self.backend;
        let state = &mut self.state;
        let images = GenerationPipeline::new(backend)
            .run(&segments, &request.prompt, request.style, |progress, images| {
                let Some(latest) = images.last() else {
                    return;
                };
                let current = std::mem::take(&mut *state);
                *state = current.progressed(run_id, *progress, latest.clone());
                observer.on_state(state);
            })
            .await
            .map_err(SessionError::Generation)?;

        self.transition(|state| state.completed(run_id, images, duration));
        info!(%run_id, "run complete");
        Ok(())
    }

    fn transition(&mut self, f: impl FnOnce(SessionState) -> SessionState) {
        let current = std::mem::take(&mut self.state);
        self.state = f(current);
    }
}

/// Read the track duration. The probe handle is released before this
/// returns, whatever the outcome.
pub fn read_duration(probe: &dyn AudioProbe, audio: &AudioFile) -> Result<Seconds, SessionError> {
    let handle = probe
        .open(audio)
        .map_err(|e| SessionError::AudioLoad(e.to_string()))?;
    let duration = handle.duration();
    drop(handle);
    duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            SessionError::AudioLoad(format!("no usable duration for {}", audio.path().display()))
        })
}
