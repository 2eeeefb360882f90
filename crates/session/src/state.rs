/// Session state machine
///
/// One value describes the whole session. Every transition consumes the
/// current value and returns the next one; nothing is mutated in place.
/// Results addressed to a run other than the active one are dropped.
use crate::error::VALIDATION_MESSAGE;
use ai_pipeline::{default_style, ArtStyle, GenerationProgress};
use media_io::AudioFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use timeline::{GeneratedImage, PlaybackSynchronizer, Seconds};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Idle,
    Generating,
    Ready,
}

/// Inputs collected before a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupState {
    pub audio: Option<AudioFile>,
    pub prompt: String,
    pub style: &'static ArtStyle,
    /// Message from the last failed submission or run
    pub error: Option<String>,
}

impl Default for SetupState {
    fn default() -> Self {
        Self {
            audio: None,
            prompt: String::new(),
            style: default_style(),
            error: None,
        }
    }
}

impl SetupState {
    /// The run these inputs describe, if they are complete.
    pub fn request(&self) -> Option<GenerationRequest> {
        let audio = self.audio.clone()?;
        if self.prompt.trim().is_empty() {
            return None;
        }
        Some(GenerationRequest {
            audio,
            prompt: self.prompt.clone(),
            style: self.style,
        })
    }
}

/// Validated inputs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub audio: AudioFile,
    pub prompt: String,
    pub style: &'static ArtStyle,
}

impl GenerationRequest {
    fn into_setup(self, error: Option<String>) -> SetupState {
        SetupState {
            audio: Some(self.audio),
            prompt: self.prompt,
            style: self.style,
            error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratingState {
    pub run_id: RunId,
    pub request: GenerationRequest,
    pub progress: GenerationProgress,
    /// Images produced so far, in timestamp order
    pub images: Vec<GeneratedImage>,
}

impl GeneratingState {
    /// Most recent image; shown as the preview while the run continues.
    pub fn latest_image(&self) -> Option<&GeneratedImage> {
        self.images.last()
    }
}

#[derive(Debug, Clone)]
pub struct ReadyState {
    pub request: GenerationRequest,
    pub synchronizer: PlaybackSynchronizer,
}

impl ReadyState {
    pub fn audio(&self) -> &AudioFile {
        &self.request.audio
    }

    pub fn images(&self) -> &[GeneratedImage] {
        self.synchronizer.images()
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Idle(SetupState),
    Generating(GeneratingState),
    Ready(ReadyState),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle(SetupState::default())
    }
}

impl SessionState {
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionState::Idle(_) => SessionMode::Idle,
            SessionState::Generating(_) => SessionMode::Generating,
            SessionState::Ready(_) => SessionMode::Ready,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Idle(setup) => setup.error.as_deref(),
            _ => None,
        }
    }

    pub fn run_id(&self) -> Option<RunId> {
        match self {
            SessionState::Generating(generating) => Some(generating.run_id),
            _ => None,
        }
    }

    /// Images visible in the current mode. Idle never holds any.
    pub fn images(&self) -> &[GeneratedImage] {
        match self {
            SessionState::Idle(_) => &[],
            SessionState::Generating(generating) => &generating.images,
            SessionState::Ready(ready) => ready.images(),
        }
    }

    /// A selected file starts a new session. `None` (a rejected pick) changes
    /// nothing, and inputs are locked while a run is active.
    pub fn select_audio(self, audio: Option<AudioFile>) -> Self {
        let Some(audio) = audio else {
            return self;
        };
        match self {
            SessionState::Idle(setup) => SessionState::Idle(SetupState {
                audio: Some(audio),
                error: None,
                ..setup
            }),
            SessionState::Ready(ready) => SessionState::Idle(SetupState {
                audio: Some(audio),
                ..ready.request.into_setup(None)
            }),
            generating @ SessionState::Generating(_) => generating,
        }
    }

    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        match self {
            SessionState::Idle(setup) => SessionState::Idle(SetupState {
                prompt: prompt.into(),
                ..setup
            }),
            other => other,
        }
    }

    pub fn with_style(self, style: &'static ArtStyle) -> Self {
        match self {
            SessionState::Idle(setup) => SessionState::Idle(SetupState { style, ..setup }),
            other => other,
        }
    }

    /// Start a run from complete inputs. Incomplete inputs stay idle with the
    /// validation message set.
    pub fn submit(self) -> Self {
        match self {
            SessionState::Idle(setup) => match setup.request() {
                Some(request) => SessionState::Generating(GeneratingState {
                    run_id: RunId::new(),
                    request,
                    progress: GenerationProgress::default(),
                    images: Vec::new(),
                }),
                None => SessionState::Idle(SetupState {
                    error: Some(VALIDATION_MESSAGE.to_string()),
                    ..setup
                }),
            },
            other => other,
        }
    }

    /// Fix the run's total once the segment plan is known.
    pub fn planned(self, run_id: RunId, total: usize) -> Self {
        match self {
            SessionState::Generating(generating) if generating.run_id == run_id => {
                SessionState::Generating(GeneratingState {
                    progress: GenerationProgress::new(total),
                    images: Vec::new(),
                    ..generating
                })
            }
            other => other.ignore_stale(run_id, "plan"),
        }
    }

    /// Record one finished image. The partial sequence is extended in place,
    /// never rebuilt.
    pub fn progressed(
        self,
        run_id: RunId,
        progress: GenerationProgress,
        image: GeneratedImage,
    ) -> Self {
        match self {
            SessionState::Generating(mut generating) if generating.run_id == run_id => {
                let total = generating.progress.total;
                if generating.images.len() < total {
                    generating.images.push(image);
                }
                generating.progress = GenerationProgress {
                    completed: progress.completed.min(total),
                    total,
                };
                SessionState::Generating(generating)
            }
            other => other.ignore_stale(run_id, "progress"),
        }
    }

    pub fn completed(self, run_id: RunId, images: Vec<GeneratedImage>, duration: Seconds) -> Self {
        match self {
            SessionState::Generating(generating) if generating.run_id == run_id => {
                SessionState::Ready(ReadyState {
                    request: generating.request,
                    synchronizer: PlaybackSynchronizer::new(images, duration),
                })
            }
            other => other.ignore_stale(run_id, "completion"),
        }
    }

    /// Abort the run: back to idle with the inputs kept and `message` shown.
    /// Partial images are discarded.
    pub fn failed(self, run_id: RunId, message: &str) -> Self {
        match self {
            SessionState::Generating(generating) if generating.run_id == run_id => {
                SessionState::Idle(generating.request.into_setup(Some(message.to_string())))
            }
            other => other.ignore_stale(run_id, "failure"),
        }
    }

    /// Fresh idle session with the default style. Abandons any active run.
    pub fn start_over(self) -> Self {
        SessionState::default()
    }

    fn ignore_stale(self, run_id: RunId, what: &str) -> Self {
        debug!(%run_id, what, mode = ?self.mode(), "ignoring result for inactive run");
        self
    }
}
