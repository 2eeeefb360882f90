/// Music video session
///
/// Ties intake, duration probing, segment planning, generation and playback
/// into one session whose state is a single `idle | generating | ready`
/// value.

pub mod config;
pub mod error;
pub mod observer;
pub mod state;
pub mod studio;

pub use config::SessionConfig;
pub use error::{
    SessionError, AUDIO_LOAD_MESSAGE, GENERATION_MESSAGE, NOT_IDLE_MESSAGE, VALIDATION_MESSAGE,
};
pub use observer::{NullObserver, SessionObserver};
pub use state::{
    GeneratingState, GenerationRequest, ReadyState, RunId, SessionMode, SessionState, SetupState,
};
pub use studio::{read_duration, Studio};
