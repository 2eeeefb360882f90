use serde::{Deserialize, Serialize};
use thiserror::Error;

mod clock;
pub use clock::*;
mod segments;
pub use segments::*;
mod transport;
pub use transport::*;
mod playback;
pub use playback::*;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("invalid duration: {0} (expected a finite number of seconds > 0)")]
    InvalidDuration(f64),
    #[error("invalid segment length: {0} (expected a finite number of seconds > 0)")]
    InvalidSegmentLength(f64),
    #[error("{requested} segments requested, at most {max} are allowed")]
    TooManySegments { requested: f64, max: usize },
}

pub type Seconds = f64; // playback position or timestamp, in seconds

/// Length of the window each generated image covers.
pub const SEGMENT_DURATION: Seconds = 5.0;

/// One generated frame of the video, anchored at the start of its segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub timestamp: Seconds,
    /// `data:` URL carrying the encoded image.
    pub image_url: String,
}

impl GeneratedImage {
    pub fn new(timestamp: Seconds, image_url: impl Into<String>) -> Self {
        Self {
            timestamp,
            image_url: image_url.into(),
        }
    }
}
