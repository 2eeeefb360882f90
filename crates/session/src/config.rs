use serde::{Deserialize, Serialize};
use timeline::{Seconds, SEGMENT_DURATION};

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of audio covered by each generated image
    pub segment_length: Seconds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            segment_length: SEGMENT_DURATION,
        }
    }
}

impl SessionConfig {
    /// With segment length
    pub fn with_segment_length(mut self, seconds: Seconds) -> Self {
        self.segment_length = seconds;
        self
    }
}
