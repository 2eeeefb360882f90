/// Playback synchronization: maps the audio position to the generated image
/// that should be on screen, and owns the play/pause/replay state machine.
use crate::{AudioTransport, GeneratedImage, Seconds, TransportEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Loaded, never started
    Idle,
    Playing,
    Paused,
    /// Reached the end of the audio; the next play restarts from zero
    Finished,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_time: Seconds,
    pub is_playing: bool,
    pub is_finished: bool,
    pub active_image_index: usize,
}

/// Index of the last image whose window has started at `current_time`.
///
/// Falls back to 0 when the position precedes the first timestamp (or is NaN).
pub fn active_index_at(images: &[GeneratedImage], current_time: Seconds) -> usize {
    images
        .iter()
        .rposition(|image| image.timestamp <= current_time)
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    images: Vec<GeneratedImage>,
    status: PlaybackStatus,
    current_time: Seconds,
    duration: Seconds,
    active_index: usize,
}

impl PlaybackSynchronizer {
    pub fn new(images: Vec<GeneratedImage>, duration: Seconds) -> Self {
        Self {
            images,
            status: PlaybackStatus::Idle,
            current_time: 0.0,
            duration,
            active_index: 0,
        }
    }

    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_time(&self) -> Seconds {
        self.current_time
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_image(&self) -> Option<&GeneratedImage> {
        self.images.get(self.active_index)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_time: self.current_time,
            is_playing: self.status == PlaybackStatus::Playing,
            is_finished: self.status == PlaybackStatus::Finished,
            active_image_index: self.active_index,
        }
    }

    /// Position as a fraction of the track, in `[0, 1]`. Unknown duration reads as 0.
    pub fn progress_fraction(&self) -> f64 {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return 0.0;
        }
        let fraction = self.current_time / self.duration;
        if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        }
    }

    /// Start or resume. From `Finished` the position is reset to zero first.
    ///
    /// Returns the new active index when it changed.
    pub fn play(&mut self, transport: &mut dyn AudioTransport) -> Option<usize> {
        let changed = match self.status {
            PlaybackStatus::Playing => return None,
            PlaybackStatus::Finished => {
                transport.set_current_time(0.0);
                self.current_time = 0.0;
                self.recompute()
            }
            PlaybackStatus::Idle | PlaybackStatus::Paused => None,
        };
        transport.play();
        self.status = PlaybackStatus::Playing;
        tracing::debug!(position = self.current_time, "playback started");
        changed
    }

    pub fn pause(&mut self, transport: &mut dyn AudioTransport) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        transport.pause();
        self.current_time = transport.current_time();
        self.status = PlaybackStatus::Paused;
        tracing::debug!(position = self.current_time, "playback paused");
    }

    /// The single play/pause/replay control.
    pub fn toggle_play(&mut self, transport: &mut dyn AudioTransport) -> Option<usize> {
        if self.status == PlaybackStatus::Playing {
            self.pause(transport);
            None
        } else {
            self.play(transport)
        }
    }

    /// Seek to `fraction` of the track without touching play/pause state.
    ///
    /// Leaving the end of a finished track makes it resumable (paused) again.
    pub fn scrub(&mut self, fraction: f64, transport: &mut dyn AudioTransport) -> Option<usize> {
        let duration = transport.duration();
        if !duration.is_finite() || duration <= 0.0 || fraction.is_nan() {
            tracing::warn!(duration, fraction, "ignoring scrub without a usable duration");
            return None;
        }
        self.duration = duration;
        let target = fraction.clamp(0.0, 1.0) * duration;
        transport.set_current_time(target);
        self.current_time = target;
        if self.status == PlaybackStatus::Finished && target < duration {
            self.status = PlaybackStatus::Paused;
        }
        self.recompute()
    }

    /// Feed a transport notification. Returns the new active index when it changed.
    pub fn on_event(&mut self, event: TransportEvent) -> Option<usize> {
        match event {
            TransportEvent::TimeUpdate(sec) => {
                self.current_time = sec;
                self.recompute()
            }
            TransportEvent::Ended => {
                self.status = PlaybackStatus::Finished;
                tracing::debug!("playback finished");
                None
            }
        }
    }

    fn recompute(&mut self) -> Option<usize> {
        let index = active_index_at(&self.images, self.current_time);
        if index == self.active_index {
            return None;
        }
        self.active_index = index;
        Some(index)
    }
}
