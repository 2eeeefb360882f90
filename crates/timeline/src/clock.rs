use crate::Seconds;
use std::time::Instant;

/// Wall-clock driven playback position.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    pub playing: bool,
    pub rate: f64, // 1.0 = normal
    pub anchor_instant: Option<Instant>,
    pub anchor_sec: Seconds, // position at anchor
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            playing: false,
            rate: 1.0,
            anchor_instant: None,
            anchor_sec: 0.0,
        }
    }
}

impl PlaybackClock {
    pub fn play(&mut self, current_sec: Seconds) {
        self.play_at(current_sec, Instant::now());
    }

    pub fn play_at(&mut self, current_sec: Seconds, at: Instant) {
        self.playing = true;
        self.anchor_sec = current_sec;
        self.anchor_instant = Some(at);
    }

    pub fn pause(&mut self, current_sec: Seconds) {
        self.playing = false;
        self.anchor_sec = current_sec;
        self.anchor_instant = None;
    }

    pub fn set_rate(&mut self, rate: f64, current_sec: Seconds) {
        // re-anchor to avoid jumps
        self.anchor_sec = current_sec;
        if self.playing {
            self.anchor_instant = Some(Instant::now());
        }
        self.rate = rate;
    }

    pub fn now(&self) -> Seconds {
        self.now_at(Instant::now())
    }

    pub fn now_at(&self, at: Instant) -> Seconds {
        match (self.playing, self.anchor_instant) {
            (true, Some(anchor)) => {
                let dt = at.saturating_duration_since(anchor).as_secs_f64();
                self.anchor_sec + dt * self.rate
            }
            _ => self.anchor_sec,
        }
    }

    pub fn seek_to(&mut self, sec: Seconds) {
        self.anchor_sec = sec;
        if self.playing {
            self.anchor_instant = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_paused_clock_holds_position() {
        let mut clock = PlaybackClock::default();
        clock.seek_to(3.5);
        assert_eq!(clock.now(), 3.5);
    }

    #[test]
    fn test_playing_clock_advances_with_rate() {
        let start = Instant::now();
        let mut clock = PlaybackClock::default();
        clock.rate = 2.0;
        clock.play_at(1.0, start);
        let t = clock.now_at(start + Duration::from_millis(500));
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_freezes_position() {
        let start = Instant::now();
        let mut clock = PlaybackClock::default();
        clock.play_at(0.0, start);
        let t = clock.now_at(start + Duration::from_secs(4));
        clock.pause(t);
        assert!(!clock.playing);
        assert_eq!(clock.now(), 4.0);
    }
}
