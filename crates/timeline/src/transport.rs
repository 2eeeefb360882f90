use crate::{PlaybackClock, Seconds};
use std::time::Instant;

/// Audio playback capability the synchronizer drives.
///
/// `duration` is NaN while unknown.
pub trait AudioTransport {
    fn duration(&self) -> Seconds;
    fn current_time(&self) -> Seconds;
    fn set_current_time(&mut self, sec: Seconds);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}

/// Notifications emitted by a transport while it plays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    TimeUpdate(Seconds),
    Ended,
}

/// Transport backed by a [`PlaybackClock`]; advances with wall time and
/// produces no sound.
#[derive(Debug, Clone)]
pub struct ClockTransport {
    duration: Seconds,
    clock: PlaybackClock,
    end_pending: bool,
}

impl ClockTransport {
    pub fn new(duration: Seconds) -> Self {
        Self {
            duration,
            clock: PlaybackClock::default(),
            end_pending: false,
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Change playback speed without moving the position. Non-positive or
    /// non-finite rates are ignored.
    pub fn set_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            tracing::warn!(rate, "ignoring invalid playback rate");
            return;
        }
        let now = self.current_time();
        self.clock.set_rate(rate, now);
    }

    pub fn poll(&mut self) -> Option<TransportEvent> {
        self.poll_at(Instant::now())
    }

    /// Next notification at `at`: a time update while playing, then one
    /// `Ended` after the position reaches the duration.
    pub fn poll_at(&mut self, at: Instant) -> Option<TransportEvent> {
        if self.end_pending {
            self.end_pending = false;
            return Some(TransportEvent::Ended);
        }
        if !self.clock.playing {
            return None;
        }
        let now = self.clock.now_at(at);
        if self.duration.is_finite() && now >= self.duration {
            self.clock.pause(self.duration);
            self.end_pending = true;
            return Some(TransportEvent::TimeUpdate(self.duration));
        }
        Some(TransportEvent::TimeUpdate(now))
    }

    fn clamp(&self, sec: Seconds) -> Seconds {
        let sec = sec.max(0.0);
        if self.duration.is_finite() {
            sec.min(self.duration)
        } else {
            sec
        }
    }
}

impl AudioTransport for ClockTransport {
    fn duration(&self) -> Seconds {
        self.duration
    }

    fn current_time(&self) -> Seconds {
        self.clamp(self.clock.now())
    }

    fn set_current_time(&mut self, sec: Seconds) {
        let sec = self.clamp(sec);
        self.end_pending = false;
        self.clock.seek_to(sec);
    }

    fn play(&mut self) {
        let now = self.current_time();
        self.clock.play(now);
    }

    fn pause(&mut self) {
        let now = self.current_time();
        self.clock.pause(now);
    }

    fn is_paused(&self) -> bool {
        !self.clock.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_paused_transport_is_silent() {
        let mut transport = ClockTransport::new(10.0);
        assert!(transport.is_paused());
        assert_eq!(transport.poll(), None);
    }

    #[test]
    fn test_transport_reports_end_once() {
        let mut transport = ClockTransport::new(2.0);
        transport.play();
        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(
            transport.poll_at(later),
            Some(TransportEvent::TimeUpdate(2.0))
        );
        assert_eq!(transport.poll_at(later), Some(TransportEvent::Ended));
        assert_eq!(transport.poll_at(later), None);
        assert!(transport.is_paused());
        assert_eq!(transport.current_time(), 2.0);
    }

    #[test]
    fn test_rate_scales_playback() {
        let mut transport = ClockTransport::new(60.0);
        transport.set_rate(2.0);
        transport.set_rate(0.0);
        assert_eq!(transport.clock().rate, 2.0);

        transport.play();
        let later = Instant::now() + Duration::from_secs(3);
        match transport.poll_at(later) {
            Some(TransportEvent::TimeUpdate(t)) => assert!(t >= 6.0 && t < 7.0),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_seek_is_clamped_to_track() {
        let mut transport = ClockTransport::new(20.0);
        transport.set_current_time(25.0);
        assert_eq!(transport.current_time(), 20.0);
        transport.set_current_time(-1.0);
        assert_eq!(transport.current_time(), 0.0);
    }
}
