/// Terminal player
///
/// A `ClockTransport` stands in for the audio element; the synchronizer is
/// fed its notifications on a fixed tick and every frame change is printed.
use ai_pipeline::decode_data_url;
use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use timeline::{ClockTransport, PlaybackStatus, PlaybackSynchronizer, Seconds, TransportEvent};
use tracing::debug;

use crate::view::human_bytes;

#[derive(Debug, Clone)]
pub struct PlayerOptions {
    /// Scrub to this fraction of the track before starting
    pub seek: Option<f64>,
    /// Play once more after the first finish
    pub replay: bool,
    /// Playback speed, 1.0 = normal
    pub rate: f64,
    pub tick: Duration,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            seek: None,
            replay: false,
            rate: 1.0,
            tick: Duration::from_millis(100),
        }
    }
}

pub fn format_clock(sec: Seconds) -> String {
    let sec = if sec.is_finite() { sec.max(0.0) } else { 0.0 };
    let whole = sec.floor() as u64;
    format!("{:02}:{:02}.{}", whole / 60, whole % 60, ((sec - whole as f64) * 10.0) as u64)
}

pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// One status line for the synchronizer's current frame.
pub fn frame_line(sync: &PlaybackSynchronizer) -> String {
    let total = sync.images().len();
    let mut line = format!(
        "{} / {} [{}] frame {}/{}",
        format_clock(sync.current_time()),
        format_clock(sync.duration()),
        progress_bar(sync.progress_fraction(), 30),
        sync.active_index() + 1,
        total
    );
    if let Some(image) = sync.active_image() {
        line.push_str(&format!(" @ {}s", image.timestamp));
        if let Ok(bytes) = decode_data_url(&image.image_url) {
            line.push_str(&format!(" ({})", human_bytes(bytes.len())));
        }
    }
    line
}

/// Handles transport notifications and decides when playback is over.
pub struct TerminalPlayer<W: Write> {
    out: W,
    replays_left: u32,
}

impl<W: Write> TerminalPlayer<W> {
    pub fn new(out: W, replay: bool) -> Self {
        Self {
            out,
            replays_left: u32::from(replay),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn show(&mut self, sync: &PlaybackSynchronizer) -> std::io::Result<()> {
        writeln!(self.out, "{}", frame_line(sync))
    }

    /// Apply one notification. Returns `false` once playback is done.
    pub fn handle(
        &mut self,
        sync: &mut PlaybackSynchronizer,
        transport: &mut ClockTransport,
        event: TransportEvent,
    ) -> std::io::Result<bool> {
        if sync.on_event(event).is_some() {
            self.show(sync)?;
        }
        if sync.status() != PlaybackStatus::Finished {
            return Ok(true);
        }
        writeln!(self.out, "finished")?;
        if self.replays_left == 0 {
            return Ok(false);
        }
        self.replays_left -= 1;
        sync.play(transport);
        writeln!(self.out, "replay")?;
        self.show(sync)?;
        Ok(true)
    }
}

/// Play `sync` to the end in real time.
pub async fn play(sync: &mut PlaybackSynchronizer, options: &PlayerOptions) -> Result<()> {
    let mut transport = ClockTransport::new(sync.duration());
    transport.set_rate(options.rate);
    let mut player = TerminalPlayer::new(std::io::stdout(), options.replay);

    if let Some(fraction) = options.seek {
        sync.scrub(fraction, &mut transport);
    }
    sync.play(&mut transport);
    player.show(sync)?;

    let mut ticker = tokio::time::interval(options.tick);
    loop {
        ticker.tick().await;
        while let Some(event) = transport.poll() {
            if !player.handle(sync, &mut transport, event)? {
                debug!("player done");
                return Ok(());
            }
        }
    }
}
