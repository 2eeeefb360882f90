use ai_pipeline::decode_data_url;
use indicatif::{ProgressBar, ProgressStyle};
use session::{SessionObserver, SessionState};

const LOADING_MESSAGES: &[&str] = &[
    "Warming up the AI's creativity...",
    "Analyzing the song's vibe...",
    "Painting the first scene...",
    "Crafting the visual narrative...",
    "Syncing pixels to the beat...",
    "Almost there, adding finishing touches...",
];

/// Headline for a run that is `fraction` complete.
pub fn loading_message(fraction: f64) -> &'static str {
    let last = LOADING_MESSAGES.len() - 1;
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let index = ((fraction * last as f64).floor() as usize).min(last);
    LOADING_MESSAGES[index]
}

pub fn human_bytes(len: usize) -> String {
    if len < 1024 {
        format!("{len} B")
    } else if len < 1024 * 1024 {
        format!("{:.1} KiB", len as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", len as f64 / (1024.0 * 1024.0))
    }
}

/// Progress view shown while a run is generating.
#[derive(Default)]
pub struct GenerationView {
    bar: Option<ProgressBar>,
}

impl GenerationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn progress_bar(&mut self, total: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.magenta} {prefix:.bold} [{bar:40.magenta/blue}] {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar
        })
    }
}

impl SessionObserver for GenerationView {
    fn on_state(&mut self, state: &SessionState) {
        match state {
            SessionState::Generating(generating) if generating.progress.total > 0 => {
                let progress = generating.progress;
                let mut message = format!(
                    "Generating image {} of {}",
                    progress.completed, progress.total
                );
                if let Some(latest) = generating.latest_image() {
                    if let Ok(bytes) = decode_data_url(&latest.image_url) {
                        message.push_str(&format!(
                            " | latest frame @ {}s ({})",
                            latest.timestamp,
                            human_bytes(bytes.len())
                        ));
                    }
                }
                let bar = self.progress_bar(progress.total);
                bar.set_position(progress.completed as u64);
                bar.set_prefix(loading_message(progress.fraction()));
                bar.set_message(message);
            }
            SessionState::Generating(_) => {}
            SessionState::Idle(_) | SessionState::Ready(_) => self.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_message_bounds() {
        assert_eq!(loading_message(0.0), LOADING_MESSAGES[0]);
        assert_eq!(loading_message(1.0), LOADING_MESSAGES[5]);
        assert_eq!(loading_message(0.5), "Painting the first scene...");
        assert_eq!(loading_message(f64::NAN), LOADING_MESSAGES[0]);
        assert_eq!(loading_message(7.0), LOADING_MESSAGES[5]);
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
