/// Sequential image generation over a segment plan
///
/// One request in flight at a time, in timestamp order. Each finished image
/// is reported together with the partial sequence so a caller can show the
/// latest frame while the rest are still generating.
use crate::backends::{BackendError, ImageBackend};
use crate::prompt::build_scene_prompt;
use crate::styles::ArtStyle;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use timeline::{GeneratedImage, Segment};
use tracing::{debug, info};

/// Generation progress for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationProgress {
    /// Images generated so far
    pub completed: usize,

    /// Images this run will produce; fixed when the run starts
    pub total: usize,
}

impl GenerationProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Completed share in `[0, 1]`; 0 when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed.min(self.total) as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no segments to generate")]
    NoSegments,
    #[error("image generation failed for segment {segment} (t={timestamp}s): {source}")]
    Generation {
        segment: usize,
        timestamp: f64,
        #[source]
        source: BackendError,
    },
}

pub struct GenerationPipeline<'a> {
    backend: &'a dyn ImageBackend,
}

impl<'a> GenerationPipeline<'a> {
    pub fn new(backend: &'a dyn ImageBackend) -> Self {
        Self { backend }
    }

    /// Generate one image per segment.
    ///
    /// `on_update` runs after every successful call with the new progress and
    /// the images produced so far. The first failure aborts the run; images
    /// already produced are dropped with it.
    pub async fn run<F>(
        &self,
        segments: &[Segment],
        base_prompt: &str,
        style: &ArtStyle,
        mut on_update: F,
    ) -> Result<Vec<GeneratedImage>, PipelineError>
    where
        F: FnMut(&GenerationProgress, &[GeneratedImage]),
    {
        if segments.is_empty() {
            return Err(PipelineError::NoSegments);
        }

        let mut ordered = segments.to_vec();
        ordered.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let mut progress = GenerationProgress::new(ordered.len());
        let mut images: Vec<GeneratedImage> = Vec::with_capacity(ordered.len());
        info!(
            backend = self.backend.name(),
            style = style.name,
            total = progress.total,
            "starting generation run"
        );

        for segment in &ordered {
            let prompt = build_scene_prompt(base_prompt, style, segment.timestamp);
            let start = Instant::now();
            let payload = self.backend.generate(&prompt).await.map_err(|source| {
                PipelineError::Generation {
                    segment: segment.index,
                    timestamp: segment.timestamp,
                    source,
                }
            })?;
            debug!(
                segment = segment.index,
                timestamp = segment.timestamp,
                latency_ms = start.elapsed().as_millis() as u64,
                "generated frame"
            );

            images.push(GeneratedImage::new(segment.timestamp, payload.to_data_url()));
            progress.completed += 1;
            on_update(&progress, &images);
        }

        info!(images = images.len(), "generation run complete");
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        let mut progress = GenerationProgress::new(4);
        assert_eq!(progress.fraction(), 0.0);
        progress.completed = 3;
        assert_eq!(progress.fraction(), 0.75);
        assert!(!progress.is_complete());
        progress.completed = 4;
        assert!(progress.is_complete());
        assert_eq!(GenerationProgress::default().fraction(), 0.0);
    }
}
