/// Segment planning: splits an audio duration into fixed-length windows,
/// one generated image per window.
use crate::{Seconds, TimelineError};
use serde::{Deserialize, Serialize};

/// Upper bound on segments per track. Each one costs a generation request.
pub const MAX_SEGMENTS: usize = 4096;

/// A fixed-length window of the source audio, identified by its start time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub timestamp: Seconds,
}

/// Number of segments needed to cover `duration_seconds`. Never less than one
/// and never more than [`MAX_SEGMENTS`].
pub fn segment_count(
    duration_seconds: Seconds,
    segment_length: Seconds,
) -> Result<usize, TimelineError> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(TimelineError::InvalidDuration(duration_seconds));
    }
    if !segment_length.is_finite() || segment_length <= 0.0 {
        return Err(TimelineError::InvalidSegmentLength(segment_length));
    }
    let ratio = (duration_seconds / segment_length).ceil();
    if !ratio.is_finite() || ratio > MAX_SEGMENTS as f64 {
        return Err(TimelineError::TooManySegments {
            requested: ratio,
            max: MAX_SEGMENTS,
        });
    }
    Ok((ratio as usize).max(1))
}

/// Plan the ordered segments for a track.
///
/// Timestamps are `i * segment_length`. The last one is not clamped, so it
/// may start close to (or past the meaningful part of) the end of the audio.
pub fn plan(
    duration_seconds: Seconds,
    segment_length: Seconds,
) -> Result<Vec<Segment>, TimelineError> {
    let count = segment_count(duration_seconds, segment_length)?;
    let segments = (0..count)
        .map(|index| Segment {
            index,
            timestamp: index as Seconds * segment_length,
        })
        .collect();
    tracing::debug!(
        duration_seconds,
        segment_length,
        count,
        "planned segments"
    );
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamps(segments: &[Segment]) -> Vec<f64> {
        segments.iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn test_plan_exact_multiple() {
        let segments = plan(20.0, 5.0).unwrap();
        assert_eq!(timestamps(&segments), vec![0.0, 5.0, 10.0, 15.0]);
        assert_eq!(segments[3].index, 3);
    }

    #[test]
    fn test_plan_rounds_up_partial_window() {
        let segments = plan(21.3, 5.0).unwrap();
        assert_eq!(segments.len(), 5);
        // last window starts at 20s even though only 1.3s of audio remain
        assert_eq!(segments.last().unwrap().timestamp, 20.0);
    }

    #[test]
    fn test_plan_short_audio_gets_one_segment() {
        let segments = plan(0.001, 5.0).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].timestamp, 0.0);
        assert_eq!(segments[0].index, 0);
    }

    #[test]
    fn test_plan_count_matches_ceil() {
        for (d, l) in [(1.0_f64, 5.0_f64), (5.0, 5.0), (5.01, 5.0), (59.9, 2.5), (180.0, 7.0)] {
            let expected = (d / l).ceil() as usize;
            let segments = plan(d, l).unwrap();
            assert_eq!(segments.len(), expected.max(1), "d={d} l={l}");
            for (i, s) in segments.iter().enumerate() {
                assert_eq!(s.timestamp, i as f64 * l);
            }
        }
    }

    #[test]
    fn test_plan_rejects_bad_duration() {
        assert_eq!(plan(0.0, 5.0), Err(TimelineError::InvalidDuration(0.0)));
        assert_eq!(plan(-3.0, 5.0), Err(TimelineError::InvalidDuration(-3.0)));
        assert!(matches!(
            plan(f64::NAN, 5.0),
            Err(TimelineError::InvalidDuration(_))
        ));
        assert!(matches!(
            plan(f64::INFINITY, 5.0),
            Err(TimelineError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_plan_rejects_bad_segment_length() {
        assert_eq!(
            plan(10.0, 0.0),
            Err(TimelineError::InvalidSegmentLength(0.0))
        );
    }

    #[test]
    fn test_plan_rejects_oversized_plans() {
        assert!(matches!(
            plan(f64::MAX, f64::MIN_POSITIVE),
            Err(TimelineError::TooManySegments { max: MAX_SEGMENTS, .. })
        ));
        assert!(matches!(
            plan(180.0, 1e-6),
            Err(TimelineError::TooManySegments { max: MAX_SEGMENTS, .. })
        ));
        assert_eq!(plan(MAX_SEGMENTS as f64, 1.0).unwrap().len(), MAX_SEGMENTS);
        assert!(plan(MAX_SEGMENTS as f64 + 0.5, 1.0).is_err());
    }

    #[test]
    fn test_segment_serialization() {
        let json = serde_json::to_string(&Segment {
            index: 2,
            timestamp: 10.0,
        })
        .unwrap();
        assert!(json.contains("\"timestamp\":10.0"));
    }
}
