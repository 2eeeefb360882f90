/// Audio duration probing.
///
/// A probe opens the audio source and hands back a [`ProbeHandle`] that owns
/// it. The source is released when the handle is dropped, so callers scope
/// the handle to the metadata read.
use crate::{AudioFile, MediaError};
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use std::process::Command;
use symphonia::core::{
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::debug;

pub trait AudioProbe: Send + Sync {
    fn open(&self, file: &AudioFile) -> Result<Box<dyn ProbeHandle>, MediaError>;
}

/// An opened audio source. Dropping it releases the source.
pub trait ProbeHandle: Send {
    /// Track length in seconds, if the metadata carries it.
    fn duration(&self) -> Option<f64>;
}

/// Reads container metadata with Symphonia. No packets are decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaProbe;

struct SymphoniaHandle {
    path: PathBuf,
    format: Box<dyn FormatReader>,
}

impl AudioProbe for SymphoniaProbe {
    fn open(&self, file: &AudioFile) -> Result<Box<dyn ProbeHandle>, MediaError> {
        let src = File::open(file.path())?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());
        let mut hint = Hint::new();
        hint.mime_type(file.media_type());
        if let Some(ext) = file.path().extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| MediaError::Unsupported(e.to_string()))?;
        debug!("opened audio source {:?}", file.path());
        Ok(Box::new(SymphoniaHandle {
            path: file.path().to_path_buf(),
            format: probed.format,
        }))
    }
}

impl ProbeHandle for SymphoniaHandle {
    fn duration(&self) -> Option<f64> {
        let track = self.format.default_track()?;
        let params = &track.codec_params;
        let frames = params.n_frames?;
        if let Some(time_base) = params.time_base {
            let time = time_base.calc_time(frames);
            return Some(time.seconds as f64 + time.frac);
        }
        let rate = params.sample_rate.filter(|r| *r > 0)?;
        Some(frames as f64 / rate as f64)
    }
}

impl Drop for SymphoniaHandle {
    fn drop(&mut self) {
        debug!("released audio source {:?}", self.path);
    }
}

/// Asks `ffprobe` for the container duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeProbe;

#[derive(Debug, Clone, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeJson {
    format: Option<FfprobeFormat>,
}

struct FfprobeHandle {
    duration: Option<f64>,
}

impl ProbeHandle for FfprobeHandle {
    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

fn parse_ffprobe_duration(stdout: &[u8]) -> Result<Option<f64>, MediaError> {
    let parsed: FfprobeJson =
        serde_json::from_slice(stdout).map_err(|e| MediaError::Parse(e.to_string()))?;
    Ok(parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite()))
}

impl AudioProbe for FfprobeProbe {
    fn open(&self, file: &AudioFile) -> Result<Box<dyn ProbeHandle>, MediaError> {
        let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeMissing)?;
        let out = Command::new(ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-show_format")
            .arg("-print_format")
            .arg("json")
            .arg(file.path())
            .output()
            .map_err(|e| MediaError::FfprobeFailed(e.to_string()))?;
        if !out.status.success() {
            return Err(MediaError::FfprobeFailed(
                String::from_utf8_lossy(&out.stderr).into(),
            ));
        }
        let duration = parse_ffprobe_duration(&out.stdout)?;
        Ok(Box::new(FfprobeHandle { duration }))
    }
}

/// Symphonia first, ffprobe when the container metadata has no length or
/// Symphonia cannot read the container.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProbe;

impl AudioProbe for DefaultProbe {
    fn open(&self, file: &AudioFile) -> Result<Box<dyn ProbeHandle>, MediaError> {
        let symphonia_err = match SymphoniaProbe.open(file) {
            Ok(handle) if handle.duration().is_some() => return Ok(handle),
            Ok(_) => {
                debug!("no duration in container metadata for {:?}", file.path());
                None
            }
            Err(err) => {
                debug!("symphonia probe failed for {:?}: {err}", file.path());
                Some(err)
            }
        };
        match FfprobeProbe.open(file) {
            Ok(handle) => Ok(handle),
            Err(MediaError::FfprobeMissing) => {
                Err(symphonia_err
                    .unwrap_or_else(|| MediaError::MissingDuration(file.path().to_path_buf())))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &std::path::Path, seconds: u32, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(seconds * sample_rate) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_symphonia_reads_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 3, 8_000);

        let file = AudioFile::from_path(&path).unwrap();
        let handle = SymphoniaProbe.open(&file).unwrap();
        let duration = handle.duration().unwrap();
        assert!((duration - 3.0).abs() < 1e-6, "duration was {duration}");
    }

    #[test]
    fn test_default_probe_uses_symphonia_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_wav(&path, 1, 8_000);

        let file = AudioFile::from_path(&path).unwrap();
        let duration = DefaultProbe.open(&file).unwrap().duration();
        assert!(duration.is_some());
    }

    #[test]
    fn test_symphonia_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let file = AudioFile::from_path(&path).unwrap();
        assert!(matches!(
            SymphoniaProbe.open(&file),
            Err(MediaError::Unsupported(_))
        ));
    }

    #[test]
    fn test_parse_ffprobe_duration() {
        let json = br#"{"format": {"duration": "183.274000", "format_name": "mp3"}}"#;
        assert_eq!(parse_ffprobe_duration(json).unwrap(), Some(183.274));
        assert_eq!(parse_ffprobe_duration(br#"{"format": {}}"#).unwrap(), None);
        assert!(parse_ffprobe_duration(b"not json").is_err());
    }
}
