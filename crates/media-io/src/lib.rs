use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
mod probe;
pub use probe::{AudioProbe, DefaultProbe, FfprobeProbe, ProbeHandle, SymphoniaProbe};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported audio container: {0}")]
    Unsupported(String),
    #[error("ffprobe not found on PATH; please install FFmpeg (ffprobe)")]
    FfprobeMissing,
    #[error("ffprobe failed: {0}")]
    FfprobeFailed(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("duration unavailable for {0}")]
    MissingDuration(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    Video,
    Image,
    Audio,
}

impl MediaKind {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let top = media_type.split('/').next()?.trim().to_ascii_lowercase();
        match top.as_str() {
            "audio" => Some(MediaKind::Audio),
            "video" => Some(MediaKind::Video),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }
}

/// Media type for a path, from its extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" | "wave" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "weba" => "audio/webm",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(media_type)
}

/// An audio file accepted by intake. Only constructible for `audio/*` media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFile {
    path: PathBuf,
    media_type: String,
}

impl AudioFile {
    /// Accept `path` if it is an existing file with an audio media type.
    /// Anything else yields `None`; rejection is not an error.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let media_type = media_type_for_path(path)?;
        let file = Self::from_media_type(path, media_type)?;
        if !path.is_file() {
            tracing::debug!("ignoring missing audio file {:?}", path);
            return None;
        }
        Some(file)
    }

    /// Accept a file whose media type is already known (e.g. from a drop event).
    pub fn from_media_type(path: impl AsRef<Path>, media_type: &str) -> Option<Self> {
        if MediaKind::from_media_type(media_type) != Some(MediaKind::Audio) {
            tracing::debug!(media_type, "ignoring non-audio file");
            return None;
        }
        Some(Self {
            path: path.as_ref().to_path_buf(),
            media_type: media_type.to_ascii_lowercase(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// File name cut to `max_chars` characters with a trailing `...`.
    pub fn display_name(&self, max_chars: usize) -> String {
        let name = self.file_name();
        if name.chars().count() <= max_chars {
            return name;
        }
        let mut short: String = name.chars().take(max_chars).collect();
        short.push_str("...");
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_lookup() {
        assert_eq!(media_type_for_path(Path::new("song.MP3")), Some("audio/mpeg"));
        assert_eq!(media_type_for_path(Path::new("clip.mov")), Some("video/quicktime"));
        assert_eq!(media_type_for_path(Path::new("README")), None);
    }

    #[test]
    fn test_only_audio_media_types_are_accepted() {
        assert!(AudioFile::from_media_type("a.bin", "audio/x-custom").is_some());
        assert!(AudioFile::from_media_type("a.mp4", "video/mp4").is_none());
        assert!(AudioFile::from_media_type("a.txt", "text/plain").is_none());
        assert!(AudioFile::from_media_type("a", "").is_none());
    }

    #[test]
    fn test_from_path_requires_existing_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("song.wav");
        assert!(AudioFile::from_path(&song).is_none());

        std::fs::write(&song, b"RIFF").unwrap();
        let file = AudioFile::from_path(&song).unwrap();
        assert_eq!(file.media_type(), "audio/wav");
        assert_eq!(file.file_name(), "song.wav");

        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();
        assert!(AudioFile::from_path(&notes).is_none());
    }

    #[test]
    fn test_display_name_truncation() {
        let file =
            AudioFile::from_media_type("/music/a-very-long-track-name-for-the-upload.mp3", "audio/mpeg")
                .unwrap();
        assert_eq!(file.display_name(30), "a-very-long-track-name-for-the...");
        assert_eq!(file.display_name(100), "a-very-long-track-name-for-the-upload.mp3");
    }
}
