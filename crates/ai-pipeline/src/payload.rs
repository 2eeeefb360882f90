/// Image payloads returned by generation backends
///
/// Backends hand back base64 text. It is validated once here so an empty or
/// garbled response fails the call instead of reaching the player.
use crate::backends::BackendError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    base64: String,
    format: ImageFormat,
    byte_len: usize,
}

impl ImagePayload {
    /// Validate base64 image text from an API response.
    pub fn from_base64(encoded: &str) -> Result<Self, BackendError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(BackendError::invalid_response("empty image payload"));
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| BackendError::invalid_response(format!("image payload is not base64: {e}")))?;
        let format = sniff_format(&bytes)?;
        Ok(Self {
            base64: encoded.to_string(),
            format,
            byte_len: bytes.len(),
        })
    }

    /// Wrap already-encoded image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackendError> {
        let format = sniff_format(bytes)?;
        Ok(Self {
            base64: STANDARD.encode(bytes),
            format,
            byte_len: bytes.len(),
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Size of the decoded image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// `data:` URL suitable for [`timeline::GeneratedImage::image_url`].
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.base64)
    }
}

fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, BackendError> {
    if bytes.is_empty() {
        return Err(BackendError::invalid_response("empty image payload"));
    }
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(format),
        Ok(other) => Err(BackendError::invalid_response(format!(
            "unexpected image format {other:?}"
        ))),
        Err(e) => Err(BackendError::invalid_response(format!(
            "unrecognised image data: {e}"
        ))),
    }
}

/// Decode the bytes behind a `data:<mime>;base64,` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, BackendError> {
    let (header, data) = url
        .split_once(',')
        .ok_or_else(|| BackendError::invalid_response("malformed data URL"))?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(BackendError::invalid_response("data URL is not base64"));
    }
    STANDARD
        .decode(data)
        .map_err(|e| BackendError::invalid_response(format!("data URL is not base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // SOI marker + APP0 "JFIF" header; enough for format sniffing
    const JPEG_HEADER: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00,
    ];

    #[test]
    fn test_accepts_jpeg() {
        let encoded = STANDARD.encode(JPEG_HEADER);
        let payload = ImagePayload::from_base64(&encoded).unwrap();
        assert_eq!(payload.format(), ImageFormat::Jpeg);
        assert_eq!(payload.byte_len(), JPEG_HEADER.len());
        assert!(payload
            .to_data_url()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(matches!(
            ImagePayload::from_base64("   "),
            Err(BackendError::InvalidResponse(_))
        ));
        assert!(ImagePayload::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_rejects_malformed_payload() {
        assert!(ImagePayload::from_base64("%%% not base64 %%%").is_err());
        let text = STANDARD.encode(b"plain text, not an image");
        assert!(ImagePayload::from_base64(&text).is_err());
    }

    #[test]
    fn test_data_url_round_trip_bytes() {
        let payload = ImagePayload::from_bytes(JPEG_HEADER).unwrap();
        let bytes = decode_data_url(&payload.to_data_url()).unwrap();
        assert_eq!(bytes, JPEG_HEADER);
        assert!(decode_data_url("https://example.com/a.jpg").is_err());
    }
}
