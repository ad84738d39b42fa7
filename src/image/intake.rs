//! Turning uploaded files into [`EncodedImage`] values.
//!
//! Intake only encodes. Which formats and sizes are acceptable is decided by
//! [`IntakePolicy`], applied by the caller when an upload is accepted.

use crate::error::{Result, StudioError};
use crate::image::types::{EncodedImage, ImageFormat};
use base64::Engine;
use std::path::Path;

/// Default upload ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Media type used when neither magic bytes nor extension identify the file.
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Base64-encodes raw bytes into an [`EncodedImage`].
pub fn encode_bytes(
    bytes: &[u8],
    media_type: impl Into<String>,
    name: impl Into<String>,
) -> EncodedImage {
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    EncodedImage::new(data, media_type, name)
}

/// Reads an image file from disk.
///
/// The media type comes from the file's magic bytes, then its extension.
pub fn read_file(path: impl AsRef<Path>) -> Result<EncodedImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| StudioError::Decode(format!("{}: {e}", path.display())))?;

    let media_type = ImageFormat::from_magic_bytes(&bytes)
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .map(|f| f.mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(name = %name, media_type, bytes = bytes.len(), "read image file");
    Ok(encode_bytes(&bytes, media_type, name))
}

/// Splits a `data:<mime>;base64,<payload>` URL into an [`EncodedImage`].
pub fn decode_data_url(input: &str, name: impl Into<String>) -> Result<EncodedImage> {
    let parse_error = || StudioError::Decode("Failed to parse Base64 string from file.".into());

    let rest = input.trim().strip_prefix("data:").ok_or_else(parse_error)?;
    let (header, payload) = rest.split_once(',').ok_or_else(parse_error)?;
    let media_type = header.strip_suffix(";base64").ok_or_else(parse_error)?;
    if payload.is_empty() {
        return Err(parse_error());
    }

    Ok(EncodedImage::new(payload, media_type, name))
}

/// Which uploads the studio accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    /// Accepted formats.
    pub accepted: Vec<ImageFormat>,
    /// Maximum decoded size in bytes.
    pub max_bytes: usize,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            accepted: vec![ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP],
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl IntakePolicy {
    /// Checks an upload against this policy.
    pub fn check(&self, image: &EncodedImage) -> Result<()> {
        let format = image
            .format()
            .filter(|f| self.accepted.contains(f))
            .ok_or_else(|| {
                let accepted: Vec<String> = self.accepted.iter().map(|f| f.to_string()).collect();
                StudioError::Validation(format!(
                    "Unsupported image type '{}'. Please upload {}.",
                    image.media_type(),
                    accepted.join(", ")
                ))
            })?;

        let size = image.decoded_len();
        if size > self.max_bytes {
            return Err(StudioError::Validation(format!(
                "Image is too large ({:.1}MB). The limit is {}MB.",
                size as f64 / (1024.0 * 1024.0),
                self.max_bytes / (1024 * 1024)
            )));
        }

        tracing::debug!(name = image.name(), %format, size, "upload accepted");
        Ok(())
    }
}
