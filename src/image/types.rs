//! Core image types.

use crate::error::{Result, StudioError};
use base64::Engine;
use serde::Serialize;
use std::path::Path;

/// Media type every returned image is labelled with when rendered.
pub const OUTPUT_MEDIA_TYPE: &str = "image/png";

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Parses a MIME type such as `image/jpeg`.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPG"),
            Self::WebP => write!(f, "WEBP"),
        }
    }
}

/// An uploaded image held as base64 text plus its media type and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
    media_type: String,
    name: String,
}

impl EncodedImage {
    /// Wraps an already-encoded base64 payload.
    pub fn new(
        data: impl Into<String>,
        media_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
            name: name.into(),
        }
    }

    /// The base64 payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The media type label, e.g. `image/png`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The upload format, if the media type is one of the supported ones.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.media_type)
    }

    /// Size of the decoded payload in bytes, computed from the base64 length.
    pub fn decoded_len(&self) -> usize {
        let len = self.data.len();
        let padding = self.data.bytes().rev().take_while(|&b| b == b'=').count();
        ((len / 4) * 3 + (len % 4).saturating_sub(1)).saturating_sub(padding.min(2))
    }

    /// Returns the image as a data URL using its own media type.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Image data returned by the transformation service.
///
/// The payload is kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be saved or rendered"]
pub struct GeneratedImage {
    /// Base64 payload as returned by the service.
    pub data: String,
}

impl GeneratedImage {
    /// Wraps a base64 payload.
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the image as a displayable data URL.
    ///
    /// Always labelled `image/png`, whatever the service actually encoded.
    pub fn to_data_url(&self) -> String {
        format!("data:{OUTPUT_MEDIA_TYPE};base64,{}", self.data)
    }

    /// Decodes the payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Format detected from the decoded bytes, if recognisable.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        self.decode()
            .ok()
            .and_then(|bytes| ImageFormat::from_magic_bytes(&bytes))
    }

    /// Decodes the payload and writes it to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.decode()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}
