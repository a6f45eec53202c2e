//! Hand-drawn signature handling.
//!
//! The form posts the signature canvas as a `data:` URI. This module decodes it
//! and checks that it carries actual strokes rather than an empty or freshly
//! initialized canvas.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageReader, Limits, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Canvas edge length beyond which a signature is refused without decoding.
pub const MAX_SIGNATURE_EDGE: u32 = 4096;

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("signature is empty")]
    Empty,
    #[error("signature is not a data URI")]
    NotDataUri,
    #[error("unsupported signature media type '{0}'")]
    UnsupportedMediaType(String),
    #[error("signature payload is not base64 encoded")]
    NotBase64,
    #[error("signature payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("signature payload does not match its declared image type")]
    MismatchedContent,
    #[error("signature image cannot be decoded: {0}")]
    Undecodable(String),
    #[error("signature canvas is blank")]
    Blank,
}

/// Raster formats accepted from the signature canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Detect the format from magic bytes.
    fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        None
    }

    fn raster_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// A decoded signature raster.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl SignatureImage {
    /// Decode and sanity-check a `data:image/...;base64,...` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, SignatureError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(SignatureError::Empty);
        }

        let rest = uri.strip_prefix("data:").ok_or(SignatureError::NotDataUri)?;
        let (meta, payload) = rest.split_once(',').ok_or(SignatureError::NotDataUri)?;

        let mut meta_parts = meta.split(';');
        let mime = meta_parts.next().unwrap_or_default();
        let is_base64 = meta_parts.any(|part| part.eq_ignore_ascii_case("base64"));

        let declared = ImageFormat::from_mime(mime)
            .ok_or_else(|| SignatureError::UnsupportedMediaType(mime.to_string()))?;
        if !is_base64 {
            return Err(SignatureError::NotBase64);
        }
        if payload.trim().is_empty() {
            return Err(SignatureError::Empty);
        }

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| SignatureError::InvalidBase64(e.to_string()))?;

        if ImageFormat::sniff(&bytes) != Some(declared) {
            return Err(SignatureError::MismatchedContent);
        }
        if is_blank(&decode_raster(&bytes, declared)?) {
            return Err(SignatureError::Blank);
        }

        Ok(Self {
            format: declared,
            bytes,
        })
    }

    /// File name used when the image is written next to a document source.
    pub fn file_name(&self) -> String {
        format!("signature.{}", self.format.extension())
    }
}

fn decode_raster(bytes: &[u8], format: ImageFormat) -> Result<RgbaImage, SignatureError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SIGNATURE_EDGE);
    limits.max_image_height = Some(MAX_SIGNATURE_EDGE);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format.raster_format());
    reader.limits(limits);
    let decoded = reader
        .decode()
        .map_err(|e| SignatureError::Undecodable(e.to_string()))?;
    Ok(decoded.to_rgba8())
}

/// True when no pixel differs from the canvas background: every pixel is
/// fully transparent, or all pixels share one colour.
fn is_blank(raster: &RgbaImage) -> bool {
    let mut pixels = raster.pixels();
    let Some(first) = pixels.next() else {
        return true;
    };
    let transparent = first.0[3] == 0;
    pixels.all(|pixel| pixel == first || (transparent && pixel.0[3] == 0))
}
