//! Image encoding.
//!
//! PNG is the lossless reference. WebP and JPEG are the lossy targets and
//! take a 0-100 quality.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{MediaError, MediaResult};

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    Png,
    #[serde(alias = "WEBP", alias = "WebP")]
    Webp,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl EncodeFormat {
    pub fn is_lossless(&self) -> bool {
        matches!(self, EncodeFormat::Png)
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Png => "png",
            EncodeFormat::Webp => "webp",
            EncodeFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodeFormat::Png => "image/png",
            EncodeFormat::Webp => "image/webp",
            EncodeFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for EncodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodeFormat::Png => "PNG",
            EncodeFormat::Webp => "WEBP",
            EncodeFormat::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}

impl FromStr for EncodeFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(EncodeFormat::Png),
            "webp" => Ok(EncodeFormat::Webp),
            "jpeg" | "jpg" => Ok(EncodeFormat::Jpeg),
            other => Err(MediaError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encodes and decodes in-memory images.
pub trait Codec {
    /// Encode `image` as `format`. `quality` is ignored by lossless formats.
    fn encode(&self, image: &DynamicImage, format: EncodeFormat, quality: u8) -> MediaResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> MediaResult<DynamicImage>;
}

/// Codec backed by the `image` crate, with libwebp for lossy WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }

    /// Load an image file from disk.
    pub fn open(path: &Path) -> MediaResult<DynamicImage> {
        Ok(image::open(path)?)
    }

    fn encode_png(image: &DynamicImage) -> MediaResult<Vec<u8>> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }

    fn encode_webp(image: &DynamicImage, quality: u8) -> MediaResult<Vec<u8>> {
        // libwebp only accepts 8-bit RGB or RGBA buffers
        let owned;
        let source = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other => {
                owned = DynamicImage::ImageRgba8(other.to_rgba8());
                &owned
            }
        };

        let encoder = webp::Encoder::from_image(source).map_err(|e| MediaError::Encode(e.to_string()))?;
        let memory = encoder.encode(quality as f32);
        Ok(memory.to_vec())
    }

    fn encode_jpeg(image: &DynamicImage, quality: u8) -> MediaResult<Vec<u8>> {
        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.max(1));
        encoder.encode_image(&rgb)?;
        Ok(bytes)
    }
}

impl Codec for ImageCodec {
    fn encode(&self, image: &DynamicImage, format: EncodeFormat, quality: u8) -> MediaResult<Vec<u8>> {
        let quality = quality.min(100);
        match format {
            EncodeFormat::Png => Self::encode_png(image),
            EncodeFormat::Webp => Self::encode_webp(image, quality),
            EncodeFormat::Jpeg => Self::encode_jpeg(image, quality),
        }
    }

    fn decode(&self, bytes: &[u8]) -> MediaResult<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }
}
