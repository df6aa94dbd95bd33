//! Fingerprint domain models.

use std::fmt;

use image::{ColorType, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Hex digest identifying clipboard content.
///
/// Equality is a heuristic "same image" test, not cryptographic image identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One sampled pixel, keeping only the channels the image actually has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelValue(Vec<u8>);

impl PixelValue {
    pub fn new(channels: Vec<u8>) -> Self {
        Self(channels)
    }

    pub fn channels(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PixelValue {
    /// Single-channel pixels render as a bare number, others as a tuple:
    /// `120`, `(255, 0, 0)`, `(255, 0, 0, 255)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [value] = self.0.as_slice() {
            return write!(f, "{}", value);
        }
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Dimensions plus the five sampled pixels of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    pub width: u32,
    pub height: u32,
    pub pixels: [PixelValue; 5],
}

impl ImageSample {
    /// The five sample coordinates: top-left, quarter, centre, three-quarter, bottom-right.
    pub fn sample_points(width: u32, height: u32) -> [(u32, u32); 5] {
        [
            (0, 0),
            (width / 4, height / 4),
            (width / 2, height / 2),
            (3 * width / 4, 3 * height / 4),
            (width.saturating_sub(1), height.saturating_sub(1)),
        ]
    }

    /// Sample `image`. Returns `None` when any point cannot be read.
    pub fn take(image: &DynamicImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        let layout = ChannelLayout::of(image.color())?;

        let mut pixels = Vec::with_capacity(5);
        for (x, y) in Self::sample_points(width, height) {
            if !image.in_bounds(x, y) {
                return None;
            }
            let rgba = image.get_pixel(x, y).0;
            pixels.push(layout.project(rgba));
        }

        let pixels: [PixelValue; 5] = pixels.try_into().ok()?;
        Some(Self { width, height, pixels })
    }

    /// Canonical `"{w}x{h}_{p0}_{p1}_{p2}_{p3}_{p4}"` encoding.
    pub fn canonical(&self) -> String {
        let pixels: Vec<String> = self.pixels.iter().map(|p| p.to_string()).collect();
        format!("{}x{}_{}", self.width, self.height, pixels.join("_"))
    }
}

/// Which channels of an 8-bit RGBA read survive into the sample.
#[derive(Debug, Clone, Copy)]
enum ChannelLayout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Only 8-bit colour types are sampled; wider types fall back to the
    /// dimensions-only hash.
    fn of(color: ColorType) -> Option<Self> {
        match color {
            ColorType::L8 => Some(Self::Luma),
            ColorType::La8 => Some(Self::LumaAlpha),
            ColorType::Rgb8 => Some(Self::Rgb),
            ColorType::Rgba8 => Some(Self::Rgba),
            _ => None,
        }
    }

    fn project(self, [r, g, b, a]: [u8; 4]) -> PixelValue {
        let channels = match self {
            Self::Luma => vec![r],
            Self::LumaAlpha => vec![r, a],
            Self::Rgb => vec![r, g, b],
            Self::Rgba => vec![r, g, b, a],
        };
        PixelValue::new(channels)
    }
}
