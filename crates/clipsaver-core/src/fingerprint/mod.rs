//! Content fingerprinting for clipboard images.
//!
//! A fingerprint identifies clipboard content independent of its encoding.
//! Strategies are pluggable behind [`Fingerprinter`] so the change detector
//! does not care how the digest was derived.

pub mod model;

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

pub use model::{Fingerprint, ImageSample, PixelValue};

/// Derives a [`Fingerprint`] from a decoded image. Never fails.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint;
}

/// Available fingerprinting strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    #[default]
    Sampled,
    Full,
}

impl FingerprintKind {
    pub fn build(self) -> Box<dyn Fingerprinter> {
        match self {
            FingerprintKind::Sampled => Box::new(SampledFingerprinter),
            FingerprintKind::Full => Box::new(FullPixelFingerprinter),
        }
    }
}

/// SHA-256 of `content`, hex encoded.
fn sha256_hex(content: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content);
    Fingerprint::from_hex(hex::encode(hasher.finalize()))
}

/// Hashes dimensions plus five sampled pixels.
///
/// O(1) in image size. Two images that agree on size, corners and centre
/// collide. When sampling is impossible the digest covers only `"{w}x{h}"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampledFingerprinter;

impl Fingerprinter for SampledFingerprinter {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        match ImageSample::take(image) {
            Some(sample) => sha256_hex(sample.canonical().as_bytes()),
            None => {
                let (w, h) = image.dimensions();
                debug!(width = w, height = h, color = ?image.color(), "Pixel sampling unavailable, hashing dimensions only");
                sha256_hex(format!("{}x{}", w, h).as_bytes())
            }
        }
    }
}

/// Hashes dimensions plus every pixel as 8-bit RGBA.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPixelFingerprinter;

impl Fingerprinter for FullPixelFingerprinter {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        let (w, h) = image.dimensions();
        let mut hasher = Sha256::new();
        hasher.update(format!("{}x{}_", w, h).as_bytes());
        hasher.update(image.to_rgba8().as_raw());
        Fingerprint::from_hex(hex::encode(hasher.finalize()))
    }
}
