//! Clipboard adapter.
//!
//! Implements `Clipboard` using arboard for cross-platform clipboard access.

use std::borrow::Cow;

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::{MediaError, MediaResult};

/// Read/write access to the system clipboard.
pub trait Clipboard {
    /// Current clipboard image, or `None` when the clipboard holds no image.
    fn read_image(&mut self) -> MediaResult<Option<DynamicImage>>;

    /// Replace the clipboard contents with `image`.
    ///
    /// Returns the image as a later `read_image` will see it, which may differ
    /// in pixel layout from `image` (the system clipboard stores RGBA).
    fn write_image(&mut self, image: &DynamicImage) -> MediaResult<DynamicImage>;

    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> MediaResult<()>;
}

/// Clipboard implementation using arboard.
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> MediaResult<Self> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for ArboardClipboard {
    fn read_image(&mut self) -> MediaResult<Option<DynamicImage>> {
        let data = match self.inner.get_image() {
            Ok(data) => data,
            // Text, files or an empty clipboard
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (width, height) = (data.width as u32, data.height as u32);
        let image = RgbaImage::from_raw(width, height, data.bytes.into_owned()).ok_or_else(|| {
            MediaError::MalformedImage(format!(
                "{}x{} buffer does not match RGBA layout",
                width, height
            ))
        })?;

        debug!(width, height, "Read clipboard image");
        Ok(Some(DynamicImage::ImageRgba8(image)))
    }

    fn write_image(&mut self, image: &DynamicImage) -> MediaResult<DynamicImage> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        self.inner.set_image(arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Borrowed(rgba.as_raw().as_slice()),
        })?;
        debug!(width, height, "Wrote clipboard image");
        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn write_text(&mut self, text: &str) -> MediaResult<()> {
        self.inner.set_text(text.to_string())?;
        debug!(len = text.len(), "Wrote clipboard text");
        Ok(())
    }
}
