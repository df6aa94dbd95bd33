//! # ClipSaver Media
//!
//! The two external collaborators of the watcher: the system clipboard and
//! the image codec. Both sit behind traits so the poll loop can be driven by
//! fakes in tests.

pub mod clipboard;
pub mod codec;

pub use clipboard::{ArboardClipboard, Clipboard};
pub use codec::{Codec, EncodeFormat, ImageCodec};

use thiserror::Error;

/// Media error types.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed clipboard image: {0}")]
    MalformedImage(String),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
