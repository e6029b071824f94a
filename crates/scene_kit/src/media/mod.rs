//! # Media streaming
//!
//! Frame decoders for video-like sources and the [`StreamingTextureBridge`]
//! that decodes on a background thread and hands the newest frame to the
//! render thread as texture contents.
//!
//! Locators understood by [`DefaultMediaOpener`]:
//!
//! - `pattern:<frames>[@<fps>]` generates solid-colour test frames
//! - any other string names a directory of PNG/JPEG frames, played in file
//!   name order

pub mod bridge;
pub mod image_sequence;
pub mod source;
pub mod test_pattern;

pub use bridge::StreamingTextureBridge;
pub use image_sequence::ImageSequenceDecoder;
pub use source::{DefaultMediaOpener, FrameDecoder, MediaOpener};
pub use test_pattern::TestPatternDecoder;

use std::time::Duration;

use thiserror::Error;

use crate::assets::ImageData;
use crate::render::RenderError;

/// Media errors
#[derive(Error, Debug)]
pub enum MediaError {
    /// The locator could not be opened
    #[error("Media source '{locator}' unavailable: {reason}")]
    SourceUnavailable {
        /// Locator passed to `start`
        locator: String,
        /// Why opening failed
        reason: String,
    },

    /// Decoding a frame failed mid-stream
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// The decoded frame could not be written into the texture
    #[error("Texture update failed: {0}")]
    TextureUpdate(#[from] RenderError),
}

/// Playback state of a [`StreamingTextureBridge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No decode session
    #[default]
    Stopped,
    /// A decode session is running
    Playing {
        /// Whether the stream rewinds at its end
        looping: bool,
    },
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Position in the session, strictly increasing (also across loop wraps)
    pub sequence: u64,
    /// Index of the frame within the source stream
    pub source_index: u64,
    /// Presentation time from the start of the session
    pub presentation_time: Duration,
    /// RGBA8 pixels
    pub image: ImageData,
}
