//! Generated test-pattern source
//!
//! Each frame is a solid colour stepping through a fixed palette, so a
//! video-textured object visibly changes without any media files on disk.

use std::time::Duration;

use super::source::{interval_for, FrameDecoder};
use super::MediaError;
use crate::assets::ImageData;

const PALETTE: [[u8; 4]; 6] = [
    [230, 60, 60, 255],
    [60, 200, 80, 255],
    [250, 160, 40, 255],
    [60, 110, 230, 255],
    [240, 220, 60, 255],
    [150, 70, 200, 255],
];

/// Decoder producing a fixed number of solid-colour frames
#[derive(Debug, Clone)]
pub struct TestPatternDecoder {
    frame_count: u64,
    interval: Duration,
    width: u32,
    height: u32,
    position: u64,
}

impl TestPatternDecoder {
    /// Locator prefix
    pub const SCHEME: &'static str = "pattern:";

    /// Edge length of generated frames
    pub const FRAME_SIZE: u32 = 64;

    /// Pattern with `frame_count` frames at `frame_rate`
    pub fn new(frame_count: u64, frame_rate: f64) -> Self {
        Self {
            frame_count,
            interval: interval_for(frame_rate),
            width: Self::FRAME_SIZE,
            height: Self::FRAME_SIZE,
            position: 0,
        }
    }

    /// Parse `<frames>[@<fps>]`
    pub fn parse(pattern: &str, default_frame_rate: f64) -> Result<Self, String> {
        let (frames, fps) = match pattern.split_once('@') {
            Some((frames, fps)) => (frames, Some(fps)),
            None => (pattern, None),
        };

        let frame_count: u64 = frames
            .trim()
            .parse()
            .map_err(|_| format!("bad frame count '{frames}'"))?;
        if frame_count == 0 {
            return Err("pattern needs at least one frame".to_string());
        }

        let frame_rate = match fps {
            Some(fps) => fps
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|rate| rate.is_finite() && *rate > 0.0)
                .ok_or_else(|| format!("bad frame rate '{fps}'"))?,
            None => default_frame_rate,
        };

        Ok(Self::new(frame_count, frame_rate))
    }

    /// Frames per pass
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameDecoder for TestPatternDecoder {
    fn next_frame(&mut self) -> Result<Option<ImageData>, MediaError> {
        if self.position >= self.frame_count {
            return Ok(None);
        }
        let color = PALETTE[(self.position % PALETTE.len() as u64) as usize];
        self.position += 1;
        Ok(Some(ImageData::solid_color(self.width, self.height, color)))
    }

    fn rewind(&mut self) -> Result<(), MediaError> {
        self.position = 0;
        Ok(())
    }

    fn frame_interval(&self) -> Duration {
        self.interval
    }
}
