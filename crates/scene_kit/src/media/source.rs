//! Decoder and opener traits, and the locator dispatch used by default

use std::path::Path;
use std::time::Duration;

use super::{ImageSequenceDecoder, MediaError, TestPatternDecoder};
use crate::assets::ImageData;
use crate::config::MediaConfig;

/// Shortest pacing interval a decoder may report
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Sequential frame source owned by a decode thread
pub trait FrameDecoder {
    /// Decode the next frame, `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<ImageData>, MediaError>;

    /// Seek back to the first frame
    fn rewind(&mut self) -> Result<(), MediaError>;

    /// Time between consecutive frames
    fn frame_interval(&self) -> Duration;
}

/// Opens decoders for locators
pub trait MediaOpener {
    /// Open a decoder, or fail with [`MediaError::SourceUnavailable`]
    fn open(&self, locator: &str) -> Result<Box<dyn FrameDecoder + Send>, MediaError>;
}

/// Opener for test patterns and image-sequence directories
#[derive(Debug, Clone)]
pub struct DefaultMediaOpener {
    frame_rate: f64,
}

impl DefaultMediaOpener {
    /// Opener whose image sequences play at `config.default_frame_rate`
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            frame_rate: config.default_frame_rate,
        }
    }
}

impl Default for DefaultMediaOpener {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

impl MediaOpener for DefaultMediaOpener {
    fn open(&self, locator: &str) -> Result<Box<dyn FrameDecoder + Send>, MediaError> {
        if let Some(pattern) = locator.strip_prefix(TestPatternDecoder::SCHEME) {
            let decoder = TestPatternDecoder::parse(pattern, self.frame_rate).map_err(|reason| {
                MediaError::SourceUnavailable {
                    locator: locator.to_string(),
                    reason,
                }
            })?;
            return Ok(Box::new(decoder));
        }

        let decoder = ImageSequenceDecoder::open(Path::new(locator), self.frame_rate)?;
        Ok(Box::new(decoder))
    }
}

/// Interval for a frame rate, clamped to [`MIN_FRAME_INTERVAL`]
pub(crate) fn interval_for(frame_rate: f64) -> Duration {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Duration::from_secs_f64(1.0 / frame_rate).max(MIN_FRAME_INTERVAL)
    } else {
        MIN_FRAME_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_locator_opens() {
        let opener = DefaultMediaOpener::default();
        let mut decoder = opener.open("pattern:4@20").unwrap();
        assert_eq!(decoder.frame_interval(), Duration::from_millis(50));
        assert!(decoder.next_frame().unwrap().is_some());
    }

    #[test]
    fn test_bad_locators_are_unavailable() {
        let opener = DefaultMediaOpener::default();
        for locator in ["pattern:zero", "pattern:0", "/definitely/not/a/video"] {
            assert!(
                matches!(opener.open(locator), Err(MediaError::SourceUnavailable { .. })),
                "{locator}"
            );
        }
    }

    #[test]
    fn test_interval_clamped() {
        assert_eq!(interval_for(0.0), MIN_FRAME_INTERVAL);
        assert_eq!(interval_for(f64::INFINITY), MIN_FRAME_INTERVAL);
        assert_eq!(interval_for(1e9), MIN_FRAME_INTERVAL);
        assert_eq!(interval_for(4.0), Duration::from_millis(250));
    }
}
