//! Image-sequence source: a directory of numbered PNG or JPEG frames

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::source::{interval_for, FrameDecoder};
use super::MediaError;
use crate::assets::ImageData;

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Decodes the image files of a directory in file name order
#[derive(Debug, Clone)]
pub struct ImageSequenceDecoder {
    frames: Vec<PathBuf>,
    interval: Duration,
    position: usize,
}

impl ImageSequenceDecoder {
    /// Scan `dir` for frames played at `frame_rate`
    pub fn open(dir: &Path, frame_rate: f64) -> Result<Self, MediaError> {
        let unavailable = |reason: String| MediaError::SourceUnavailable {
            locator: dir.display().to_string(),
            reason,
        };

        let entries = std::fs::read_dir(dir).map_err(|e| unavailable(e.to_string()))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(unavailable("no PNG or JPEG frames".to_string()));
        }

        log::debug!("Image sequence {:?}: {} frames at {} fps", dir, frames.len(), frame_rate);
        Ok(Self {
            frames,
            interval: interval_for(frame_rate),
            position: 0,
        })
    }

    /// Number of frames in one pass
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; opening rejects empty directories
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

impl FrameDecoder for ImageSequenceDecoder {
    fn next_frame(&mut self) -> Result<Option<ImageData>, MediaError> {
        let Some(path) = self.frames.get(self.position) else {
            return Ok(None);
        };
        let image = ImageData::from_file(path).map_err(|e| MediaError::DecodeFailed(e.to_string()))?;
        self.position += 1;
        Ok(Some(image))
    }

    fn rewind(&mut self) -> Result<(), MediaError> {
        self.position = 0;
        Ok(())
    }

    fn frame_interval(&self) -> Duration {
        self.interval
    }
}
