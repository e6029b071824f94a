//! Streaming texture bridge
//!
//! A decode session runs one background thread per locator. The thread
//! decodes at the source's frame rate and publishes each frame into a single
//! slot, overwriting whatever the render thread has not picked up yet. The
//! render thread polls the slot once per frame and, when the frame is newer
//! than the one already applied, copies its pixels into a texture.
//!
//! Playback state machine:
//!
//! ```text
//! Stopped --start--> Playing { looping }
//! Playing --stop / end of stream (not looping) / decode failure--> Stopped
//! Playing --start(other locator)--> Playing (old session stopped first)
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::source::{DefaultMediaOpener, FrameDecoder, MediaOpener};
use super::{MediaError, PlaybackState, VideoFrame};
use crate::config::MediaConfig;
use crate::render::TextureResource;

/// What the decode thread is doing
#[derive(Debug)]
enum DecodeStatus {
    Running,
    Finished,
    Failed(MediaError),
}

/// Single-slot cell shared with the decode thread
#[derive(Debug)]
struct FrameSlot {
    latest: Option<Arc<VideoFrame>>,
    status: DecodeStatus,
}

type SharedSlot = Arc<Mutex<FrameSlot>>;

// A panicking decode thread cannot leave the slot half-written, so the data
// behind a poisoned lock is still usable.
fn lock(slot: &Mutex<FrameSlot>) -> MutexGuard<'_, FrameSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

struct DecodeSession {
    locator: String,
    looping: bool,
    slot: SharedSlot,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl DecodeSession {
    fn spawn(locator: &str, looping: bool, decoder: Box<dyn FrameDecoder + Send>) -> Result<Self, MediaError> {
        let slot: SharedSlot = Arc::new(Mutex::new(FrameSlot {
            latest: None,
            status: DecodeStatus::Running,
        }));
        let stop = Arc::new(AtomicBool::new(false));

        let thread = {
            let slot = Arc::clone(&slot);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("media-decode".to_string())
                .spawn(move || decode_loop(decoder, looping, &slot, &stop))
                .map_err(|e| MediaError::SourceUnavailable {
                    locator: locator.to_string(),
                    reason: format!("cannot start decode thread: {e}"),
                })?
        };

        Ok(Self {
            locator: locator.to_string(),
            looping,
            slot,
            stop,
            thread: Some(thread),
        })
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                log::error!("Decode thread for '{}' panicked", self.locator);
            }
        }
    }
}

impl Drop for DecodeSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Run a decoder call, reporting a panic as a decode failure
fn guarded<T>(call: impl FnOnce() -> Result<T, MediaError>) -> Result<T, MediaError> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(MediaError::DecodeFailed(format!(
            "decoder panicked: {}",
            panic_message(&*payload)
        )))
    })
}

fn decode_loop(mut decoder: Box<dyn FrameDecoder + Send>, looping: bool, slot: &Mutex<FrameSlot>, stop: &AtomicBool) {
    let interval = decoder.frame_interval();
    let mut sequence: u64 = 0;
    let mut source_index: u64 = 0;
    let mut presentation_time = Duration::ZERO;

    let finish = |status: DecodeStatus| lock(slot).status = status;

    while !stop.load(Ordering::Acquire) {
        match guarded(|| decoder.next_frame()) {
            Ok(Some(image)) => {
                let frame = Arc::new(VideoFrame {
                    sequence,
                    source_index,
                    presentation_time,
                    image,
                });
                lock(slot).latest = Some(frame);

                sequence += 1;
                source_index += 1;
                presentation_time += interval;
                thread::park_timeout(interval);
            }
            Ok(None) if looping && source_index > 0 => {
                log::trace!("Stream ended after {} frames, rewinding", source_index);
                source_index = 0;
                if let Err(e) = guarded(|| decoder.rewind()) {
                    finish(DecodeStatus::Failed(e));
                    return;
                }
            }
            Ok(None) if looping => {
                finish(DecodeStatus::Failed(MediaError::DecodeFailed(
                    "stream contains no frames".to_string(),
                )));
                return;
            }
            Ok(None) => {
                finish(DecodeStatus::Finished);
                return;
            }
            Err(e) => {
                finish(DecodeStatus::Failed(e));
                return;
            }
        }
    }
}

/// Decodes a media stream in the background and feeds its frames to a texture
pub struct StreamingTextureBridge {
    opener: Box<dyn MediaOpener>,
    session: Option<DecodeSession>,
    last_returned: Option<Arc<VideoFrame>>,
    last_applied: Option<u64>,
}

impl StreamingTextureBridge {
    /// Bridge opening locators with `opener`
    pub fn new(opener: impl MediaOpener + 'static) -> Self {
        Self {
            opener: Box::new(opener),
            session: None,
            last_returned: None,
            last_applied: None,
        }
    }

    /// Bridge using [`DefaultMediaOpener`]
    pub fn with_config(config: &MediaConfig) -> Self {
        Self::new(DefaultMediaOpener::new(config))
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        match &self.session {
            Some(session) => PlaybackState::Playing {
                looping: session.looping,
            },
            None => PlaybackState::Stopped,
        }
    }

    /// Locator of the running session
    pub fn locator(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.locator.as_str())
    }

    /// Begin decoding `locator`
    ///
    /// Does nothing when the same locator is already playing with the same
    /// looping mode. Any other running session is stopped first. Opening
    /// happens on the calling thread, so an unusable locator is reported
    /// here as [`MediaError::SourceUnavailable`].
    pub fn start(&mut self, locator: &str, looping: bool) -> Result<(), MediaError> {
        if let Some(session) = &self.session {
            if session.locator == locator && session.looping == looping {
                log::debug!("'{}' already playing", locator);
                return Ok(());
            }
        }
        self.stop();

        let decoder = self.opener.open(locator)?;
        self.session = Some(DecodeSession::spawn(locator, looping, decoder)?);
        log::info!("Started media '{}' (looping: {})", locator, looping);
        Ok(())
    }

    /// Stop decoding and wait for the decode thread to exit
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.shutdown();
            log::info!("Stopped media '{}'", session.locator);
        }
        self.last_returned = None;
        self.last_applied = None;
    }

    /// Newest decoded frame, never older than the previous result
    ///
    /// With a `reference` time, frames presented after it are held back.
    /// Only the newest decoded frame is kept, so once it lies past
    /// `reference` the previously returned frame is repeated (or `None` if
    /// nothing was returned yet in this session), even if an older frame at
    /// or before `reference` was decoded and then overwritten. At
    /// the end of a non-looping stream the final frame is returned once if it
    /// was not seen yet; after that the bridge is stopped and every poll
    /// returns `Ok(None)`. A decode failure is returned once and also stops
    /// the bridge.
    pub fn poll_latest_frame(&mut self, reference: Option<Duration>) -> Result<Option<Arc<VideoFrame>>, MediaError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };

        let (latest, ended) = {
            let mut slot = lock(&session.slot);
            match std::mem::replace(&mut slot.status, DecodeStatus::Running) {
                DecodeStatus::Running => (slot.latest.clone(), false),
                DecodeStatus::Finished => (slot.latest.clone(), true),
                DecodeStatus::Failed(e) => {
                    drop(slot);
                    log::warn!("Media '{}' failed: {}", session.locator, e);
                    self.stop();
                    return Err(e);
                }
            }
        };

        let unseen = latest.filter(|frame| self.is_unseen(frame));

        if ended {
            log::debug!("Media '{}' reached end of stream", session.locator);
            self.stop();
            return Ok(unseen);
        }

        match unseen {
            Some(frame) if reference.map_or(true, |at| frame.presentation_time <= at) => {
                self.last_returned = Some(Arc::clone(&frame));
                Ok(Some(frame))
            }
            _ => Ok(self.last_returned.clone()),
        }
    }

    /// Copy the newest frame into `texture` if it is newer than the last one applied
    ///
    /// Returns whether the texture contents changed.
    pub fn apply_frame_to(&mut self, texture: &mut dyn TextureResource) -> Result<bool, MediaError> {
        let Some(frame) = self.poll_latest_frame(None)? else {
            return Ok(false);
        };
        if self.last_applied.is_some_and(|applied| frame.sequence <= applied) {
            return Ok(false);
        }

        texture.replace_contents(frame.image.width, frame.image.height, &frame.image.data)?;
        self.last_applied = Some(frame.sequence);
        log::trace!("Applied frame {} ({:?})", frame.sequence, frame.presentation_time);
        Ok(true)
    }

    fn is_unseen(&self, frame: &VideoFrame) -> bool {
        self.last_returned
            .as_ref()
            .map_or(true, |seen| frame.sequence > seen.sequence)
    }
}

impl Drop for StreamingTextureBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
