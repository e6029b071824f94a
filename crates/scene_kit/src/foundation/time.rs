//! Time management utilities
//!
//! The [`FrameClock`] turns readings from a [`TimeSource`] into per-frame
//! [`TimeSample`]s. The host decides where time comes from: wall clock for
//! the interactive loop, a fixed step for deterministic runs, or a manually
//! driven source in tests.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Timing information handed to every update behavior for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds elapsed since the previous frame (never negative)
    pub update_time: f64,

    /// Seconds elapsed since the clock's first tick
    pub total_time: f64,

    /// Index of this frame, starting at 0
    pub frame_index: u64,
}

impl TimeSample {
    /// A sample with the given delta, for driving behaviors directly
    pub fn from_delta(update_time: f64) -> Self {
        Self {
            update_time: update_time.max(0.0),
            total_time: update_time.max(0.0),
            frame_index: 0,
        }
    }

    /// Frame delta as `f32`, the precision transforms are stored in
    pub fn delta_secs(&self) -> f32 {
        self.update_time as f32
    }
}

/// Source of monotonic time readings for a [`FrameClock`]
pub trait TimeSource {
    /// Time elapsed since some fixed origin
    fn now(&mut self) -> Duration;
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now(&mut self) -> Duration {
        (**self).now()
    }
}

/// Wall-clock source backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Create a source whose origin is the current instant
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Frame-counter source: every reading advances time by a fixed step
#[derive(Debug, Clone, Copy)]
pub struct FixedStepTimeSource {
    step: Duration,
    frames: u32,
}

impl FixedStepTimeSource {
    /// Create a source advancing by `step` per reading
    pub fn new(step: Duration) -> Self {
        Self { step, frames: 0 }
    }

    /// Create a source stepping at `fps` frames per second
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))))
    }
}

impl TimeSource for FixedStepTimeSource {
    fn now(&mut self) -> Duration {
        let now = self.step * self.frames;
        self.frames = self.frames.saturating_add(1);
        now
    }
}

/// Manually driven source; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    /// Create a source reading zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the reading forward
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Set the reading to an absolute value (may go backwards)
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&mut self) -> Duration {
        self.now.get()
    }
}

/// Per-frame clock producing [`TimeSample`]s
///
/// The first tick after creation (or [`FrameClock::reset`]) reports a delta of
/// zero. A source reading that goes backwards also reports zero.
#[derive(Debug)]
pub struct FrameClock<S: TimeSource = SystemTimeSource> {
    source: S,
    first: Option<Duration>,
    last: Duration,
    frame_count: u64,
}

impl FrameClock<SystemTimeSource> {
    /// Create a wall-clock driven frame clock
    pub fn new() -> Self {
        Self::with_source(SystemTimeSource::new())
    }
}

impl Default for FrameClock<SystemTimeSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> FrameClock<S> {
    /// Create a frame clock reading from the given source
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            first: None,
            last: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance the clock; call once per presented frame
    pub fn tick(&mut self) -> TimeSample {
        let now = self.source.now();
        let first = *self.first.get_or_insert(now);

        let delta = if self.frame_count == 0 {
            Duration::ZERO
        } else {
            now.saturating_sub(self.last)
        };
        // Keep the high-water mark so a backwards reading cannot replay time
        self.last = self.last.max(now);

        let sample = TimeSample {
            update_time: delta.as_secs_f64(),
            total_time: self.last.saturating_sub(first).as_secs_f64(),
            frame_index: self.frame_count,
        };
        self.frame_count += 1;

        log::trace!("Frame {} dt={:.4}s", sample.frame_index, sample.update_time);
        sample
    }

    /// Forget previous readings; the next tick reports a zero delta again
    pub fn reset(&mut self) {
        self.first = None;
        self.last = Duration::ZERO;
        self.frame_count = 0;
    }

    /// Number of ticks since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Frames-per-second counter averaged over a sliding window
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f64,
    accumulated: f64,
    frames: u32,
    current_fps: f64,
}

impl FpsCounter {
    /// Create a counter that refreshes its value once per `window` seconds
    pub fn new(window: f64) -> Self {
        Self {
            window: window.max(f64::EPSILON),
            accumulated: 0.0,
            frames: 0,
            current_fps: 0.0,
        }
    }

    /// Record one presented frame
    pub fn record(&mut self, sample: &TimeSample) {
        self.accumulated += sample.update_time;
        self.frames += 1;

        if self.accumulated >= self.window {
            self.current_fps = f64::from(self.frames) / self.accumulated;
            self.accumulated = 0.0;
            self.frames = 0;
        }
    }

    /// Frames per second over the last completed window (0 before the first)
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_is_zero() {
        let time = ManualTimeSource::new();
        time.set(Duration::from_secs(100));
        let mut clock = FrameClock::with_source(time.clone());

        let first = clock.tick();
        assert_eq!(first.update_time, 0.0);
        assert_eq!(first.frame_index, 0);

        time.advance(Duration::from_millis(250));
        let second = clock.tick();
        assert_relative_eq!(second.update_time, 0.25, epsilon = 1e-9);
        assert_relative_eq!(second.total_time, 0.25, epsilon = 1e-9);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn test_backwards_reading_clamps_to_zero() {
        let time = ManualTimeSource::new();
        let mut clock = FrameClock::with_source(time.clone());
        clock.tick();

        time.set(Duration::from_secs(2));
        assert_relative_eq!(clock.tick().update_time, 2.0, epsilon = 1e-9);

        time.set(Duration::from_secs(1));
        assert_eq!(clock.tick().update_time, 0.0);

        // Time only counts again once it passes the high-water mark
        time.set(Duration::from_millis(2500));
        assert_relative_eq!(clock.tick().update_time, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_step_source() {
        let mut clock = FrameClock::with_source(FixedStepTimeSource::from_fps(50));
        assert_eq!(clock.tick().update_time, 0.0);
        for _ in 0..3 {
            assert_relative_eq!(clock.tick().update_time, 0.02, epsilon = 1e-9);
        }
        assert_eq!(clock.frame_count(), 4);
    }

    #[test]
    fn test_reset_restarts_delta() {
        let time = ManualTimeSource::new();
        let mut clock = FrameClock::with_source(time.clone());
        clock.tick();
        time.advance(Duration::from_secs(1));
        clock.reset();
        time.advance(Duration::from_secs(1));
        assert_eq!(clock.tick().update_time, 0.0);
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::new(1.0);
        assert_eq!(fps.current_fps(), 0.0);

        for _ in 0..60 {
            fps.record(&TimeSample::from_delta(1.0 / 60.0));
        }
        // Window may close on the 60th or 61st frame due to rounding
        fps.record(&TimeSample::from_delta(1.0 / 60.0));
        assert_relative_eq!(fps.current_fps(), 60.0, epsilon = 1.0);
    }
}
