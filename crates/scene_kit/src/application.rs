//! Application trait and lifecycle management

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::foundation::time::TimeSample;
use crate::media::MediaError;
use crate::render::RenderError;
use crate::scene::SceneError;

/// Application lifecycle trait
///
/// Implement this trait to drive scenes with the [`Engine`] loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Build the initial scene here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Per-frame hook
    ///
    /// Called every frame after the clock ticks and before behaviors run.
    /// Streamed textures are refreshed here so the frame renders the newest
    /// video frame.
    fn on_frame(&mut self, _engine: &mut Engine, _time: &TimeSample) -> Result<(), AppError> {
        Ok(())
    }

    /// Handle application events
    ///
    /// The engine has already applied its own handling (camera aspect on
    /// resize, shutdown on close) when this is called.
    fn handle_event(&mut self, _engine: &mut Engine, _event: &AppEvent) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the loop ends. Stop background work here.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Resource or rendering error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Media streaming error
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The user tapped the drawable
    Tap {
        /// Horizontal position in pixels
        x: f32,
        /// Vertical position in pixels
        y: f32,
    },

    /// The drawable was resized
    Resized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },

    /// Close requested
    CloseRequested,
}

/// Supplies events to the engine once per frame
pub trait EventSource {
    /// Events that arrived since the previous frame
    fn poll_events(&mut self, time: &TimeSample) -> Vec<AppEvent>;
}

impl<F> EventSource for F
where
    F: FnMut(&TimeSample) -> Vec<AppEvent>,
{
    fn poll_events(&mut self, time: &TimeSample) -> Vec<AppEvent> {
        self(time)
    }
}

/// Event source that never produces anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl EventSource for NoEvents {
    fn poll_events(&mut self, _time: &TimeSample) -> Vec<AppEvent> {
        Vec::new()
    }
}
