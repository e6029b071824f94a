//! Core engine implementation
//!
//! One frame, in order:
//!
//! 1. tick the [`FrameClock`]
//! 2. deliver pending events
//! 3. [`Application::on_frame`]
//! 4. [`SceneGraph::traverse_update`]
//! 5. render
//! 6. FPS accounting and pacing

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::application::{AppEvent, Application, EventSource};
use crate::config::{ApplicationConfig, ConfigError, EngineConfig};
use crate::foundation::time::{
    FixedStepTimeSource, FpsCounter, FrameClock, SystemTimeSource, TimeSample, TimeSource,
};
use crate::render::{Camera, FrameStats, HeadlessBackend, RenderBackend, RenderError};
use crate::scene::SceneGraph;

/// Main engine struct
///
/// Owns the scene graph, the backend and the frame clock, and drives an
/// [`Application`] through the frame loop.
pub struct Engine {
    scene: SceneGraph,
    backend: Box<dyn RenderBackend>,
    clock: FrameClock<Box<dyn TimeSource>>,
    fps: FpsCounter,
    config: EngineConfig,
    last_sample: Option<TimeSample>,
    last_stats: FrameStats,
    since_stats_log: f64,
    running: bool,
}

impl Engine {
    /// Create an engine rendering through `backend`
    pub fn new(config: &ApplicationConfig, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        let engine_config = config.engine.clone();
        let source: Box<dyn TimeSource> = match (engine_config.fixed_timestep, engine_config.target_fps) {
            (true, Some(fps)) => Box::new(FixedStepTimeSource::from_fps(fps)),
            _ => Box::new(SystemTimeSource::new()),
        };

        let (width, height) = backend.drawable_size();
        let mut camera = Camera::default();
        camera.set_aspect_from_size(width, height);

        Ok(Self {
            scene: SceneGraph::new(camera),
            backend,
            clock: FrameClock::with_source(source),
            fps: FpsCounter::new(1.0),
            config: engine_config,
            last_sample: None,
            last_stats: FrameStats::default(),
            since_stats_log: 0.0,
            running: true,
        })
    }

    /// Create an engine with a [`HeadlessBackend`]
    pub fn headless(config: &ApplicationConfig) -> Result<Self, EngineError> {
        let size = (config.engine.drawable_width, config.engine.drawable_height);
        let backend = HeadlessBackend::new(config.assets.clone(), size);
        Self::new(config, Box::new(backend))
    }

    /// Replace the time source (restarts the clock)
    #[must_use]
    pub fn with_time_source(mut self, source: impl TimeSource + 'static) -> Self {
        self.clock = FrameClock::with_source(Box::new(source));
        self
    }

    /// Run frames until the application quits or `max_frames` is reached
    pub fn run<A: Application>(&mut self, app: &mut A, events: &mut dyn EventSource) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let result = self.run_frames(app, events);

        app.cleanup(self);
        log::info!("Engine shutdown complete after {} frames", self.clock.frame_count());
        result
    }

    fn run_frames<A: Application>(&mut self, app: &mut A, events: &mut dyn EventSource) -> Result<(), EngineError> {
        while self.running {
            let frame_start = Instant::now();
            self.step(app, events)?;

            if let Some(max) = self.config.max_frames {
                if self.clock.frame_count() >= max {
                    log::info!("Reached max_frames ({})", max);
                    self.running = false;
                }
            }

            self.pace(frame_start);
        }
        Ok(())
    }

    /// Run exactly one frame
    pub fn step<A: Application>(&mut self, app: &mut A, events: &mut dyn EventSource) -> Result<FrameStats, EngineError> {
        let sample = self.clock.tick();
        self.last_sample = Some(sample);

        for event in events.poll_events(&sample) {
            self.dispatch(app, &event)?;
        }

        app.on_frame(self, &sample)
            .map_err(|e| EngineError::Application(format!("App frame: {e}")))?;

        let traversal = self.scene.traverse_update(&sample);
        let stats = self.backend.render(&self.scene)?;
        self.last_stats = stats;

        self.fps.record(&sample);
        self.since_stats_log += sample.update_time;
        if self.since_stats_log >= self.config.stats_interval_secs {
            self.since_stats_log = 0.0;
            let (width, height) = self.backend.drawable_size();
            log::info!(
                "{:.1} fps, {}x{}, {} nodes, {} instances",
                self.fps.current_fps(),
                width,
                height,
                traversal.visited,
                stats.instances
            );
        }

        Ok(stats)
    }

    fn dispatch<A: Application>(&mut self, app: &mut A, event: &AppEvent) -> Result<(), EngineError> {
        log::debug!("Event: {:?}", event);
        match event {
            AppEvent::Resized { width, height } => {
                self.scene.camera_mut().set_aspect_from_size(*width, *height);
                self.backend.resize(*width, *height);
            }
            AppEvent::CloseRequested => self.quit(),
            AppEvent::Tap { .. } => {}
        }

        app.handle_event(self, event)
            .map_err(|e| EngineError::Application(format!("App event: {e}")))
    }

    fn pace(&self, frame_start: Instant) {
        if self.config.fixed_timestep || !self.running {
            return;
        }
        if let Some(fps) = self.config.target_fps {
            let frame_budget = Duration::from_secs_f64(1.0 / f64::from(fps));
            if let Some(remaining) = frame_budget.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop keeps running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Get mutable access to the scene graph
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Get the backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Get mutable access to the backend
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Scene and backend together, for building scenes from fresh resources
    pub fn scene_and_backend(&mut self) -> (&mut SceneGraph, &mut dyn RenderBackend) {
        (&mut self.scene, self.backend.as_mut())
    }

    /// Time sample of the current frame
    pub fn time(&self) -> Option<&TimeSample> {
        self.last_sample.as_ref()
    }

    /// Frames since start
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    /// Smoothed frames per second
    pub fn current_fps(&self) -> f64 {
        self.fps.current_fps()
    }

    /// Stats of the last rendered frame
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{AppError, NoEvents};
    use crate::foundation::math::Vec3;
    use crate::foundation::time::ManualTimeSource;
    use crate::render::{CuboidDescriptor, MaterialDescriptor, Renderable};
    use crate::scene::{NodeHandle, SceneNode, Spin};
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        cube: Option<NodeHandle>,
        frames_seen: Vec<u64>,
        events: Vec<AppEvent>,
        cleaned_up: bool,
    }

    impl Application for Recorder {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let (scene, backend) = engine.scene_and_backend();
            let mesh = backend.create_cuboid(&CuboidDescriptor::cube(3.0))?;
            let material = backend.create_material(&MaterialDescriptor::basic(None))?;
            let node = SceneNode::with_renderable(Renderable::new(mesh, material))
                .with_behavior(Spin::degrees_per_second(90.0, Vec3::y()));
            self.cube = Some(scene.insert_child(scene.root(), node)?);
            Ok(())
        }

        fn on_frame(&mut self, _engine: &mut Engine, time: &TimeSample) -> Result<(), AppError> {
            self.frames_seen.push(time.frame_index);
            Ok(())
        }

        fn handle_event(&mut self, _engine: &mut Engine, event: &AppEvent) -> Result<(), AppError> {
            self.events.push(event.clone());
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    fn config(max_frames: Option<u64>) -> ApplicationConfig {
        let mut config = ApplicationConfig::default();
        config.engine.target_fps = Some(60);
        config.engine.fixed_timestep = true;
        config.engine.max_frames = max_frames;
        config
    }

    #[test]
    fn test_run_stops_at_max_frames() {
        let mut engine = Engine::headless(&config(Some(5))).unwrap();
        let mut app = Recorder::default();
        engine.run(&mut app, &mut NoEvents).unwrap();

        assert_eq!(app.frames_seen, vec![0, 1, 2, 3, 4]);
        assert!(app.cleaned_up);
        assert_eq!(engine.last_frame_stats(), FrameStats { batches: 1, instances: 1 });
    }

    #[test]
    fn test_step_updates_behaviors_with_clock_delta() {
        let time = ManualTimeSource::new();
        let mut engine = Engine::headless(&config(None))
            .unwrap()
            .with_time_source(time.clone());
        let mut app = Recorder::default();
        app.initialize(&mut engine).unwrap();
        let cube = app.cube.unwrap();

        engine.step(&mut app, &mut NoEvents).unwrap();
        time.advance(Duration::from_secs(1));
        engine.step(&mut app, &mut NoEvents).unwrap();

        let orientation = engine.scene().node(cube).unwrap().transform().orientation();
        assert_relative_eq!(orientation.angle(), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        assert_eq!(engine.time().map(|t| t.frame_index), Some(1));
    }

    #[test]
    fn test_events_reach_application() {
        let mut engine = Engine::headless(&config(Some(10))).unwrap();
        let mut app = Recorder::default();
        let mut events = |time: &TimeSample| match time.frame_index {
            1 => vec![AppEvent::Resized { width: 200, height: 100 }],
            2 => vec![AppEvent::Tap { x: 1.0, y: 2.0 }, AppEvent::CloseRequested],
            _ => Vec::new(),
        };

        engine.run(&mut app, &mut events).unwrap();

        assert_eq!(app.frames_seen.len(), 3);
        assert_eq!(app.events.len(), 3);
        assert_relative_eq!(engine.scene().camera().aspect, 2.0);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_resize_reaches_backend() {
        let mut engine = Engine::headless(&config(None)).unwrap();
        let mut app = Recorder::default();
        let mut events = |_: &TimeSample| vec![AppEvent::Resized { width: 800, height: 600 }];

        engine.step(&mut app, &mut events).unwrap();

        assert_eq!(engine.backend().drawable_size(), (800, 600));
        assert_relative_eq!(engine.scene().camera().aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config(None);
        config.engine.drawable_width = 0;
        assert!(matches!(Engine::headless(&config), Err(EngineError::Config(_))));
    }
}
