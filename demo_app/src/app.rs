//! Demo application: shows one example scene at a time and advances on tap

use rand::rngs::StdRng;
use rand::SeedableRng;
use scene_kit::config::MediaConfig;
use scene_kit::foundation::time::TimeSample;
use scene_kit::media::StreamingTextureBridge;
use scene_kit::{AppError, AppEvent, Application, Engine};

use crate::config::DemoSettings;
use crate::demo::Demo;
use crate::scenes::{self, BuildError, SceneResources, VideoTexture};

/// Tap-driven demo cycle
pub struct DemoApp {
    settings: DemoSettings,
    media: MediaConfig,
    current: Demo,
    video: Option<VideoTexture>,
    resources: SceneResources,
    rng: StdRng,
    failed_builds: usize,
}

impl DemoApp {
    /// Create the app; nothing is built until [`Application::initialize`]
    pub fn new(settings: DemoSettings, media: MediaConfig) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            current: settings.initial_demo,
            settings,
            media,
            video: None,
            resources: SceneResources::default(),
            rng,
            failed_builds: 0,
        }
    }

    /// Demo currently selected
    pub fn current(&self) -> Demo {
        self.current
    }

    /// Number of scene builds that failed
    pub fn failed_builds(&self) -> usize {
        self.failed_builds
    }

    /// Whether a video stream is attached to the current scene
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /// Move to the next demo and build it
    ///
    /// The selection advances even when the build fails, so the next tap
    /// tries the demo after it.
    pub fn advance(&mut self, engine: &mut Engine) {
        self.current = self.current.next();
        self.show(engine, self.current);
    }

    fn show(&mut self, engine: &mut Engine, demo: Demo) {
        log::info!("Showing {}", demo);
        let mut resources = SceneResources::default();
        match self.build(engine, &mut resources, demo) {
            Ok(video) => {
                // Replacing the old stream drops its bridge, which joins the decode thread
                self.video = video;
                std::mem::replace(&mut self.resources, resources).release(engine.backend_mut());
                if let Some(origin) = demo.camera_origin() {
                    engine.scene_mut().camera_mut().set_position(origin);
                }
                log::debug!("{} ready with {} nodes", demo, engine.scene().node_count());
            }
            Err(e) => {
                resources.release(engine.backend_mut());
                self.failed_builds += 1;
                log::warn!("Could not build {}: {}; keeping the previous scene", demo, e);
            }
        }
    }

    fn build(
        &mut self,
        engine: &mut Engine,
        resources: &mut SceneResources,
        demo: Demo,
    ) -> Result<Option<VideoTexture>, BuildError> {
        let settings = &self.settings;
        let (scene, backend) = engine.scene_and_backend();

        match demo {
            Demo::SingleCube => scenes::single_cube(scene, backend, resources, None).map(|_| None),
            Demo::SingleCubeTextured => {
                scenes::single_cube(scene, backend, resources, Some(settings.texture_name.as_str())).map(|_| None)
            }
            Demo::SingleCubeVideo => {
                let bridge = StreamingTextureBridge::with_config(&self.media);
                scenes::video_cube(scene, backend, resources, bridge, &settings.video_locator).map(Some)
            }
            Demo::MultipleCubesFew => scenes::multiple_cubes(
                scene,
                backend,
                resources,
                settings.few_cubes,
                settings.swarm_extent,
                &mut self.rng,
            )
            .map(|_| None),
            Demo::MultipleCubesMany => scenes::multiple_cubes(
                scene,
                backend,
                resources,
                settings.many_cubes,
                settings.swarm_extent,
                &mut self.rng,
            )
            .map(|_| None),
            Demo::Bunny => {
                scenes::bunny(scene, backend, resources, &settings.bunny_model, &settings.texture_name).map(|_| None)
            }
        }
    }
}

impl Application for DemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Starting with {}", self.current);
        self.show(engine, self.current);
        Ok(())
    }

    fn on_frame(&mut self, engine: &mut Engine, _time: &TimeSample) -> Result<(), AppError> {
        let Some(video) = &mut self.video else {
            return Ok(());
        };
        let Some(texture) = engine.backend_mut().texture_resource(video.texture) else {
            log::warn!("Video texture vanished, dropping the stream");
            self.video = None;
            return Ok(());
        };

        if let Err(e) = video.bridge.apply_frame_to(texture) {
            // The bridge has stopped; the texture keeps its last frame
            log::warn!("Video stream ended: {}", e);
        }
        Ok(())
    }

    fn handle_event(&mut self, engine: &mut Engine, event: &AppEvent) -> Result<(), AppError> {
        if let AppEvent::Tap { .. } = event {
            self.advance(engine);
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(mut video) = self.video.take() {
            video.bridge.stop();
        }
        std::mem::take(&mut self.resources).release(engine.backend_mut());
    }
}
