//! # Scene Kit
//!
//! A small 3D scene core: a transform hierarchy with per-node update
//! behaviors, a frame clock, and a bridge that streams decoded video frames
//! into a texture. Rendering sits behind narrow provider traits; the bundled
//! [`render::HeadlessBackend`] implements them on the CPU.
//!
//! ## Features
//!
//! - **Scene graph**: slot map arena, pre-order update traversal, bulk clear
//! - **Behaviors**: closures or [`scene::Spin`] driven by [`foundation::time::TimeSample`]
//! - **Draw batches**: renderables grouped by mesh/material for instancing
//! - **Video textures**: background decoding with a latest-frame slot
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_kit::prelude::*;
//!
//! struct SpinningCube;
//!
//! impl Application for SpinningCube {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let (scene, backend) = engine.scene_and_backend();
//!         let mesh = backend.create_cuboid(&CuboidDescriptor::cube(3.0))?;
//!         let material = backend.create_material(&MaterialDescriptor::basic(None))?;
//!         let cube = SceneNode::with_renderable(Renderable::new(mesh, material))
//!             .with_behavior(Spin::degrees_per_second(30.0, Vec3::new(0.5, 1.0, -1.0)));
//!         scene.insert_child(scene.root(), cube)?;
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let mut engine = Engine::headless(&config)?;
//!     engine.run(&mut SpinningCube, &mut NoEvents)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod media;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application, EventSource, NoEvents};
pub use engine::{Engine, EngineError};

/// Common imports for scene_kit users
pub mod prelude {
    pub use crate::{
        config::{ApplicationConfig, AssetConfig, Config, EngineConfig, MediaConfig},
        foundation::{
            math::{axis_angle, Mat4, Quat, Transform, Vec3},
            time::{FrameClock, TimeSample},
        },
        media::{MediaError, PlaybackState, StreamingTextureBridge},
        render::{
            Camera, Color, CuboidDescriptor, FaceColors, FrameRenderer, MaterialDescriptor,
            MaterialProvider, MeshProvider, RenderBackend, RenderError, Renderable, ResourceProvider,
            SamplerDescriptor, ShadingModel, TextureHandle, TextureProvider, TextureResource,
        },
        scene::{NodeHandle, NodeMut, SceneError, SceneGraph, SceneNode, Spin, UpdateBehavior},
        AppError, AppEvent, Application, Engine, EngineError, EventSource, NoEvents,
    };
}
