//! Rendering boundary
//!
//! Opaque resource handles, the provider traits a backend implements, the
//! camera, and a headless backend that satisfies every trait on the CPU.

pub mod camera;
pub mod headless;
pub mod provider;
pub mod resources;

pub use camera::Camera;
pub use headless::{HeadlessBackend, HeadlessTexture};
pub use provider::{
    FrameRenderer, FrameStats, MaterialProvider, MeshProvider, RenderBackend, ResourceProvider,
    TextureProvider, TextureResource,
};
pub use resources::{
    Color, CuboidDescriptor, FaceColors, FilterMode, MaterialDescriptor, MaterialHandle, MeshHandle,
    Renderable, SamplerDescriptor, ShadingModel, TextureHandle,
};

use thiserror::Error;

use crate::assets::AssetError;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A backend resource (sampler, buffer, named texture) could not be produced
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Loading an asset for a resource failed
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Pixel data does not match the declared dimensions
    #[error("Invalid texture data: {0}")]
    InvalidTexture(String),

    /// A handle does not belong to this backend
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),
}
