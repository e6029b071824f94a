//! Boundary traits between the scene core and a rendering backend
//!
//! A backend hands out opaque handles for meshes, materials and textures and
//! draws a [`SceneGraph`] once per frame. Everything behind these traits
//! (device, pipelines, command encoding) belongs to the backend.

use std::path::Path;

use super::resources::{
    CuboidDescriptor, MaterialDescriptor, MaterialHandle, MeshHandle, SamplerDescriptor,
    TextureHandle,
};
use super::RenderError;
use crate::scene::SceneGraph;

/// Produces drawable geometry
pub trait MeshProvider {
    /// Build a box mesh from dimensions and face colors
    fn create_cuboid(&mut self, descriptor: &CuboidDescriptor) -> Result<MeshHandle, RenderError>;

    /// Import a mesh from a model file
    fn load_mesh(&mut self, path: &Path) -> Result<MeshHandle, RenderError>;

    /// Free a mesh; returns `false` for unknown handles
    fn release_mesh(&mut self, handle: MeshHandle) -> bool;
}

/// Produces materials from textures and a shading configuration
pub trait MaterialProvider {
    /// Create a material
    fn create_material(&mut self, descriptor: &MaterialDescriptor) -> Result<MaterialHandle, RenderError>;

    /// Free a material; returns `false` for unknown handles
    fn release_material(&mut self, handle: MaterialHandle) -> bool;
}

/// Produces textures and exposes them for content replacement
pub trait TextureProvider {
    /// Load a named texture from the backend's asset directories
    fn load_texture(&mut self, name: &str, sampler: &SamplerDescriptor) -> Result<TextureHandle, RenderError>;

    /// Create an empty texture whose contents are supplied later
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        sampler: &SamplerDescriptor,
    ) -> Result<TextureHandle, RenderError>;

    /// Mutable access to a texture's contents, `None` for unknown handles
    fn texture_resource(&mut self, handle: TextureHandle) -> Option<&mut dyn TextureResource>;

    /// Free a texture; returns `false` for unknown handles
    ///
    /// Materials still referring to it keep a dangling handle, so release
    /// them first.
    fn release_texture(&mut self, handle: TextureHandle) -> bool;
}

/// A texture whose pixel contents can be swapped in place
///
/// Only the render thread touches a texture resource.
pub trait TextureResource {
    /// Replace the texture contents with tightly packed RGBA8 pixels
    ///
    /// The texture may be resized to the new dimensions.
    fn replace_contents(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError>;

    /// Current dimensions
    fn dimensions(&self) -> (u32, u32);
}

/// Everything a scene construction routine needs from a backend
pub trait ResourceProvider: MeshProvider + MaterialProvider + TextureProvider {}

impl<T: MeshProvider + MaterialProvider + TextureProvider + ?Sized> ResourceProvider for T {}

/// Summary of one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of draw batches (one per mesh/material pair)
    pub batches: usize,
    /// Total instances drawn
    pub instances: usize,
}

/// Draws the current state of a scene graph
pub trait FrameRenderer {
    /// Render one frame from the graph's current transforms and camera
    fn render(&mut self, scene: &SceneGraph) -> Result<FrameStats, RenderError>;

    /// Drawable size in pixels
    fn drawable_size(&self) -> (u32, u32);

    /// Adopt a new drawable size
    fn resize(&mut self, width: u32, height: u32);
}

/// A complete backend: resource production plus frame rendering
pub trait RenderBackend: ResourceProvider + FrameRenderer {}

impl<T: ResourceProvider + FrameRenderer + ?Sized> RenderBackend for T {}
