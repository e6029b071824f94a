//! Asset loading: images for textures and video frames, meshes for drawables

pub mod image_loader;
pub mod mesh_data;

pub use image_loader::ImageData;
pub use mesh_data::{MeshData, Vertex};

use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load or decode an asset
    #[error("Failed to load {path}: {reason}")]
    LoadFailed {
        /// Path (or description) of the asset
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Asset decoded but its contents are unusable
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
