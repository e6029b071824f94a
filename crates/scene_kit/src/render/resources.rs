//! Opaque resource handles and the descriptors used to request resources
//!
//! The scene core never looks inside a mesh, material or texture. It stores
//! the handles a provider hands out and passes them back at draw time.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Handle to drawable geometry owned by a [`MeshProvider`](super::MeshProvider)
    pub struct MeshHandle;

    /// Handle to a material owned by a [`MaterialProvider`](super::MaterialProvider)
    pub struct MaterialHandle;

    /// Handle to a texture owned by a [`TextureProvider`](super::TextureProvider)
    pub struct TextureHandle;
}

/// Drawable payload of a scene node: one mesh bound to one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Renderable {
    /// Geometry to draw
    pub mesh: MeshHandle,
    /// Material the geometry is drawn with
    pub material: MaterialHandle,
}

impl Renderable {
    /// Bind a mesh to a material
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self { mesh, material }
    }
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque red
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Opaque orange
    pub const ORANGE: Self = Self::rgb(1.0, 0.5, 0.0);
    /// Opaque yellow
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    /// Opaque purple
    pub const PURPLE: Self = Self::rgb(0.5, 0.0, 0.5);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque color from components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One color per cuboid face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceColors {
    /// +Y face
    pub top: Color,
    /// +X face
    pub right: Color,
    /// -Y face
    pub bottom: Color,
    /// -X face
    pub left: Color,
    /// +Z face
    pub front: Color,
    /// -Z face
    pub back: Color,
}

impl FaceColors {
    /// The same color on every face
    pub fn uniform(color: Color) -> Self {
        Self {
            top: color,
            right: color,
            bottom: color,
            left: color,
            front: color,
            back: color,
        }
    }
}

impl Default for FaceColors {
    fn default() -> Self {
        Self {
            top: Color::RED,
            right: Color::GREEN,
            bottom: Color::ORANGE,
            left: Color::BLUE,
            front: Color::YELLOW,
            back: Color::PURPLE,
        }
    }
}

/// Request for an axis-aligned box centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuboidDescriptor {
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub height: f32,
    /// Extent along Z
    pub length: f32,
    /// Per-face vertex colors
    pub colors: FaceColors,
}

impl CuboidDescriptor {
    /// A cube with the default face colors
    pub fn cube(dimension: f32) -> Self {
        Self {
            width: dimension,
            height: dimension,
            length: dimension,
            colors: FaceColors::default(),
        }
    }
}

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Linear interpolation
    #[default]
    Linear,
}

/// Sampler state requested alongside a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerDescriptor {
    /// Whether texture coordinates are normalized to `[0, 1]`
    pub normalized_coordinates: bool,
    /// Minification filter
    pub min_filter: FilterMode,
    /// Magnification filter
    pub mag_filter: FilterMode,
    /// Filter between mip levels
    pub mip_filter: FilterMode,
}

impl SamplerDescriptor {
    /// Normalized coordinates with linear filtering everywhere
    pub fn linear() -> Self {
        Self {
            normalized_coordinates: true,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Linear,
        }
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self::linear()
    }
}

/// Shading configuration of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingModel {
    /// Unlit, colored by per-vertex colors (modulated by the texture if any)
    #[default]
    Basic,
    /// Lit with vertex normals, colored by the texture
    Textured,
}

/// Request for a material
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialDescriptor {
    /// Shading configuration
    pub shading: ShadingModel,
    /// Optional bound texture
    pub texture: Option<TextureHandle>,
}

impl MaterialDescriptor {
    /// Basic material, optionally textured
    pub fn basic(texture: Option<TextureHandle>) -> Self {
        Self {
            shading: ShadingModel::Basic,
            texture,
        }
    }

    /// Lit material sampling the given texture
    pub fn textured(texture: TextureHandle) -> Self {
        Self {
            shading: ShadingModel::Textured,
            texture: Some(texture),
        }
    }
}
