//! Headless backend
//!
//! Implements every provider trait on the CPU: meshes are built or imported
//! into [`MeshData`], textures hold RGBA8 pixels, and rendering collects the
//! draw batches a GPU backend would submit. Used by the demo host when no GPU
//! backend is linked, and by tests.

use std::path::{Path, PathBuf};

use slotmap::SlotMap;

use super::provider::{
    FrameRenderer, FrameStats, MaterialProvider, MeshProvider, TextureProvider, TextureResource,
};
use super::resources::{
    CuboidDescriptor, MaterialDescriptor, MaterialHandle, MeshHandle, SamplerDescriptor,
    TextureHandle,
};
use super::RenderError;
use crate::assets::{ImageData, MeshData};
use crate::config::AssetConfig;
use crate::scene::SceneGraph;

/// CPU-side texture
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    image: ImageData,
    sampler: SamplerDescriptor,
    revision: u64,
}

impl HeadlessTexture {
    fn new(image: ImageData, sampler: SamplerDescriptor) -> Self {
        Self {
            image,
            sampler,
            revision: 0,
        }
    }

    /// Current pixels
    pub fn image(&self) -> &ImageData {
        &self.image
    }

    /// Sampler requested at creation
    pub fn sampler(&self) -> &SamplerDescriptor {
        &self.sampler
    }

    /// Number of times the contents were replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl TextureResource for HeadlessTexture {
    fn replace_contents(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RenderError::InvalidTexture(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }

        self.image.width = width;
        self.image.height = height;
        self.image.data.clear();
        self.image.data.extend_from_slice(rgba);
        self.revision += 1;
        Ok(())
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }
}

/// Backend that keeps every resource in memory and draws nothing
pub struct HeadlessBackend {
    assets: AssetConfig,
    drawable_size: (u32, u32),
    meshes: SlotMap<MeshHandle, MeshData>,
    materials: SlotMap<MaterialHandle, MaterialDescriptor>,
    textures: SlotMap<TextureHandle, HeadlessTexture>,
    frames_rendered: u64,
    last_stats: FrameStats,
}

impl HeadlessBackend {
    /// Create a backend resolving assets through `assets`
    pub fn new(assets: AssetConfig, drawable_size: (u32, u32)) -> Self {
        log::info!(
            "Headless backend ready ({}x{}, assets in {:?})",
            drawable_size.0,
            drawable_size.1,
            assets.assets_dir
        );
        Self {
            assets,
            drawable_size,
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            frames_rendered: 0,
            last_stats: FrameStats::default(),
        }
    }

    /// Register pixels directly as a texture
    pub fn insert_texture(&mut self, image: ImageData, sampler: SamplerDescriptor) -> TextureHandle {
        self.textures.insert(HeadlessTexture::new(image, sampler))
    }

    /// Look up a mesh
    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(handle)
    }

    /// Look up a material
    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialDescriptor> {
        self.materials.get(handle)
    }

    /// Look up a texture
    pub fn texture(&self, handle: TextureHandle) -> Option<&HeadlessTexture> {
        self.textures.get(handle)
    }

    /// Live resource counts: meshes, materials, textures
    pub fn resource_counts(&self) -> (usize, usize, usize) {
        (self.meshes.len(), self.materials.len(), self.textures.len())
    }

    /// Frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Stats of the most recent frame
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    fn find_texture_file(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.extension().is_some() {
            let candidate = self.assets.texture_path().join(direct);
            return candidate.is_file().then_some(candidate);
        }

        self.assets
            .texture_extensions
            .iter()
            .map(|ext| self.assets.texture_path().join(format!("{name}.{ext}")))
            .find(|candidate| candidate.is_file())
    }
}

impl MeshProvider for HeadlessBackend {
    fn create_cuboid(&mut self, descriptor: &CuboidDescriptor) -> Result<MeshHandle, RenderError> {
        if descriptor.width <= 0.0 || descriptor.height <= 0.0 || descriptor.length <= 0.0 {
            return Err(RenderError::ResourceUnavailable(format!(
                "cuboid dimensions must be positive: {}x{}x{}",
                descriptor.width, descriptor.height, descriptor.length
            )));
        }
        let mesh = MeshData::cuboid(descriptor);
        log::debug!("Created cuboid mesh with {} triangles", mesh.triangle_count());
        Ok(self.meshes.insert(mesh))
    }

    fn load_mesh(&mut self, path: &Path) -> Result<MeshHandle, RenderError> {
        let mesh = MeshData::from_obj(self.assets.resolve(path))?;
        Ok(self.meshes.insert(mesh))
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> bool {
        self.meshes.remove(handle).is_some()
    }
}

impl MaterialProvider for HeadlessBackend {
    fn create_material(&mut self, descriptor: &MaterialDescriptor) -> Result<MaterialHandle, RenderError> {
        if let Some(texture) = descriptor.texture {
            if !self.textures.contains_key(texture) {
                return Err(RenderError::UnknownHandle(format!("texture {texture:?}")));
            }
        }
        Ok(self.materials.insert(*descriptor))
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.materials.remove(handle).is_some()
    }
}

impl TextureProvider for HeadlessBackend {
    fn load_texture(&mut self, name: &str, sampler: &SamplerDescriptor) -> Result<TextureHandle, RenderError> {
        let path = self.find_texture_file(name).ok_or_else(|| {
            RenderError::ResourceUnavailable(format!(
                "texture '{}' not found in {:?}",
                name,
                self.assets.texture_path()
            ))
        })?;

        let image = ImageData::from_file(&path)?;
        log::info!("Loaded texture '{}' ({}x{})", name, image.width, image.height);
        Ok(self.insert_texture(image, *sampler))
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        sampler: &SamplerDescriptor,
    ) -> Result<TextureHandle, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTexture(format!("{width}x{height} texture")));
        }
        Ok(self.insert_texture(ImageData::solid_color(width, height, [0, 0, 0, 255]), *sampler))
    }

    fn texture_resource(&mut self, handle: TextureHandle) -> Option<&mut dyn TextureResource> {
        self.textures
            .get_mut(handle)
            .map(|texture| texture as &mut dyn TextureResource)
    }

    fn release_texture(&mut self, handle: TextureHandle) -> bool {
        self.textures.remove(handle).is_some()
    }
}

impl FrameRenderer for HeadlessBackend {
    fn render(&mut self, scene: &SceneGraph) -> Result<FrameStats, RenderError> {
        let batches = scene.collect_draw_batches();

        let mut stats = FrameStats::default();
        for batch in &batches {
            if !self.meshes.contains_key(batch.renderable.mesh) {
                return Err(RenderError::UnknownHandle(format!("mesh {:?}", batch.renderable.mesh)));
            }
            if !self.materials.contains_key(batch.renderable.material) {
                return Err(RenderError::UnknownHandle(format!(
                    "material {:?}",
                    batch.renderable.material
                )));
            }
            stats.batches += 1;
            stats.instances += batch.instances.len();
        }

        self.frames_rendered += 1;
        self.last_stats = stats;
        log::trace!(
            "Frame {}: {} batch(es), {} instance(s)",
            self.frames_rendered,
            stats.batches,
            stats.instances
        );
        Ok(stats)
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable_size
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Drawable resized to {}x{}", width, height);
        self.drawable_size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderable;
    use crate::scene::SceneNode;

    fn backend() -> HeadlessBackend {
        let assets = AssetConfig {
            assets_dir: std::env::temp_dir().join("scene_kit_no_assets_here"),
            ..AssetConfig::default()
        };
        HeadlessBackend::new(assets, (640, 480))
    }

    #[test]
    fn test_missing_texture_is_unavailable() {
        let mut backend = backend();
        let result = backend.load_texture("bricks", &SamplerDescriptor::linear());
        assert!(matches!(result, Err(RenderError::ResourceUnavailable(_))));
        assert_eq!(backend.resource_counts(), (0, 0, 0));
    }

    #[test]
    fn test_material_rejects_foreign_texture() {
        let mut other = backend();
        let foreign = other.create_texture(1, 1, &SamplerDescriptor::linear()).unwrap();
        other.textures.remove(foreign);

        let mut backend = backend();
        let result = backend.create_material(&MaterialDescriptor::basic(Some(foreign)));
        assert!(matches!(result, Err(RenderError::UnknownHandle(_))));
    }

    #[test]
    fn test_replace_contents_validates_size() {
        let mut backend = backend();
        let handle = backend.create_texture(2, 2, &SamplerDescriptor::linear()).unwrap();
        let texture = backend.texture_resource(handle).unwrap();

        assert!(texture.replace_contents(2, 2, &[0; 3]).is_err());
        texture.replace_contents(1, 2, &[7; 8]).unwrap();
        assert_eq!(texture.dimensions(), (1, 2));
        assert_eq!(backend.texture(handle).unwrap().revision(), 1);
        assert_eq!(backend.texture(handle).unwrap().image().data, vec![7; 8]);
    }

    #[test]
    fn test_render_counts_batches_and_instances() {
        let mut backend = backend();
        let mesh = backend.create_cuboid(&CuboidDescriptor::cube(1.0)).unwrap();
        let material = backend.create_material(&MaterialDescriptor::basic(None)).unwrap();
        let cube = Renderable::new(mesh, material);

        let mut graph = SceneGraph::default();
        let container = graph.insert_child(graph.root(), SceneNode::new()).unwrap();
        for _ in 0..100 {
            graph.insert_child(container, SceneNode::with_renderable(cube)).unwrap();
        }

        let stats = backend.render(&graph).unwrap();
        assert_eq!(stats, FrameStats { batches: 1, instances: 100 });
        assert_eq!(backend.frames_rendered(), 1);
    }

    #[test]
    fn test_released_handles_go_stale() {
        let mut backend = backend();
        let mesh = backend.create_cuboid(&CuboidDescriptor::cube(1.0)).unwrap();
        let texture = backend.create_texture(4, 4, &SamplerDescriptor::linear()).unwrap();
        let material = backend.create_material(&MaterialDescriptor::basic(Some(texture))).unwrap();
        assert_eq!(backend.resource_counts(), (1, 1, 1));

        assert!(backend.release_material(material));
        assert!(backend.release_texture(texture));
        assert!(backend.release_mesh(mesh));
        assert_eq!(backend.resource_counts(), (0, 0, 0));

        assert!(!backend.release_mesh(mesh));
        assert!(backend.texture_resource(texture).is_none());
        let mut graph = SceneGraph::default();
        graph
            .insert_child(graph.root(), SceneNode::with_renderable(Renderable::new(mesh, material)))
            .unwrap();
        assert!(matches!(backend.render(&graph), Err(RenderError::UnknownHandle(_))));
    }

    #[test]
    fn test_invalid_cuboid_rejected() {
        let mut backend = backend();
        assert!(backend.create_cuboid(&CuboidDescriptor::cube(0.0)).is_err());
    }
}
