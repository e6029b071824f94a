//! Example scene construction
//!
//! Every builder acquires its resources (meshes, textures, materials, media
//! sessions) first and clears the scene root only once all of them exist, so
//! a failed build leaves the previous scene on screen. Backend handles are
//! recorded in a [`SceneResources`] the caller releases once the scene is
//! replaced, or right away when the build fails.

use std::path::Path;

use rand::Rng;
use scene_kit::foundation::math::{axis_angle, utils, Vec3};
use scene_kit::media::{MediaError, StreamingTextureBridge};
use scene_kit::render::{
    CuboidDescriptor, MaterialDescriptor, MaterialHandle, MeshHandle, RenderError, Renderable, ResourceProvider,
    SamplerDescriptor, TextureHandle,
};
use scene_kit::scene::{NodeHandle, SceneError, SceneGraph, SceneNode, Spin};
use thiserror::Error;

use crate::config::CubeSwarm;

/// Edge length of the single and video cubes
pub const SINGLE_CUBE_SIZE: f32 = 3.0;

/// Size of the placeholder texture a video stream draws into
const VIDEO_TEXTURE_SIZE: u32 = 64;

/// Scene build failures
#[derive(Error, Debug)]
pub enum BuildError {
    /// A mesh, texture or material could not be created
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The video source could not be started
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Inserting nodes failed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Backend resources created for one scene
#[derive(Debug, Default)]
pub struct SceneResources {
    meshes: Vec<MeshHandle>,
    materials: Vec<MaterialHandle>,
    textures: Vec<TextureHandle>,
}

impl SceneResources {
    /// Number of meshes, materials and textures held
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.meshes.len(), self.materials.len(), self.textures.len())
    }

    /// Free every resource, materials before the textures they sample
    pub fn release<P: ResourceProvider + ?Sized>(self, provider: &mut P) {
        let (meshes, materials, textures) = self.counts();
        for material in self.materials {
            provider.release_material(material);
        }
        for texture in self.textures {
            provider.release_texture(texture);
        }
        for mesh in self.meshes {
            provider.release_mesh(mesh);
        }
        log::debug!(
            "Released {} mesh(es), {} material(s), {} texture(s)",
            meshes,
            materials,
            textures
        );
    }

    fn cuboid<P: ResourceProvider + ?Sized>(&mut self, provider: &mut P, size: f32) -> Result<MeshHandle, RenderError> {
        let mesh = provider.create_cuboid(&CuboidDescriptor::cube(size))?;
        self.meshes.push(mesh);
        Ok(mesh)
    }

    fn model<P: ResourceProvider + ?Sized>(&mut self, provider: &mut P, path: &Path) -> Result<MeshHandle, RenderError> {
        let mesh = provider.load_mesh(path)?;
        self.meshes.push(mesh);
        Ok(mesh)
    }

    fn named_texture<P: ResourceProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        name: &str,
    ) -> Result<TextureHandle, RenderError> {
        let texture = provider.load_texture(name, &SamplerDescriptor::linear())?;
        self.textures.push(texture);
        Ok(texture)
    }

    fn blank_texture<P: ResourceProvider + ?Sized>(&mut self, provider: &mut P, size: u32) -> Result<TextureHandle, RenderError> {
        let texture = provider.create_texture(size, size, &SamplerDescriptor::linear())?;
        self.textures.push(texture);
        Ok(texture)
    }

    fn material<P: ResourceProvider + ?Sized>(
        &mut self,
        provider: &mut P,
        descriptor: &MaterialDescriptor,
    ) -> Result<MaterialHandle, RenderError> {
        let material = provider.create_material(descriptor)?;
        self.materials.push(material);
        Ok(material)
    }
}

fn cube_spin() -> Spin {
    Spin::degrees_per_second(30.0, Vec3::new(0.5, 1.0, -1.0))
}

/// Video stream feeding a texture, owned by the video scene
pub struct VideoTexture {
    /// Bridge decoding the stream
    pub bridge: StreamingTextureBridge,
    /// Texture the frames are copied into
    pub texture: TextureHandle,
}

/// A spinning 3.0 cube with colored faces, optionally wearing a named texture
pub fn single_cube<P>(
    scene: &mut SceneGraph,
    provider: &mut P,
    resources: &mut SceneResources,
    texture_name: Option<&str>,
) -> Result<NodeHandle, BuildError>
where
    P: ResourceProvider + ?Sized,
{
    let mesh = resources.cuboid(provider, SINGLE_CUBE_SIZE)?;
    let texture = texture_name
        .map(|name| resources.named_texture(provider, name))
        .transpose()?;
    let material = resources.material(provider, &MaterialDescriptor::basic(texture))?;

    scene.clear_all_children(scene.root())?;
    let cube = SceneNode::with_renderable(Renderable::new(mesh, material))
        .named("cube")
        .with_behavior(cube_spin());
    Ok(scene.insert_child(scene.root(), cube)?)
}

/// A spinning cube textured by a looping media stream
pub fn video_cube<P>(
    scene: &mut SceneGraph,
    provider: &mut P,
    resources: &mut SceneResources,
    mut bridge: StreamingTextureBridge,
    locator: &str,
) -> Result<VideoTexture, BuildError>
where
    P: ResourceProvider + ?Sized,
{
    let mesh = resources.cuboid(provider, SINGLE_CUBE_SIZE)?;
    let texture = resources.blank_texture(provider, VIDEO_TEXTURE_SIZE)?;
    let material = resources.material(provider, &MaterialDescriptor::basic(Some(texture)))?;
    bridge.start(locator, true)?;

    scene.clear_all_children(scene.root())?;
    let cube = SceneNode::with_renderable(Renderable::new(mesh, material))
        .named("video cube")
        .with_behavior(cube_spin());
    scene.insert_child(scene.root(), cube)?;

    Ok(VideoTexture { bridge, texture })
}

/// `swarm.count` small cubes scattered in a spinning container
///
/// All cubes share one mesh and one material, so they render as a single
/// instanced batch.
pub fn multiple_cubes<P, R>(
    scene: &mut SceneGraph,
    provider: &mut P,
    resources: &mut SceneResources,
    swarm: CubeSwarm,
    extent: f32,
    rng: &mut R,
) -> Result<NodeHandle, BuildError>
where
    P: ResourceProvider + ?Sized,
    R: Rng,
{
    let mesh = resources.cuboid(provider, swarm.dimension)?;
    let material = resources.material(provider, &MaterialDescriptor::basic(None))?;
    let cube = Renderable::new(mesh, material);

    scene.clear_all_children(scene.root())?;
    let container = SceneNode::new()
        .named("container")
        .oriented(axis_angle(Vec3::y(), utils::deg_to_rad(45.0)))
        .with_behavior(cube_spin());
    let container = scene.insert_child(scene.root(), container)?;

    for _ in 0..swarm.count {
        let position = if extent > 0.0 {
            Vec3::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        } else {
            Vec3::zeros()
        };
        let node = SceneNode::with_renderable(cube)
            .at(position)
            .scaled(Vec3::new(0.1, 0.1, 0.1))
            .with_behavior(cube_spin());
        scene.insert_child(container, node)?;
    }

    log::debug!("Placed {} cubes", swarm.count);
    Ok(container)
}

/// The imported bunny, bricks-textured, turning about Y
pub fn bunny<P>(
    scene: &mut SceneGraph,
    provider: &mut P,
    resources: &mut SceneResources,
    model: &Path,
    texture_name: &str,
) -> Result<NodeHandle, BuildError>
where
    P: ResourceProvider + ?Sized,
{
    let mesh = resources.model(provider, model)?;
    let texture = resources.named_texture(provider, texture_name)?;
    let material = resources.material(provider, &MaterialDescriptor::textured(texture))?;

    scene.clear_all_children(scene.root())?;
    let bunny = SceneNode::with_renderable(Renderable::new(mesh, material))
        .named("bunny")
        .at(Vec3::new(0.0, -2.0, 0.0))
        .scaled(Vec3::new(2.5, 2.5, 2.5))
        .with_behavior(Spin::degrees_per_second(60.0, Vec3::y()));
    Ok(scene.insert_child(scene.root(), bunny)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scene_kit::config::AssetConfig;
    use scene_kit::foundation::time::TimeSample;
    use scene_kit::media::PlaybackState;
    use scene_kit::render::{FrameRenderer, HeadlessBackend, TextureProvider};

    fn backend_with(assets_dir: std::path::PathBuf) -> HeadlessBackend {
        let assets = AssetConfig {
            assets_dir,
            ..AssetConfig::default()
        };
        HeadlessBackend::new(assets, (1170, 2532))
    }

    fn backend() -> HeadlessBackend {
        backend_with(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources"))
    }

    fn bare_backend() -> HeadlessBackend {
        backend_with(std::env::temp_dir().join("demo_app_no_assets"))
    }

    #[test]
    fn test_single_cube_spins_thirty_degrees_per_second() {
        let mut scene = SceneGraph::default();
        let mut backend = backend();
        let mut resources = SceneResources::default();
        let cube = single_cube(&mut scene, &mut backend, &mut resources, None).unwrap();

        scene.traverse_update(&TimeSample::from_delta(1.0));
        let orientation = scene.node(cube).unwrap().transform().orientation();
        assert_relative_eq!(orientation.angle(), utils::deg_to_rad(30.0), epsilon = 1e-5);
        assert_eq!(scene.descendant_count(scene.root()), 1);
        assert_eq!(resources.counts(), (1, 1, 0));
    }

    #[test]
    fn test_shipped_assets_build_textured_scenes() {
        let mut scene = SceneGraph::default();
        let mut backend = backend();

        let mut textured = SceneResources::default();
        single_cube(&mut scene, &mut backend, &mut textured, Some("bricks")).unwrap();
        assert_eq!(textured.counts(), (1, 1, 1));

        let mut bunny_resources = SceneResources::default();
        let bunny_node = bunny(&mut scene, &mut backend, &mut bunny_resources, Path::new("models/bunny.obj"), "bricks").unwrap();
        assert_eq!(scene.children(scene.root()), &[bunny_node]);
        assert_eq!(backend.render(&scene).unwrap().instances, 1);

        textured.release(&mut backend);
        bunny_resources.release(&mut backend);
        assert_eq!(backend.resource_counts(), (0, 0, 0));
    }

    #[test]
    fn test_swarm_shares_one_batch() {
        let mut scene = SceneGraph::default();
        let mut backend = backend();
        let mut resources = SceneResources::default();
        let mut rng = StdRng::seed_from_u64(42);
        let swarm = CubeSwarm { count: 100, dimension: 1.0 };
        let container = multiple_cubes(&mut scene, &mut backend, &mut resources, swarm, 3.0, &mut rng).unwrap();

        assert_eq!(scene.children(container).len(), 100);
        for child in scene.children(container) {
            let position = scene.node(*child).unwrap().transform().position();
            assert!(position.iter().all(|c| c.abs() <= 3.0));
        }

        let stats = backend.render(&scene).unwrap();
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.instances, 100);
    }

    #[test]
    fn test_failed_build_keeps_previous_scene() {
        let mut scene = SceneGraph::default();
        let mut backend = bare_backend();
        let cube = single_cube(&mut scene, &mut backend, &mut SceneResources::default(), None).unwrap();

        let mut partial = SceneResources::default();
        let result = single_cube(&mut scene, &mut backend, &mut partial, Some("bricks"));
        assert!(matches!(result, Err(BuildError::Render(RenderError::ResourceUnavailable(_)))));
        assert_eq!(partial.counts(), (1, 0, 0));
        partial.release(&mut backend);
        assert_eq!(backend.resource_counts(), (1, 1, 0));

        let result = bunny(
            &mut scene,
            &mut backend,
            &mut SceneResources::default(),
            Path::new("models/bunny.obj"),
            "bricks",
        );
        assert!(result.is_err());

        assert!(scene.contains(cube));
        assert_eq!(scene.children(scene.root()), &[cube]);
    }

    #[test]
    fn test_video_cube_streams_into_its_texture() {
        let mut scene = SceneGraph::default();
        let mut backend = backend();
        let mut resources = SceneResources::default();
        let bridge = StreamingTextureBridge::with_config(&Default::default());

        let mut video = video_cube(&mut scene, &mut backend, &mut resources, bridge, "pattern:3@100").unwrap();
        assert_eq!(video.bridge.state(), PlaybackState::Playing { looping: true });
        assert_eq!(resources.counts(), (1, 1, 1));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        loop {
            let texture = backend.texture_resource(video.texture).unwrap();
            if video.bridge.apply_frame_to(texture).unwrap() {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "no video frame arrived");
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(backend.texture(video.texture).unwrap().revision() >= 1);
    }

    #[test]
    fn test_video_cube_with_bad_locator_keeps_scene() {
        let mut scene = SceneGraph::default();
        let mut backend = backend();
        let cube = single_cube(&mut scene, &mut backend, &mut SceneResources::default(), None).unwrap();

        let bridge = StreamingTextureBridge::with_config(&Default::default());
        let mut partial = SceneResources::default();
        let result = video_cube(&mut scene, &mut backend, &mut partial, bridge, "pattern:nope");
        assert!(matches!(result, Err(BuildError::Media(MediaError::SourceUnavailable { .. }))));
        assert_eq!(partial.counts(), (1, 1, 1));
        assert!(scene.contains(cube));
    }
}
