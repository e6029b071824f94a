//! CPU-side mesh data: procedural cuboids and imported OBJ models

use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::assets::AssetError;
use crate::render::{Color, CuboidDescriptor};

/// Interleaved vertex: position, normal, color, texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// RGBA vertex color
    pub color: [f32; 4],
    /// Texture coordinates
    pub uv: [f32; 2],
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex buffer contents
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a box centered on the origin with one color per face
    ///
    /// Each face gets its own four vertices so colors and normals stay flat.
    pub fn cuboid(descriptor: &CuboidDescriptor) -> Self {
        let x = descriptor.width * 0.5;
        let y = descriptor.height * 0.5;
        let z = descriptor.length * 0.5;
        let colors = &descriptor.colors;

        // Corners listed counter-clockwise when viewed from outside the face
        let faces: [([f32; 3], Color, [[f32; 3]; 4]); 6] = [
            ([0.0, 1.0, 0.0], colors.top, [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]]),
            ([1.0, 0.0, 0.0], colors.right, [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]]),
            ([0.0, -1.0, 0.0], colors.bottom, [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]]),
            ([-1.0, 0.0, 0.0], colors.left, [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]]),
            ([0.0, 0.0, 1.0], colors.front, [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]]),
            ([0.0, 0.0, -1.0], colors.back, [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]]),
        ];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut mesh = Self {
            vertices: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        for (normal, color, corners) in faces {
            let base = mesh.vertices.len() as u32;
            for (position, uv) in corners.into_iter().zip(uvs) {
                mesh.vertices.push(Vertex {
                    position,
                    normal,
                    color: color.to_array(),
                    uv,
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Import every model in an OBJ file into a single triangle list
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();
        log::debug!("Importing OBJ model from {:?}", path_ref);

        let (models, _materials) = tobj::load_obj(path_ref, &tobj::GPU_LOAD_OPTIONS).map_err(|e| {
            AssetError::LoadFailed {
                path: path_ref.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut mesh = Self::default();
        for model in models {
            let source = &model.mesh;
            let base = mesh.vertices.len() as u32;
            let vertex_count = source.positions.len() / 3;

            for i in 0..vertex_count {
                let normal = if source.normals.len() >= (i + 1) * 3 {
                    [source.normals[i * 3], source.normals[i * 3 + 1], source.normals[i * 3 + 2]]
                } else {
                    [0.0, 1.0, 0.0]
                };
                let uv = if source.texcoords.len() >= (i + 1) * 2 {
                    [source.texcoords[i * 2], source.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };
                mesh.vertices.push(Vertex {
                    position: [
                        source.positions[i * 3],
                        source.positions[i * 3 + 1],
                        source.positions[i * 3 + 2],
                    ],
                    normal,
                    color: Color::WHITE.to_array(),
                    uv,
                });
            }
            mesh.indices.extend(source.indices.iter().map(|index| base + index));
        }

        if mesh.indices.is_empty() {
            return Err(AssetError::InvalidData(format!(
                "{} contains no triangles",
                path_ref.display()
            )));
        }

        log::info!(
            "Imported {:?}: {} vertices, {} triangles",
            path_ref,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FaceColors;

    #[test]
    fn test_cuboid_layout() {
        let mesh = MeshData::cuboid(&CuboidDescriptor::cube(3.0));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertex_bytes().len(), 24 * std::mem::size_of::<Vertex>());

        for vertex in &mesh.vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 1.5));
        }
    }

    #[test]
    fn test_cuboid_face_colors() {
        let mut descriptor = CuboidDescriptor::cube(1.0);
        descriptor.colors = FaceColors::uniform(Color::BLUE);
        descriptor.colors.top = Color::RED;
        let mesh = MeshData::cuboid(&descriptor);

        let top: Vec<_> = mesh.vertices.iter().filter(|v| v.normal == [0.0, 1.0, 0.0]).collect();
        assert_eq!(top.len(), 4);
        assert!(top.iter().all(|v| v.color == Color::RED.to_array()));
        assert_eq!(
            mesh.vertices.iter().filter(|v| v.color == Color::BLUE.to_array()).count(),
            20
        );
    }

    #[test]
    fn test_cuboid_winding_faces_outward() {
        let mesh = MeshData::cuboid(&CuboidDescriptor::cube(2.0));
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| nalgebra::Vector3::from(mesh.vertices[triangle[k] as usize].position));
            let face_normal = (b - a).cross(&(c - a));
            let declared = nalgebra::Vector3::from(mesh.vertices[triangle[0] as usize].normal);
            assert!(face_normal.dot(&declared) > 0.0);
        }
    }

    #[test]
    fn test_obj_import() {
        let path = std::env::temp_dir().join(format!("scene_kit_tri_{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();

        let mesh = MeshData::from_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_obj_fails() {
        assert!(matches!(
            MeshData::from_obj("/definitely/not/here.obj"),
            Err(AssetError::LoadFailed { .. })
        ));
    }
}
