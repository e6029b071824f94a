//! Draw batch collection
//!
//! Walks the attached tree once, composing world matrices on the way down,
//! and groups every renderable node by its mesh/material pair so instanced
//! scenes (thousands of cubes sharing one mesh) become a single batch.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use super::{NodeHandle, SceneGraph};
use crate::foundation::math::Mat4;
use crate::render::Renderable;

/// Per-instance data uploaded alongside a batch
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Column-major local-to-world matrix
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for InstanceData {
    fn from(matrix: Mat4) -> Self {
        Self { model: matrix.into() }
    }
}

/// All instances drawn with one mesh/material pair
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    /// Shared payload
    pub renderable: Renderable,
    /// One entry per node, in traversal order
    pub instances: Vec<InstanceData>,
}

impl DrawBatch {
    /// Instance buffer as raw bytes for upload
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl SceneGraph {
    /// Group every attached renderable node into draw batches
    ///
    /// Batches appear in the pre-order position of their first instance.
    pub fn collect_draw_batches(&self) -> Vec<DrawBatch> {
        let mut batches: Vec<DrawBatch> = Vec::new();
        let mut batch_index: HashMap<Renderable, usize> = HashMap::new();
        let mut stack: Vec<(NodeHandle, Mat4)> = vec![(self.root(), Mat4::identity())];

        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes().get(handle) else {
                continue;
            };
            let world = parent_world * node.transform().local_matrix();

            if let Some(renderable) = node.renderable() {
                let index = *batch_index.entry(renderable).or_insert_with(|| {
                    batches.push(DrawBatch {
                        renderable,
                        instances: Vec::new(),
                    });
                    batches.len() - 1
                });
                batches[index].instances.push(InstanceData::from(world));
            }

            stack.extend(node.children().iter().rev().map(|child| (*child, world)));
        }

        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::{MaterialHandle, MeshHandle};
    use crate::scene::SceneNode;
    use slotmap::SlotMap;

    fn payloads() -> (Renderable, Renderable) {
        let mut meshes: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        let mut materials: SlotMap<MaterialHandle, ()> = SlotMap::with_key();
        let mesh = meshes.insert(());
        let a = Renderable::new(mesh, materials.insert(()));
        let b = Renderable::new(mesh, materials.insert(()));
        (a, b)
    }

    #[test]
    fn test_batches_group_shared_payloads() {
        let (cube, other) = payloads();
        let mut graph = SceneGraph::default();
        let root = graph.root();
        let container = graph.insert_child(root, SceneNode::new().at(Vec3::new(0.0, 1.0, 0.0))).unwrap();
        for i in 0..3 {
            graph
                .insert_child(container, SceneNode::with_renderable(cube).at(Vec3::new(i as f32, 0.0, 0.0)))
                .unwrap();
        }
        graph.insert_child(root, SceneNode::with_renderable(other)).unwrap();

        let batches = graph.collect_draw_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].renderable, cube);
        assert_eq!(batches[0].instances.len(), 3);
        assert_eq!(batches[1].renderable, other);
        assert_eq!(batches[1].instances.len(), 1);

        // Translation lives in the last column; the container offset is inherited
        let last = batches[0].instances[2].model;
        assert_eq!(last[3], [2.0, 1.0, 0.0, 1.0]);
        assert_eq!(batches[0].instance_bytes().len(), 3 * 64);
    }

    #[test]
    fn test_detached_renderables_are_not_drawn() {
        let (cube, _) = payloads();
        let mut graph = SceneGraph::default();
        graph.spawn(SceneNode::with_renderable(cube));
        assert!(graph.collect_draw_batches().is_empty());
    }
}
