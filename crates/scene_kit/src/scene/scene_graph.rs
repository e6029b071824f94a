//! Scene graph: an arena of nodes forming a single rooted tree
//!
//! Nodes live in a generational slot map. Children are owned through the
//! handles stored in their parent's child list; the parent link is a plain
//! handle used for lookups only. Releasing a subtree removes its slots, which
//! bumps their generation, so any handle still held by application code
//! becomes invalid instead of dangling.
//!
//! The graph is driven from one thread. Structural mutation (`add_child`,
//! `clear_all_children`, `remove`, behavior attach/detach) must happen outside
//! of [`SceneGraph::traverse_update`]; behaviors only get a [`NodeMut`] view
//! of their own node and cannot reach the graph.

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use super::behavior::{NodeMut, UpdateBehavior};
use super::node::SceneNode;
use crate::foundation::math::Mat4;
use crate::foundation::time::TimeSample;
use crate::render::{Camera, Renderable};

new_key_type! {
    /// Generational handle to a node in a [`SceneGraph`]
    pub struct NodeHandle;
}

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The requested edit would break the tree structure
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),
}

/// Counters from one update traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes visited, root included
    pub visited: usize,
    /// Behaviors invoked
    pub behaviors_invoked: usize,
}

/// Rooted tree of scene nodes plus the camera viewing it
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, SceneNode>,
    root: NodeHandle,
    camera: Camera,
}

impl SceneGraph {
    /// Create a graph holding only a root node
    pub fn new(camera: Camera) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new().named("root"));
        Self { nodes, root, camera }
    }

    /// The root node; it always exists and is never removed
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(node)
    }

    /// Look up a node
    pub fn node(&self, node: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Mutable view of a node's transform
    pub fn transform_mut(&mut self, node: NodeHandle) -> Option<NodeMut<'_>> {
        self.nodes
            .get_mut(node)
            .map(|scene_node| NodeMut::new(node, &mut scene_node.transform))
    }

    /// Replace a node's drawable payload
    pub fn set_renderable(&mut self, node: NodeHandle, renderable: Option<Renderable>) -> Result<(), SceneError> {
        self.get_mut(node)?.set_renderable(renderable);
        Ok(())
    }

    /// Replace a node's debug name
    pub fn set_name(&mut self, node: NodeHandle, name: Option<String>) -> Result<(), SceneError> {
        self.get_mut(node)?.set_name(name);
        Ok(())
    }

    /// Parent of a node (`None` for root, detached or unknown nodes)
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node).and_then(SceneNode::parent)
    }

    /// Children of a node in insertion order (empty for unknown nodes)
    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(node).map(SceneNode::children).unwrap_or_default()
    }

    /// Total number of live nodes, root and detached nodes included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes below `node`
    pub fn descendant_count(&self, node: NodeHandle) -> usize {
        self.descendants(node).len()
    }

    /// Nodes below `node` in pre-order (parent before children, siblings in
    /// insertion order)
    pub fn descendants(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeHandle> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        order
    }

    /// Insert a detached node and return its handle
    ///
    /// A detached node is not visited by traversals until it is attached with
    /// [`SceneGraph::add_child`]. Clearing the root also releases detached
    /// nodes, since they belong to the scene being built.
    pub fn spawn(&mut self, node: SceneNode) -> NodeHandle {
        self.nodes.insert(node)
    }

    /// Insert a node as the last child of `parent`
    pub fn insert_child(&mut self, parent: NodeHandle, node: SceneNode) -> Result<NodeHandle, SceneError> {
        self.get(parent)?;
        let child = self.spawn(node);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Attach a detached node as the last child of `parent`
    ///
    /// Fails with [`SceneError::InvalidHierarchy`] if `child` already has a
    /// parent, is the root, or is `parent` itself or one of its ancestors.
    /// Nothing is modified on failure.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), SceneError> {
        self.get(parent)?;
        let child_node = self.get(child)?;

        if child == self.root {
            return Err(SceneError::InvalidHierarchy("the root node cannot become a child".to_string()));
        }
        if let Some(existing) = child_node.parent {
            return Err(SceneError::InvalidHierarchy(format!(
                "{child:?} is already attached to {existing:?}"
            )));
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(SceneError::InvalidHierarchy(format!(
                    "attaching {child:?} under {parent:?} would create a cycle"
                )));
            }
            ancestor = self.parent(current);
        }

        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Release every descendant of `node`, returning how many were released
    ///
    /// Idempotent. Clearing the root drops everything except the root itself
    /// (detached nodes included) in a single pass and leaves the camera alone.
    pub fn clear_all_children(&mut self, node: NodeHandle) -> Result<usize, SceneError> {
        self.get(node)?;

        let released = if node == self.root {
            let before = self.nodes.len();
            let root = self.root;
            self.nodes.retain(|handle, _| handle == root);
            before - self.nodes.len()
        } else {
            let descendants = self.descendants(node);
            for handle in &descendants {
                self.nodes.remove(*handle);
            }
            descendants.len()
        };

        self.get_mut(node)?.children.clear();

        if released > 0 {
            log::debug!("Released {} node(s) below {:?}", released, node);
        }
        Ok(released)
    }

    /// Detach `node` from its parent and release it with its whole subtree
    pub fn remove(&mut self, node: NodeHandle) -> Result<usize, SceneError> {
        if node == self.root {
            return Err(SceneError::InvalidHierarchy("the root node cannot be removed".to_string()));
        }
        let parent = self.get(node)?.parent;

        let released = self.clear_all_children(node)? + 1;
        self.nodes.remove(node);
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(parent)) {
            parent.children.retain(|child| *child != node);
        }
        Ok(released)
    }

    /// Replace a node's behavior; `None` clears it
    pub fn attach_update_behavior(
        &mut self,
        node: NodeHandle,
        behavior: Option<Box<dyn UpdateBehavior>>,
    ) -> Result<(), SceneError> {
        self.get_mut(node)?.behavior = behavior;
        Ok(())
    }

    /// Replace a node's behavior with a closure
    pub fn set_update<F>(&mut self, node: NodeHandle, update: F) -> Result<(), SceneError>
    where
        F: FnMut(&TimeSample, &mut NodeMut<'_>) + 'static,
    {
        self.attach_update_behavior(node, Some(Box::new(update)))
    }

    /// Run every attached behavior once, in pre-order from the root
    ///
    /// A node's behavior runs before any of its children are visited, and
    /// siblings run in insertion order. Behaviors may change their own node's
    /// transform only.
    pub fn traverse_update(&mut self, time: &TimeSample) -> TraversalStats {
        let mut stats = TraversalStats::default();
        let mut stack = vec![self.root];

        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            stats.visited += 1;

            let SceneNode {
                behavior,
                transform,
                children,
                ..
            } = node;
            if let Some(behavior) = behavior.as_mut() {
                behavior.update(time, &mut NodeMut::new(handle, transform));
                stats.behaviors_invoked += 1;
            }
            stack.extend(children.iter().rev().copied());
        }

        log::trace!(
            "Update traversal: {} node(s), {} behavior(s)",
            stats.visited,
            stats.behaviors_invoked
        );
        stats
    }

    /// Local-to-world matrix of a node (composition up the parent chain)
    pub fn world_matrix(&self, node: NodeHandle) -> Option<Mat4> {
        let mut matrix = self.nodes.get(node)?.transform.local_matrix();
        let mut ancestor = self.parent(node);
        while let Some(current) = ancestor {
            let current_node = self.nodes.get(current)?;
            matrix = current_node.transform.local_matrix() * matrix;
            ancestor = current_node.parent;
        }
        Some(matrix)
    }

    pub(crate) fn nodes(&self) -> &SlotMap<NodeHandle, SceneNode> {
        &self.nodes
    }

    fn get(&self, node: NodeHandle) -> Result<&SceneNode, SceneError> {
        self.nodes.get(node).ok_or(SceneError::NodeNotFound(node))
    }

    fn get_mut(&mut self, node: NodeHandle) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound(node))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("camera", &self.camera)
            .finish()
    }
}
