//! Scene node data: local transform, drawable payload, behavior, links

use std::cell::Cell;
use std::fmt;

use super::behavior::{NodeMut, UpdateBehavior};
use super::NodeHandle;
use crate::foundation::math::{Mat4, Quat, Transform, Vec3};
use crate::foundation::time::TimeSample;
use crate::render::Renderable;

/// Local transform with a lazily computed local-to-parent matrix
///
/// Every setter invalidates the cached matrix, so [`NodeTransform::local_matrix`]
/// always reflects the latest position, orientation and scale.
#[derive(Debug, Clone, Default)]
pub struct NodeTransform {
    local: Transform,
    cached_matrix: Cell<Option<Mat4>>,
}

impl NodeTransform {
    /// Wrap a transform
    pub fn new(local: Transform) -> Self {
        Self {
            local,
            cached_matrix: Cell::new(None),
        }
    }

    /// The underlying transform
    pub fn transform(&self) -> &Transform {
        &self.local
    }

    /// Replace the whole transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.local = transform;
        self.invalidate();
    }

    /// Position relative to the parent
    pub fn position(&self) -> Vec3 {
        self.local.position
    }

    /// Set the position relative to the parent
    pub fn set_position(&mut self, position: Vec3) {
        self.local.position = position;
        self.invalidate();
    }

    /// Move by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.local.position += offset;
        self.invalidate();
    }

    /// Orientation relative to the parent
    pub fn orientation(&self) -> Quat {
        self.local.orientation
    }

    /// Set the orientation relative to the parent
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.local.orientation = orientation;
        self.invalidate();
    }

    /// Compose a rotation onto the current orientation (`orientation * delta`)
    pub fn rotate(&mut self, delta: Quat) {
        self.local.orientation *= delta;
        // Repeated products drift off the unit sphere over long runs
        self.local.orientation.renormalize();
        self.invalidate();
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        self.local.scale
    }

    /// Set the per-axis scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
        self.invalidate();
    }

    /// Set the same scale on every axis
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec3::new(scale, scale, scale));
    }

    /// Local-to-parent matrix (scale, then rotate, then translate)
    pub fn local_matrix(&self) -> Mat4 {
        if let Some(matrix) = self.cached_matrix.get() {
            return matrix;
        }
        let matrix = self.local.to_matrix();
        self.cached_matrix.set(Some(matrix));
        matrix
    }

    fn invalidate(&mut self) {
        self.cached_matrix.set(None);
    }
}

/// A node of the scene hierarchy
///
/// Built detached with the `with_*` methods and handed to
/// [`SceneGraph::spawn`](super::SceneGraph::spawn) or
/// [`SceneGraph::insert_child`](super::SceneGraph::insert_child). Parent and
/// children are managed by the graph only.
#[derive(Default)]
pub struct SceneNode {
    name: Option<String>,
    pub(crate) transform: NodeTransform,
    renderable: Option<Renderable>,
    pub(crate) behavior: Option<Box<dyn UpdateBehavior>>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl SceneNode {
    /// Empty grouping node
    pub fn new() -> Self {
        Self::default()
    }

    /// Node drawing the given payload
    pub fn with_renderable(renderable: Renderable) -> Self {
        Self {
            renderable: Some(renderable),
            ..Self::default()
        }
    }

    /// Attach a debug name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the initial position
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.set_position(position);
        self
    }

    /// Set the initial orientation
    #[must_use]
    pub fn oriented(mut self, orientation: Quat) -> Self {
        self.transform.set_orientation(orientation);
        self
    }

    /// Set the initial per-axis scale
    #[must_use]
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.set_scale(scale);
        self
    }

    /// Attach a behavior
    #[must_use]
    pub fn with_behavior<B: UpdateBehavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Attach a closure behavior
    #[must_use]
    pub fn with_update<F>(self, update: F) -> Self
    where
        F: FnMut(&TimeSample, &mut NodeMut<'_>) + 'static,
    {
        self.with_behavior(update)
    }

    /// Debug name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Local transform
    pub fn transform(&self) -> &NodeTransform {
        &self.transform
    }

    /// Drawable payload, if any
    pub fn renderable(&self) -> Option<Renderable> {
        self.renderable
    }

    pub(crate) fn set_renderable(&mut self, renderable: Option<Renderable>) {
        self.renderable = renderable;
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Whether a behavior is attached
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Parent handle, `None` for the root and for detached nodes
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name)
            .field("transform", self.transform.transform())
            .field("renderable", &self.renderable)
            .field("has_behavior", &self.behavior.is_some())
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{axis_angle, constants::PI};
    use approx::assert_relative_eq;

    #[test]
    fn test_local_matrix_tracks_setters() {
        let mut transform = NodeTransform::default();
        assert_relative_eq!(transform.local_matrix(), Mat4::identity(), epsilon = 1e-6);

        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(
            transform.local_matrix(),
            Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)),
            epsilon = 1e-6
        );

        transform.set_uniform_scale(2.0);
        transform.rotate(axis_angle(Vec3::z(), PI));
        let expected = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            orientation: axis_angle(Vec3::z(), PI),
            scale: Vec3::new(2.0, 2.0, 2.0),
        }
        .to_matrix();
        assert_relative_eq!(transform.local_matrix(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_builder() {
        let node = SceneNode::new()
            .named("cube")
            .at(Vec3::new(0.0, -2.0, 0.0))
            .scaled(Vec3::new(2.5, 2.5, 2.5))
            .with_update(|_, _| {});

        assert_eq!(node.name(), Some("cube"));
        assert_eq!(node.transform().position(), Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(node.transform().scale(), Vec3::new(2.5, 2.5, 2.5));
        assert!(node.has_behavior());
        assert!(node.parent().is_none());
        assert!(node.children().is_empty());
    }
}
