//! Per-frame update behaviors attached to scene nodes
//!
//! A behavior is a stored trait object invoked once per frame during
//! [`SceneGraph::traverse_update`](super::SceneGraph::traverse_update). It
//! receives a [`NodeMut`] view of the node it is attached to. The view only
//! reaches that node's transform, so a behavior cannot add, remove or
//! re-parent nodes while the traversal is running.

use std::ops::{Deref, DerefMut};

use super::node::NodeTransform;
use super::NodeHandle;
use crate::foundation::math::{axis_angle, utils, Vec3};
use crate::foundation::time::TimeSample;

/// Mutable view of one node handed to its behavior
pub struct NodeMut<'a> {
    handle: NodeHandle,
    transform: &'a mut NodeTransform,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(handle: NodeHandle, transform: &'a mut NodeTransform) -> Self {
        Self { handle, transform }
    }

    /// Handle of the node being updated
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }
}

impl Deref for NodeMut<'_> {
    type Target = NodeTransform;

    fn deref(&self) -> &NodeTransform {
        self.transform
    }
}

impl DerefMut for NodeMut<'_> {
    fn deref_mut(&mut self) -> &mut NodeTransform {
        self.transform
    }
}

/// Per-frame behavior of a node
pub trait UpdateBehavior {
    /// Advance the node by one frame
    fn update(&mut self, time: &TimeSample, node: &mut NodeMut<'_>);
}

impl<F> UpdateBehavior for F
where
    F: FnMut(&TimeSample, &mut NodeMut<'_>),
{
    fn update(&mut self, time: &TimeSample, node: &mut NodeMut<'_>) {
        self(time, node);
    }
}

/// Constant-rate rotation about a fixed axis
///
/// Each frame composes `rotation(rate * update_time)` onto the current
/// orientation, so the speed does not depend on the frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    axis: Vec3,
    radians_per_second: f32,
}

impl Spin {
    /// Spin at `degrees` per second about `axis` (normalized internally)
    pub fn degrees_per_second(degrees: f32, axis: Vec3) -> Self {
        Self {
            axis,
            radians_per_second: utils::deg_to_rad(degrees),
        }
    }

    /// Rotation rate in radians per second
    pub fn radians_per_second(&self) -> f32 {
        self.radians_per_second
    }

    /// Rotation axis as given
    pub fn axis(&self) -> Vec3 {
        self.axis
    }
}

impl UpdateBehavior for Spin {
    fn update(&mut self, time: &TimeSample, node: &mut NodeMut<'_>) {
        node.rotate(axis_angle(self.axis, self.radians_per_second * time.delta_secs()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use slotmap::KeyData;

    fn handle() -> NodeHandle {
        NodeHandle::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_spin_thirty_degrees_after_one_second() {
        let axis = Vec3::new(0.5, 1.0, -1.0);
        let mut transform = NodeTransform::default();
        let mut spin = Spin::degrees_per_second(30.0, axis);

        spin.update(&TimeSample::from_delta(1.0), &mut NodeMut::new(handle(), &mut transform));

        let expected = Quat::identity() * axis_angle(axis, utils::deg_to_rad(30.0));
        assert_relative_eq!(transform.orientation(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_spin_composes_over_frames() {
        let axis = Vec3::new(0.5, 1.0, -1.0);
        let k = 1.3;
        let mut spin = Spin::degrees_per_second(utils::rad_to_deg(k), axis);

        let mut stepped = NodeTransform::default();
        for dt in [0.0, 0.1, 0.1] {
            spin.update(&TimeSample::from_delta(dt), &mut NodeMut::new(handle(), &mut stepped));
        }

        let mut single = NodeTransform::default();
        spin.update(&TimeSample::from_delta(0.2), &mut NodeMut::new(handle(), &mut single));

        assert_relative_eq!(stepped.orientation(), single.orientation(), epsilon = 1e-5);
    }

    #[test]
    fn test_closure_behavior_sees_its_handle() {
        let mut transform = NodeTransform::default();
        let expected = handle();
        let mut seen = None;
        {
            let mut behavior = |_: &TimeSample, node: &mut NodeMut<'_>| {
                seen = Some(node.handle());
                node.set_position(Vec3::new(1.0, 2.0, 3.0));
            };
            behavior.update(&TimeSample::from_delta(0.016), &mut NodeMut::new(expected, &mut transform));
        }
        assert_eq!(seen, Some(expected));
        assert_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0));
    }
}
