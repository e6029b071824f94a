//! Scene hierarchy and per-frame update dispatch
//!
//! ## Architecture
//!
//! ```text
//! SceneGraph (slot map arena + camera)
//!      ↓ traverse_update(time), pre-order
//! SceneNode (transform, renderable, behavior)
//!      ↓ collect_draw_batches()
//! Renderer (reads world matrices)
//! ```

mod behavior;
mod draw_list;
mod node;
mod scene_graph;

pub use behavior::{NodeMut, Spin, UpdateBehavior};
pub use draw_list::{DrawBatch, InstanceData};
pub use node::{NodeTransform, SceneNode};
pub use scene_graph::{NodeHandle, SceneError, SceneGraph, TraversalStats};
