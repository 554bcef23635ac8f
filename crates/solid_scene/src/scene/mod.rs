//! # Scene Graph
//!
//! Retained-mode 3D scene: a [`Camera`] owns spatial nodes, each frame is
//! captured into draw nodes and then drawn through a [`crate::render::Renderer`].
//!
//! ## Frame flow
//!
//! 1. The update role mutates nodes; each mutation only invalidates.
//! 2. The render role captures a snapshot (`apply_state`).
//! 3. The snapshot is drawn; renderer state is pushed and popped through guards.

pub mod camera;
pub mod cube;
pub mod draw_info;
pub mod draw_node;
pub mod error;
pub mod host;
pub mod invalidation;
pub mod node;
pub mod path;
pub mod solid;

pub use camera::{Camera, CameraDrawNode, CameraId, CameraPhase, FAR_PLANE, NEAR_PLANE};
pub use cube::Cube;
pub use draw_info::SpaceDrawInfo;
pub use draw_node::{CompositeDrawNode, DrawNode, DrawNodeKind, CUBE_VERTEX_COUNT, MAX_RES};
pub use error::{SceneError, SceneResult};
pub use host::{SceneHost, SceneUpdater};
pub use invalidation::Invalidation;
pub use node::{NodeId, SceneNode, TextureSlot};
pub use path::{SpacePath, DEFAULT_PATH_RADIUS};
pub use solid::{LayoutFootprint, ParentLink, Solid};

#[cfg(test)]
mod tests;
