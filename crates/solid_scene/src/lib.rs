//! # Solid Scene
//!
//! Retained-mode 3D scene nodes with per-frame draw-node snapshots and a
//! perspective camera pass.
//!
//! ## Features
//!
//! - **Spatial nodes**: position, size, pivot, quaternion rotation and non-uniform scale
//! - **Draw nodes**: snapshots captured once per frame, drawn without touching live state
//! - **Camera pass**: perspective projection over an isolated sub-scene
//! - **Scoped render state**: every renderer push is popped on every exit path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use solid_scene::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut camera = Camera::new();
//!     camera.load(Arc::new(StaticResourceLoader::new()));
//!     camera.set_draw_rectangle(RectF::new(0.0, 0.0, 800.0, 600.0));
//!     camera.add(Cube::new())?;
//!
//!     let host = SceneHost::new(camera);
//!     let mut draw_node = CameraDrawNode::new();
//!     let mut renderer = RecordingRenderer::new();
//!
//!     host.render_frame(&mut draw_node, &mut renderer)?;
//!     renderer.finish_frame()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        foundation::{
            logging,
            math::{Colour4, Mat4, Quat, RectF, Vec2, Vec3},
            time::FrameClock,
        },
        render::{
            BlendingParameters, DrawColourInfo, RecordingRenderer, RenderError, RenderResult, Renderer,
            ResourceLoader, StaticResourceLoader, Texture, TextureId,
        },
        scene::{
            Camera, CameraDrawNode, CameraId, Cube, NodeId, SceneError, SceneHost, SceneNode, SceneResult,
            SceneUpdater, Solid, SpacePath,
        },
    };
}
