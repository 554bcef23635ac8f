//! Phase barrier between the update role and the render role
//!
//! The live camera sits behind one mutex. The update role mutates it through a
//! [`SceneUpdater`] at whatever cadence it likes; the render role captures a
//! snapshot with [`SceneHost::apply_state`], which holds the lock only for the
//! capture, and then draws from its own [`CameraDrawNode`] with no lock held.
//! Every capture bumps a generation counter, so each drawn frame corresponds
//! to exactly one point in mutation time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::render::api::Renderer;
use crate::scene::camera::{Camera, CameraDrawNode};
use crate::scene::error::{SceneError, SceneResult};

/// Owner of the live scene, used by the render role
#[derive(Debug)]
pub struct SceneHost {
    live: Arc<Mutex<Camera>>,
    generation: AtomicU64,
}

/// Handle for mutating the live scene from the update role
#[derive(Debug, Clone)]
pub struct SceneUpdater {
    live: Arc<Mutex<Camera>>,
}

fn lock(live: &Mutex<Camera>) -> SceneResult<MutexGuard<'_, Camera>> {
    live.lock().map_err(|_| SceneError::LockPoisoned)
}

impl SceneHost {
    /// Take ownership of the scene root
    pub fn new(camera: Camera) -> Self {
        Self {
            live: Arc::new(Mutex::new(camera)),
            generation: AtomicU64::new(0),
        }
    }

    /// A handle for the update role
    pub fn updater(&self) -> SceneUpdater {
        SceneUpdater {
            live: Arc::clone(&self.live),
        }
    }

    /// Number of captures so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Capture the live scene into `draw_node`, returning the new generation
    pub fn apply_state(&self, draw_node: &mut CameraDrawNode) -> SceneResult<u64> {
        {
            let camera = lock(&self.live)?;
            draw_node.apply_state(&camera);
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("Captured generation {generation}");
        Ok(generation)
    }

    /// Capture, then draw without holding the lock
    pub fn render_frame(&self, draw_node: &mut CameraDrawNode, renderer: &mut dyn Renderer) -> SceneResult<usize> {
        self.apply_state(draw_node)?;
        Ok(draw_node.draw(renderer))
    }

    /// Whether the live scene changed since `draw_node` was captured
    pub fn needs_redraw(&self, draw_node: &CameraDrawNode) -> SceneResult<bool> {
        let camera = lock(&self.live)?;
        Ok(draw_node.source() != Some(camera.id()) || camera.latest_invalidation_id() > draw_node.invalidation_id())
    }
}

impl SceneUpdater {
    /// Run `f` with exclusive access to the live scene
    pub fn update<T>(&self, f: impl FnOnce(&mut Camera) -> T) -> SceneResult<T> {
        let mut camera = lock(&self.live)?;
        Ok(f(&mut camera))
    }
}
