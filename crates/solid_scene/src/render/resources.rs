//! Texture and shader handles
//!
//! Both are opaque to the scene: the renderer owns the GPU objects, the scene
//! only keeps handles it can query, bind through the renderer, and release.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::foundation::math::RectF;

/// Identifier of a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a texture.
///
/// Clones share the availability flag, so disposing any clone makes the
/// texture unavailable for every holder.
#[derive(Clone)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    available: Arc<AtomicBool>,
}

impl Texture {
    /// Wrap a renderer texture of the given pixel size
    pub fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Texture identifier
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the texture can still be bound
    pub fn available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Map a rectangle in pixels to normalised texture coordinates
    #[allow(clippy::cast_precision_loss)]
    pub fn texture_rect(&self, pixel_rect: RectF) -> RectF {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        RectF::new(
            pixel_rect.x / width,
            pixel_rect.y / height,
            pixel_rect.width / width,
            pixel_rect.height / height,
        )
    }

    /// Release the texture
    pub fn dispose(&self) {
        if self.available.swap(false, Ordering::AcqRel) {
            log::trace!("Texture {:?} released", self.id);
        }
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.available, &other.available)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &(self.width, self.height))
            .field("available", &self.available())
            .finish()
    }
}

/// Vertex stage of a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexShaderDescriptor {
    /// 2D textured vertices
    Texture2,
    /// 3D textured vertices
    Texture3,
    /// 3D coloured vertices
    Colour3,
}

/// Fragment stage of a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentShaderDescriptor {
    /// Sample the bound texture and tint
    Texture,
    /// Vertex colour only
    Colour,
}

/// Identifier of a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

/// Handle to a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shader {
    /// Program identifier
    pub id: ShaderId,
    /// Vertex stage
    pub vertex: VertexShaderDescriptor,
    /// Fragment stage
    pub fragment: FragmentShaderDescriptor,
}
