//! Backend abstraction traits for the rendering system
//!
//! The scene never talks to a graphics API directly. Everything it needs from
//! the GPU side is expressed here and implemented by a backend.

use crate::foundation::math::{Mat4, RectF, Vec2};
use crate::render::resources::{FragmentShaderDescriptor, Shader, Texture, VertexShaderDescriptor};
use crate::render::state::{
    BlendingParameters, ClearInfo, DepthInfo, DrawColourInfo, MaskingInfo, PrimitiveTopology, RectI,
};
use crate::render::vertex::TexturedVertex3D;

/// A renderer-managed buffer accumulating vertices of one topology
pub trait VertexBatch: Send {
    /// Append a vertex
    fn add(&mut self, vertex: TexturedVertex3D);

    /// Submit everything accumulated since the last draw, returning the vertex
    /// count. Vertices a full batch already flushed on `add` are included.
    fn draw(&mut self) -> usize;

    /// Maximum number of vertices per submission
    fn size(&self) -> usize;
}

/// Off-screen render target
pub trait FrameBuffer: Send {
    /// Current size in pixels
    fn size(&self) -> Vec2;

    /// Resize, reallocating the backing texture when the size changes
    fn set_size(&mut self, size: Vec2);

    /// Redirect subsequent drawing into this buffer
    fn bind(&mut self);

    /// Restore the previous render target
    fn unbind(&mut self);

    /// Texture holding the rendered content
    fn texture(&self) -> Texture;
}

/// Main rendering backend trait
///
/// Every `push_*` must be matched by the corresponding `pop_*`. Use the guards
/// from [`crate::render::RendererExt`] rather than calling these directly.
pub trait Renderer {
    /// Push a local (model) matrix
    fn push_local_matrix(&mut self, matrix: Mat4);
    /// Pop the local matrix
    fn pop_local_matrix(&mut self);

    /// Push a projection matrix
    fn push_projection_matrix(&mut self, matrix: Mat4);
    /// Pop the projection matrix
    fn pop_projection_matrix(&mut self);

    /// Push a depth configuration
    fn push_depth_info(&mut self, depth: DepthInfo);
    /// Pop the depth configuration
    fn pop_depth_info(&mut self);

    /// Push a viewport
    fn push_viewport(&mut self, viewport: RectI);
    /// Pop the viewport
    fn pop_viewport(&mut self);

    /// Push a scissor rectangle
    fn push_scissor(&mut self, scissor: RectI);
    /// Pop the scissor rectangle
    fn pop_scissor(&mut self);

    /// Push a scissor offset
    fn push_scissor_offset(&mut self, offset: Vec2);
    /// Pop the scissor offset
    fn pop_scissor_offset(&mut self);

    /// Push masking state; `overwrite_previous` ignores enclosing masks
    fn push_masking_info(&mut self, masking: MaskingInfo, overwrite_previous: bool);
    /// Pop masking state
    fn pop_masking_info(&mut self);

    /// Replace the current blend state
    fn set_blend(&mut self, blending: BlendingParameters);

    /// Clear the current render target
    fn clear(&mut self, info: ClearInfo);

    /// Bind a shader program
    fn bind_shader(&mut self, shader: &Shader);
    /// Unbind a shader program
    fn unbind_shader(&mut self, shader: &Shader);

    /// Bind a texture, returning whether it was available
    fn bind_texture(&mut self, texture: &Texture) -> bool;

    /// Create a batch that draws quads
    fn create_quad_batch(&mut self, size: usize, max_buffers: usize) -> Box<dyn VertexBatch>;

    /// Create a batch with an explicit topology
    fn create_linear_batch(&mut self, size: usize, max_buffers: usize, topology: PrimitiveTopology) -> Box<dyn VertexBatch>;

    /// Create an off-screen render target
    fn create_frame_buffer(&mut self) -> Box<dyn FrameBuffer>;

    /// Draw the content of a frame buffer into a screen-space rectangle
    fn draw_frame_buffer(&mut self, frame_buffer: &dyn FrameBuffer, destination: RectF, colour: DrawColourInfo);
}

/// Resolves shared resources on behalf of scene nodes
pub trait ResourceLoader: Send + Sync {
    /// Load (or fetch a cached) shader program for a descriptor pair
    fn load_shader(&self, vertex: VertexShaderDescriptor, fragment: FragmentShaderDescriptor) -> Option<Shader>;

    /// One-pixel opaque white texture used when a node has none of its own
    fn white_pixel(&self) -> Texture;
}
