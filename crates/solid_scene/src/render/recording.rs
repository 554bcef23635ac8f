//! Headless renderer that records every call
//!
//! Used by tests and by the demo binary. Batches and frame buffers created by
//! the recorder write into the same shared log, so a frame can be inspected as
//! one ordered command list. Stack depths are tracked per [`RenderStack`]; an
//! unmatched pop is recorded as a violation and reported by
//! [`RecordingRenderer::finish_frame`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::math::{Mat4, RectF, Vec2};
use crate::render::api::{FrameBuffer, Renderer, ResourceLoader, VertexBatch};
use crate::render::resources::{
    FragmentShaderDescriptor, Shader, ShaderId, Texture, TextureId, VertexShaderDescriptor,
};
use crate::render::state::{
    BlendingParameters, ClearInfo, DepthInfo, DrawColourInfo, MaskingInfo, PrimitiveTopology, RectI, RenderStack,
};
use crate::render::vertex::TexturedVertex3D;
use crate::render::{RenderError, RenderResult};

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Local matrix pushed
    PushLocalMatrix(Mat4),
    /// Local matrix popped
    PopLocalMatrix,
    /// Projection pushed
    PushProjectionMatrix(Mat4),
    /// Projection popped
    PopProjectionMatrix,
    /// Depth configuration pushed
    PushDepthInfo(DepthInfo),
    /// Depth configuration popped
    PopDepthInfo,
    /// Viewport pushed
    PushViewport(RectI),
    /// Viewport popped
    PopViewport,
    /// Scissor pushed
    PushScissor(RectI),
    /// Scissor popped
    PopScissor,
    /// Scissor offset pushed
    PushScissorOffset(Vec2),
    /// Scissor offset popped
    PopScissorOffset,
    /// Masking pushed
    PushMaskingInfo {
        /// Masking state
        masking: MaskingInfo,
        /// Whether enclosing masks were ignored
        overwrite_previous: bool,
    },
    /// Masking popped
    PopMaskingInfo,
    /// Blend state replaced
    SetBlend(BlendingParameters),
    /// Render target cleared
    Clear(ClearInfo),
    /// Shader bound
    BindShader(Shader),
    /// Shader unbound
    UnbindShader(Shader),
    /// Texture bound
    BindTexture(TextureId),
    /// Batch created
    CreateBatch {
        /// Primitive assembly
        topology: PrimitiveTopology,
        /// Vertices per submission
        size: usize,
        /// Buffer count
        max_buffers: usize,
    },
    /// Vertices submitted
    DrawVertices {
        /// Primitive assembly
        topology: PrimitiveTopology,
        /// Submitted vertices, in order
        vertices: Vec<TexturedVertex3D>,
    },
    /// Frame buffer created
    CreateFrameBuffer(TextureId),
    /// Frame buffer bound
    BindFrameBuffer {
        /// Backing texture
        texture: TextureId,
        /// Size at bind time
        size: Vec2,
    },
    /// Frame buffer unbound
    UnbindFrameBuffer(TextureId),
    /// Frame buffer content drawn to screen
    DrawFrameBuffer {
        /// Backing texture
        texture: TextureId,
        /// Screen-space destination
        destination: RectF,
        /// Draw colour
        colour: DrawColourInfo,
    },
}

#[derive(Debug, Default)]
struct RecordingLog {
    commands: Vec<RenderCommand>,
    depths: HashMap<RenderStack, usize>,
    violations: Vec<RenderError>,
}

impl RecordingLog {
    fn push(&mut self, stack: RenderStack, command: RenderCommand) {
        *self.depths.entry(stack).or_insert(0) += 1;
        self.commands.push(command);
    }

    fn pop(&mut self, stack: RenderStack, command: RenderCommand) {
        let depth = self.depths.entry(stack).or_insert(0);
        if *depth == 0 {
            log::error!("Popped the {stack} stack while it was empty");
            self.violations.push(RenderError::StackUnderflow(stack));
        } else {
            *depth -= 1;
        }
        self.commands.push(command);
    }
}

type SharedLog = Arc<Mutex<RecordingLog>>;

fn lock(log: &SharedLog) -> MutexGuard<'_, RecordingLog> {
    // A panic while recording only leaves an incomplete log behind
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1 << 32);

fn next_texture_id() -> TextureId {
    TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Renderer that records instead of drawing
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    log: SharedLog,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn commands(&self) -> Vec<RenderCommand> {
        lock(&self.log).commands.clone()
    }

    /// Remove and return everything recorded so far
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut lock(&self.log).commands)
    }

    /// Number of recorded commands matching a predicate
    pub fn count(&self, predicate: impl Fn(&RenderCommand) -> bool) -> usize {
        lock(&self.log).commands.iter().filter(|c| predicate(c)).count()
    }

    /// Every vertex submitted by any batch, in submission order
    pub fn drawn_vertices(&self) -> Vec<TexturedVertex3D> {
        lock(&self.log)
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawVertices { vertices, .. } => Some(vertices.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Current depth of one stack
    pub fn stack_depth(&self, stack: RenderStack) -> usize {
        lock(&self.log).depths.get(&stack).copied().unwrap_or(0)
    }

    /// Verify that every push of the frame was popped.
    ///
    /// Resets the depth and violation tracking, keeping the command log.
    pub fn finish_frame(&mut self) -> RenderResult<()> {
        let mut log = lock(&self.log);
        let violations = std::mem::take(&mut log.violations);
        let depths = std::mem::take(&mut log.depths);

        if let Some(violation) = violations.into_iter().next() {
            return Err(violation);
        }

        if let Some((&stack, &depth)) = depths.iter().find(|(_, depth)| **depth != 0) {
            log::error!("Frame ended with {depth} entries left on the {stack} stack");
            return Err(RenderError::UnbalancedStack { stack, depth });
        }

        Ok(())
    }

    fn record(&self, command: RenderCommand) {
        lock(&self.log).commands.push(command);
    }

    fn push(&self, stack: RenderStack, command: RenderCommand) {
        lock(&self.log).push(stack, command);
    }

    fn pop(&self, stack: RenderStack, command: RenderCommand) {
        lock(&self.log).pop(stack, command);
    }

    fn create_batch(&mut self, size: usize, max_buffers: usize, topology: PrimitiveTopology) -> Box<dyn VertexBatch> {
        self.record(RenderCommand::CreateBatch { topology, size, max_buffers });
        Box::new(RecordingBatch {
            log: Arc::clone(&self.log),
            topology,
            size,
            pending: Vec::with_capacity(size),
            submitted: 0,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn push_local_matrix(&mut self, matrix: Mat4) {
        self.push(RenderStack::LocalMatrix, RenderCommand::PushLocalMatrix(matrix));
    }

    fn pop_local_matrix(&mut self) {
        self.pop(RenderStack::LocalMatrix, RenderCommand::PopLocalMatrix);
    }

    fn push_projection_matrix(&mut self, matrix: Mat4) {
        self.push(RenderStack::ProjectionMatrix, RenderCommand::PushProjectionMatrix(matrix));
    }

    fn pop_projection_matrix(&mut self) {
        self.pop(RenderStack::ProjectionMatrix, RenderCommand::PopProjectionMatrix);
    }

    fn push_depth_info(&mut self, depth: DepthInfo) {
        self.push(RenderStack::Depth, RenderCommand::PushDepthInfo(depth));
    }

    fn pop_depth_info(&mut self) {
        self.pop(RenderStack::Depth, RenderCommand::PopDepthInfo);
    }

    fn push_viewport(&mut self, viewport: RectI) {
        self.push(RenderStack::Viewport, RenderCommand::PushViewport(viewport));
    }

    fn pop_viewport(&mut self) {
        self.pop(RenderStack::Viewport, RenderCommand::PopViewport);
    }

    fn push_scissor(&mut self, scissor: RectI) {
        self.push(RenderStack::Scissor, RenderCommand::PushScissor(scissor));
    }

    fn pop_scissor(&mut self) {
        self.pop(RenderStack::Scissor, RenderCommand::PopScissor);
    }

    fn push_scissor_offset(&mut self, offset: Vec2) {
        self.push(RenderStack::ScissorOffset, RenderCommand::PushScissorOffset(offset));
    }

    fn pop_scissor_offset(&mut self) {
        self.pop(RenderStack::ScissorOffset, RenderCommand::PopScissorOffset);
    }

    fn push_masking_info(&mut self, masking: MaskingInfo, overwrite_previous: bool) {
        self.push(
            RenderStack::Masking,
            RenderCommand::PushMaskingInfo { masking, overwrite_previous },
        );
    }

    fn pop_masking_info(&mut self) {
        self.pop(RenderStack::Masking, RenderCommand::PopMaskingInfo);
    }

    fn set_blend(&mut self, blending: BlendingParameters) {
        self.record(RenderCommand::SetBlend(blending));
    }

    fn clear(&mut self, info: ClearInfo) {
        self.record(RenderCommand::Clear(info));
    }

    fn bind_shader(&mut self, shader: &Shader) {
        self.push(RenderStack::Shader, RenderCommand::BindShader(*shader));
    }

    fn unbind_shader(&mut self, shader: &Shader) {
        self.pop(RenderStack::Shader, RenderCommand::UnbindShader(*shader));
    }

    fn bind_texture(&mut self, texture: &Texture) -> bool {
        if !texture.available() {
            log::warn!("Attempted to bind released texture {:?}", texture.id());
            return false;
        }
        self.record(RenderCommand::BindTexture(texture.id()));
        true
    }

    fn create_quad_batch(&mut self, size: usize, max_buffers: usize) -> Box<dyn VertexBatch> {
        self.create_batch(size, max_buffers, PrimitiveTopology::Quads)
    }

    fn create_linear_batch(&mut self, size: usize, max_buffers: usize, topology: PrimitiveTopology) -> Box<dyn VertexBatch> {
        self.create_batch(size, max_buffers, topology)
    }

    fn create_frame_buffer(&mut self) -> Box<dyn FrameBuffer> {
        let texture = Texture::new(next_texture_id(), 1, 1);
        self.record(RenderCommand::CreateFrameBuffer(texture.id()));
        Box::new(RecordingFrameBuffer {
            log: Arc::clone(&self.log),
            size: Vec2::new(1.0, 1.0),
            texture,
        })
    }

    fn draw_frame_buffer(&mut self, frame_buffer: &dyn FrameBuffer, destination: RectF, colour: DrawColourInfo) {
        self.record(RenderCommand::DrawFrameBuffer {
            texture: frame_buffer.texture().id(),
            destination,
            colour,
        });
    }
}

struct RecordingBatch {
    log: SharedLog,
    topology: PrimitiveTopology,
    size: usize,
    pending: Vec<TexturedVertex3D>,
    /// Vertices flushed early by `add` since the last draw
    submitted: usize,
}

impl RecordingBatch {
    fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let vertices = std::mem::take(&mut self.pending);
        let count = vertices.len();
        lock(&self.log).commands.push(RenderCommand::DrawVertices {
            topology: self.topology,
            vertices,
        });
        count
    }
}

impl VertexBatch for RecordingBatch {
    fn add(&mut self, vertex: TexturedVertex3D) {
        if self.pending.len() >= self.size {
            self.submitted += self.flush();
        }
        self.pending.push(vertex);
    }

    fn draw(&mut self) -> usize {
        let flushed = self.flush();
        std::mem::take(&mut self.submitted) + flushed
    }

    fn size(&self) -> usize {
        self.size
    }
}

struct RecordingFrameBuffer {
    log: SharedLog,
    size: Vec2,
    texture: Texture,
}

impl FrameBuffer for RecordingFrameBuffer {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    fn bind(&mut self) {
        lock(&self.log).push(
            RenderStack::FrameBuffer,
            RenderCommand::BindFrameBuffer {
                texture: self.texture.id(),
                size: self.size,
            },
        );
    }

    fn unbind(&mut self) {
        lock(&self.log).pop(RenderStack::FrameBuffer, RenderCommand::UnbindFrameBuffer(self.texture.id()));
    }

    fn texture(&self) -> Texture {
        self.texture.clone()
    }
}

/// Resource loader backed by fixed handles
#[derive(Debug, Clone)]
pub struct StaticResourceLoader {
    white_pixel: Texture,
    shaders_available: bool,
}

impl Default for StaticResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticResourceLoader {
    /// Loader that resolves every shader
    pub fn new() -> Self {
        Self {
            white_pixel: Texture::new(TextureId(0), 1, 1),
            shaders_available: true,
        }
    }

    /// Loader whose shader lookups all fail
    pub fn without_shaders() -> Self {
        Self {
            shaders_available: false,
            ..Self::new()
        }
    }
}

impl ResourceLoader for StaticResourceLoader {
    fn load_shader(&self, vertex: VertexShaderDescriptor, fragment: FragmentShaderDescriptor) -> Option<Shader> {
        if !self.shaders_available {
            log::warn!("No shader program for {vertex:?}/{fragment:?}");
            return None;
        }
        let id = ShaderId(((vertex as u64) << 8) | fragment as u64);
        Some(Shader { id, vertex, fragment })
    }

    fn white_pixel(&self) -> Texture {
        self.white_pixel.clone()
    }
}
