//! # Rendering Abstraction
//!
//! The scene draws exclusively through the [`Renderer`] trait. A backend owns
//! the GPU objects; the scene sees only handles, state values and vertex
//! batches.
//!
//! ## Architecture
//!
//! - **api**: backend traits (`Renderer`, `VertexBatch`, `FrameBuffer`, `ResourceLoader`)
//! - **state**: values pushed onto the renderer's stacks
//! - **guard**: scoped push/pop helpers that unwind on every exit path
//! - **recording**: a headless backend used by tests and the demo

pub mod api;
pub mod guard;
pub mod recording;
pub mod resources;
pub mod state;
pub mod vertex;

pub use api::{FrameBuffer, Renderer, ResourceLoader, VertexBatch};
pub use guard::{FrameBufferBinding, RenderStateGuard, RendererExt};
pub use recording::{RecordingRenderer, RenderCommand, StaticResourceLoader};
pub use resources::{FragmentShaderDescriptor, Shader, ShaderId, Texture, TextureId, VertexShaderDescriptor};
pub use state::{
    BlendingParameters, ClearInfo, DepthFunction, DepthInfo, DrawColourInfo, MaskingInfo, PrimitiveTopology, RectI,
    RenderStack,
};
pub use vertex::TexturedVertex3D;

/// Errors detected while validating renderer usage
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A pop was issued on an empty stack
    #[error("Popped the {0} stack while it was empty")]
    StackUnderflow(RenderStack),

    /// A frame ended with entries still pushed
    #[error("Frame ended with {depth} entries left on the {stack} stack")]
    UnbalancedStack {
        /// Offending stack
        stack: RenderStack,
        /// Entries left over
        depth: usize,
    },
}

/// Result type for renderer validation
pub type RenderResult<T> = Result<T, RenderError>;
