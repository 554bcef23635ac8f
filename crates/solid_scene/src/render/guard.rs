//! Scoped render state
//!
//! Each guard performs one push (or bind) when created and the matching pop
//! (or unbind) when dropped. Guards borrow the renderer mutably and deref to
//! it, so nested state is expressed by nesting guards and unwinds in LIFO order
//! on every exit path.

use std::ops::{Deref, DerefMut};

use crate::foundation::math::{Mat4, Vec2};
use crate::render::api::{FrameBuffer, Renderer};
use crate::render::resources::Shader;
use crate::render::state::{DepthInfo, MaskingInfo, RectI, RenderStack};

#[derive(Debug, Clone, Copy)]
enum Restore {
    LocalMatrix,
    ProjectionMatrix,
    Depth,
    Viewport,
    Scissor,
    ScissorOffset,
    Masking,
    Shader(Shader),
}

impl Restore {
    fn stack(self) -> RenderStack {
        match self {
            Self::LocalMatrix => RenderStack::LocalMatrix,
            Self::ProjectionMatrix => RenderStack::ProjectionMatrix,
            Self::Depth => RenderStack::Depth,
            Self::Viewport => RenderStack::Viewport,
            Self::Scissor => RenderStack::Scissor,
            Self::ScissorOffset => RenderStack::ScissorOffset,
            Self::Masking => RenderStack::Masking,
            Self::Shader(_) => RenderStack::Shader,
        }
    }
}

/// Holds one pushed renderer state until dropped
#[must_use = "the state is popped as soon as the guard is dropped"]
pub struct RenderStateGuard<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
    restore: Restore,
}

impl<'a, R: Renderer + ?Sized> RenderStateGuard<'a, R> {
    fn new(renderer: &'a mut R, restore: Restore) -> Self {
        Self { renderer, restore }
    }

    /// Which stack this guard will pop
    pub fn stack(&self) -> RenderStack {
        self.restore.stack()
    }
}

impl<R: Renderer + ?Sized> Deref for RenderStateGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> DerefMut for RenderStateGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> Drop for RenderStateGuard<'_, R> {
    fn drop(&mut self) {
        match self.restore {
            Restore::LocalMatrix => self.renderer.pop_local_matrix(),
            Restore::ProjectionMatrix => self.renderer.pop_projection_matrix(),
            Restore::Depth => self.renderer.pop_depth_info(),
            Restore::Viewport => self.renderer.pop_viewport(),
            Restore::Scissor => self.renderer.pop_scissor(),
            Restore::ScissorOffset => self.renderer.pop_scissor_offset(),
            Restore::Masking => self.renderer.pop_masking_info(),
            Restore::Shader(shader) => self.renderer.unbind_shader(&shader),
        }
    }
}

/// Guard-returning push helpers, available on every [`Renderer`]
pub trait RendererExt: Renderer {
    /// Push a local matrix for the guard's lifetime
    fn scoped_local_matrix(&mut self, matrix: Mat4) -> RenderStateGuard<'_, Self> {
        self.push_local_matrix(matrix);
        RenderStateGuard::new(self, Restore::LocalMatrix)
    }

    /// Push a projection matrix for the guard's lifetime
    fn scoped_projection_matrix(&mut self, matrix: Mat4) -> RenderStateGuard<'_, Self> {
        self.push_projection_matrix(matrix);
        RenderStateGuard::new(self, Restore::ProjectionMatrix)
    }

    /// Push a depth configuration for the guard's lifetime
    fn scoped_depth_info(&mut self, depth: DepthInfo) -> RenderStateGuard<'_, Self> {
        self.push_depth_info(depth);
        RenderStateGuard::new(self, Restore::Depth)
    }

    /// Push a viewport for the guard's lifetime
    fn scoped_viewport(&mut self, viewport: RectI) -> RenderStateGuard<'_, Self> {
        self.push_viewport(viewport);
        RenderStateGuard::new(self, Restore::Viewport)
    }

    /// Push a scissor rectangle for the guard's lifetime
    fn scoped_scissor(&mut self, scissor: RectI) -> RenderStateGuard<'_, Self> {
        self.push_scissor(scissor);
        RenderStateGuard::new(self, Restore::Scissor)
    }

    /// Push a scissor offset for the guard's lifetime
    fn scoped_scissor_offset(&mut self, offset: Vec2) -> RenderStateGuard<'_, Self> {
        self.push_scissor_offset(offset);
        RenderStateGuard::new(self, Restore::ScissorOffset)
    }

    /// Push masking state for the guard's lifetime
    fn scoped_masking_info(&mut self, masking: MaskingInfo, overwrite_previous: bool) -> RenderStateGuard<'_, Self> {
        self.push_masking_info(masking, overwrite_previous);
        RenderStateGuard::new(self, Restore::Masking)
    }

    /// Bind a shader for the guard's lifetime
    fn scoped_shader(&mut self, shader: Shader) -> RenderStateGuard<'_, Self> {
        self.bind_shader(&shader);
        RenderStateGuard::new(self, Restore::Shader(shader))
    }
}

impl<R: Renderer + ?Sized> RendererExt for R {}

/// Keeps a frame buffer bound until dropped
#[must_use = "the frame buffer is unbound as soon as the guard is dropped"]
pub struct FrameBufferBinding<'a> {
    frame_buffer: &'a mut dyn FrameBuffer,
}

impl<'a> FrameBufferBinding<'a> {
    /// Resize and bind
    pub fn bind(frame_buffer: &'a mut dyn FrameBuffer, size: Vec2) -> Self {
        frame_buffer.set_size(size);
        frame_buffer.bind();
        Self { frame_buffer }
    }
}

impl Drop for FrameBufferBinding<'_> {
    fn drop(&mut self) {
        self.frame_buffer.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{RecordingRenderer, RenderCommand};

    #[test]
    fn test_nested_guards_pop_in_reverse_order() {
        let mut renderer = RecordingRenderer::new();
        {
            let mut matrix = renderer.scoped_local_matrix(Mat4::identity());
            let mut depth = matrix.scoped_depth_info(DepthInfo::DEFAULT);
            assert_eq!(depth.stack(), RenderStack::Depth);
            depth.clear(crate::render::state::ClearInfo::new(crate::foundation::math::Colour4::BLACK));
        }

        let commands = renderer.commands();
        assert!(matches!(commands[0], RenderCommand::PushLocalMatrix(_)));
        assert!(matches!(commands[1], RenderCommand::PushDepthInfo(_)));
        assert!(matches!(commands[2], RenderCommand::Clear(_)));
        assert!(matches!(commands[3], RenderCommand::PopDepthInfo));
        assert!(matches!(commands[4], RenderCommand::PopLocalMatrix));
        assert!(renderer.finish_frame().is_ok());
    }

    #[test]
    fn test_guard_pops_on_early_return() {
        fn draw_until_missing(renderer: &mut dyn Renderer, has_texture: bool) -> Option<()> {
            let _matrix = renderer.scoped_local_matrix(Mat4::identity());
            if !has_texture {
                return None;
            }
            Some(())
        }

        let mut renderer = RecordingRenderer::new();
        assert!(draw_until_missing(&mut renderer, false).is_none());
        assert_eq!(renderer.stack_depth(RenderStack::LocalMatrix), 0);
        assert!(renderer.finish_frame().is_ok());
    }
}
