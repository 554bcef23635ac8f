//! Textured cube node

use crate::foundation::math::Colour4;
use crate::render::api::ResourceLoader;
use crate::render::resources::{FragmentShaderDescriptor, Shader, Texture, VertexShaderDescriptor};
use crate::render::state::DrawColourInfo;
use crate::scene::error::SceneResult;
use crate::scene::invalidation::Invalidation;
use crate::scene::node::TextureSlot;
use crate::scene::solid::Solid;

/// A cube textured on all six walls
#[derive(Debug, Clone, Default)]
pub struct Cube {
    solid: Solid,
    texture: TextureSlot,
    shader: Option<Shader>,
}

impl Cube {
    /// Create an untextured cube
    pub fn new() -> Self {
        Self::default()
    }

    /// Spatial state
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Mutable spatial state
    pub fn solid_mut(&mut self) -> &mut Solid {
        &mut self.solid
    }

    /// Texture to draw with, or the white pixel once loaded
    pub fn texture(&self) -> Option<Texture> {
        self.texture.resolved()
    }

    /// Replace the texture. The previous one is released.
    pub fn set_texture(&mut self, texture: Option<Texture>) {
        if self.texture.set(texture) {
            self.solid.invalidate(Invalidation::DRAW_NODE);
        }
    }

    /// Resolved shader
    pub fn shader(&self) -> Option<Shader> {
        self.shader
    }

    /// Resolve the shader and the fallback texture
    pub fn load(&mut self, resources: &dyn ResourceLoader) {
        self.shader = resources.load_shader(VertexShaderDescriptor::Texture3, FragmentShaderDescriptor::Texture);
        self.texture.set_white_pixel(resources.white_pixel());
        self.solid.invalidate(Invalidation::DRAW_NODE);
    }

    /// Always white; only the blending comes from the node
    pub fn draw_colour_info(&self) -> DrawColourInfo {
        DrawColourInfo::new(Colour4::WHITE, self.solid.blending())
    }

    /// Dispose and release the texture
    pub fn dispose(&mut self) -> SceneResult<()> {
        self.solid.dispose()?;
        self.texture.release();
        Ok(())
    }
}
