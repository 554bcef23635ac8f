//! Ribbon along an ordered list of 3D vertices

use crate::config::SceneConfig;
use crate::foundation::math::{Colour4, Vec3};
use crate::render::api::ResourceLoader;
use crate::render::resources::{FragmentShaderDescriptor, Shader, Texture, VertexShaderDescriptor};
use crate::render::state::DrawColourInfo;
use crate::scene::error::SceneResult;
use crate::scene::invalidation::Invalidation;
use crate::scene::node::TextureSlot;
use crate::scene::solid::Solid;

/// Half-width of a path unless configured otherwise
pub const DEFAULT_PATH_RADIUS: f32 = 10.0;

/// A path through 3D space drawn as a ribbon with rounded joints
#[derive(Debug, Clone)]
pub struct SpacePath {
    solid: Solid,
    vertices: Vec<Vec3>,
    path_radius: f32,
    texture: TextureSlot,
    shader: Option<Shader>,
}

impl Default for SpacePath {
    fn default() -> Self {
        Self::new()
    }
}

impl SpacePath {
    /// Create an empty path
    pub fn new() -> Self {
        Self {
            solid: Solid::new(),
            vertices: Vec::new(),
            path_radius: DEFAULT_PATH_RADIUS,
            texture: TextureSlot::default(),
            shader: None,
        }
    }

    /// Create an empty path with the configured radius
    pub fn with_config(config: &SceneConfig) -> Self {
        let mut path = Self::new();
        path.set_path_radius(config.path_radius);
        path
    }

    /// Spatial state
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Mutable spatial state
    pub fn solid_mut(&mut self) -> &mut Solid {
        &mut self.solid
    }

    /// Vertices in order
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Replace every vertex
    pub fn set_vertices(&mut self, vertices: impl IntoIterator<Item = Vec3>) {
        self.vertices.clear();
        self.vertices.extend(vertices);
        self.solid.invalidate(Invalidation::DRAW_SIZE | Invalidation::MISC_GEOMETRY);
    }

    /// Append one vertex
    pub fn add_vertex(&mut self, vertex: Vec3) {
        self.vertices.push(vertex);
        self.solid.invalidate(Invalidation::DRAW_SIZE | Invalidation::MISC_GEOMETRY);
    }

    /// Remove every vertex
    pub fn clear_vertices(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        self.vertices.clear();
        self.solid.invalidate(Invalidation::DRAW_SIZE | Invalidation::MISC_GEOMETRY);
    }

    /// Half-width of the ribbon; the drawn width is twice this
    pub fn path_radius(&self) -> f32 {
        self.path_radius
    }

    /// Set the half-width
    #[allow(clippy::float_cmp)]
    pub fn set_path_radius(&mut self, path_radius: f32) {
        if self.path_radius == path_radius {
            return;
        }
        self.path_radius = path_radius;
        self.solid.invalidate(Invalidation::DRAW_SIZE);
    }

    /// Consecutive vertex pairs, computed from the current vertex list
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        self.vertices.windows(2).map(|pair| (pair[0], pair[1])).collect()
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
