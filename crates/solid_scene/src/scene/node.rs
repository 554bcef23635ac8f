//! The node kinds a camera can hold

use crate::render::api::ResourceLoader;
use crate::render::resources::Texture;
use crate::scene::cube::Cube;
use crate::scene::error::SceneResult;
use crate::scene::path::SpacePath;
use crate::scene::solid::Solid;

slotmap::new_key_type! {
    /// Handle to a node owned by a camera
    pub struct NodeId;
}

/// A scene node of any kind
#[derive(Debug, Clone)]
pub enum SceneNode {
    /// Plain spatial node with no geometry of its own
    Solid(Solid),
    /// Textured cube
    Cube(Cube),
    /// Ribbon along a vertex list
    Path(SpacePath),
}

impl SceneNode {
    /// The spatial part shared by every kind
    pub fn solid(&self) -> &Solid {
        match self {
            Self::Solid(solid) => solid,
            Self::Cube(cube) => cube.solid(),
            Self::Path(path) => path.solid(),
        }
    }

    /// Mutable access to the spatial part
    pub fn solid_mut(&mut self) -> &mut Solid {
        match self {
            Self::Solid(solid) => solid,
            Self::Cube(cube) => cube.solid_mut(),
            Self::Path(path) => path.solid_mut(),
        }
    }

    /// The cube, if this is one
    pub fn as_cube_mut(&mut self) -> Option<&mut Cube> {
        match self {
            Self::Cube(cube) => Some(cube),
            _ => None,
        }
    }

    /// The path, if this is one
    pub fn as_path_mut(&mut self) -> Option<&mut SpacePath> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Resolve shaders and fallback textures
    pub fn load(&mut self, resources: &dyn ResourceLoader) {
        match self {
            Self::Solid(_) => {}
            Self::Cube(cube) => cube.load(resources),
            Self::Path(path) => path.load(resources),
        }
    }

    /// Dispose the node and release anything it owns
    pub fn dispose(&mut self) -> SceneResult<()> {
        match self {
            Self::Solid(solid) => solid.dispose(),
            Self::Cube(cube) => cube.dispose(),
            Self::Path(path) => path.dispose(),
        }
    }

    /// Short name of the kind, for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Solid(_) => "solid",
            Self::Cube(_) => "cube",
            Self::Path(_) => "path",
        }
    }
}

impl From<Solid> for SceneNode {
    fn from(solid: Solid) -> Self {
        Self::Solid(solid)
    }
}

impl From<Cube> for SceneNode {
    fn from(cube: Cube) -> Self {
        Self::Cube(cube)
    }
}

impl From<SpacePath> for SceneNode {
    fn from(path: SpacePath) -> Self {
        Self::Path(path)
    }
}

/// A node's own texture with the renderer's white pixel as fallback.
///
/// The slot owns its texture: replacing or releasing it disposes the old one.
#[derive(Debug, Clone, Default)]
pub struct TextureSlot {
    texture: Option<Texture>,
    white_pixel: Option<Texture>,
}

impl TextureSlot {
    /// Own texture, falling back to the white pixel once loaded
    pub fn resolved(&self) -> Option<Texture> {
        self.texture.clone().or_else(|| self.white_pixel.clone())
    }

    /// Replace the own texture; returns false when unchanged
    pub fn set(&mut self, texture: Option<Texture>) -> bool {
        if self.texture == texture {
            return false;
        }
        if let Some(previous) = self.texture.take() {
            previous.dispose();
        }
        self.texture = texture;
        true
    }

    /// Remember the shared fallback
    pub fn set_white_pixel(&mut self, white_pixel: Texture) {
        self.white_pixel = Some(white_pixel);
    }

    /// Dispose the own texture. The shared fallback is left alone.
    pub fn release(&mut self) {
        if let Some(texture) = self.texture.take() {
            texture.dispose();
        }
    }
}
