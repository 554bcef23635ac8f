//! Vertex types for 3D geometry

use crate::foundation::math::{Colour4, Vec2, Vec3};

/// Vertex with position, colour and texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex3D {
    /// Position in local space
    pub position: [f32; 3],
    /// Vertex colour
    pub colour: Colour4,
    /// Normalised texture coordinates
    pub texture_position: [f32; 2],
}

impl TexturedVertex3D {
    /// Build a vertex from math types
    pub fn new(position: Vec3, colour: Colour4, texture_position: Vec2) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            colour,
            texture_position: [texture_position.x, texture_position.y],
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Texture coordinates as a vector
    pub fn texture_position(&self) -> Vec2 {
        Vec2::new(self.texture_position[0], self.texture_position[1])
    }
}
