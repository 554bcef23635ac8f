//! Math utilities and types
//!
//! Provides the vector, matrix and quaternion aliases used throughout the scene,
//! plus the rectangle and cube primitives the layout and camera code works with.

pub use nalgebra::{
    Vector2, Vector3,
    Matrix4,
    Quaternion,
    Unit,
};
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerances used when comparing or sanitising floating point values.
pub struct Precision;

impl Precision {
    /// Smallest magnitude a scale component may take before it is clamped.
    pub const FLOAT_EPSILON: f32 = 1e-3;

    /// Replace a component whose magnitude is below the epsilon with the
    /// epsilon itself, keeping its sign.
    pub fn clamp_magnitude(value: f32) -> f32 {
        if value.abs() < Self::FLOAT_EPSILON {
            Self::FLOAT_EPSILON.copysign(value)
        } else {
            value
        }
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a right-handed perspective projection from a vertical field of view
    ///
    /// Depth maps to `[-1, 1]`, matching `nalgebra::Perspective3`.
    fn perspective_field_of_view(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Whether every element is finite
    fn all_finite(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn perspective_field_of_view(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = f / aspect;
        result[(1, 1)] = f;
        result[(2, 2)] = (far + near) / (near - far);
        result[(2, 3)] = 2.0 * far * near / (near - far);
        result[(3, 2)] = -1.0;

        result
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

/// RGBA colour with components in `[0, 1]`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Colour4 {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Colour4 {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque red
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a colour from its components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Colour4 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Axis-aligned rectangle in floating point coordinates.
///
/// `y` grows downwards, so `top` is `y` and `bottom` is `y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl RectF {
    /// Create a rectangle from its location and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Whether either dimension is zero, negative or not a number
    pub fn has_zero_area(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Axis-aligned box described by its upper-left-front corner and its size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubeF {
    /// X of the upper-left-front corner
    pub x: f32,
    /// Y of the upper-left-front corner
    pub y: f32,
    /// Z of the upper-left-front corner
    pub z: f32,
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub height: f32,
    /// Extent along Z
    pub depth: f32,
}

impl CubeF {
    /// A cube with every member zeroed
    pub const EMPTY: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// Create a cube from its corner and extents
    pub const fn new(x: f32, y: f32, z: f32, width: f32, height: f32, depth: f32) -> Self {
        Self { x, y, z, width, height, depth }
    }

    /// Create a cube from a location and a size vector
    pub fn from_location_size(location: Vec3, size: Vec3) -> Self {
        Self::new(location.x, location.y, location.z, size.x, size.y, size.z)
    }

    /// Upper-left-front corner
    pub fn location(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Extents
    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    /// Centre point
    pub fn centre(&self) -> Vec3 {
        Vec3::new(
            self.x + self.width / 2.0,
            self.y + self.height / 2.0,
            self.z + self.depth / 2.0,
        )
    }

    /// Whether any extent is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0 || self.depth <= 0.0
    }

    /// Width × height × depth
    pub fn volume(&self) -> f32 {
        self.width * self.height * self.depth
    }

    /// Whether the point lies inside (max edges exclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.x <= point.x
            && point.x < self.x + self.width
            && self.y <= point.y
            && point.y < self.y + self.height
            && self.z <= point.z
            && point.z < self.z + self.depth
    }

    /// Whether `other` lies entirely inside this cube
    pub fn contains(&self, other: &Self) -> bool {
        self.x <= other.x
            && other.x + other.width <= self.x + self.width
            && self.y <= other.y
            && other.y + other.height <= self.y + self.height
            && self.z <= other.z
            && other.z + other.depth <= self.z + self.depth
    }

    /// Same box with all extents made positive
    pub fn with_positive_extent(&self) -> Self {
        let mut result = *self;
        if result.width < 0.0 {
            result.width = -result.width;
            result.x -= result.width;
        }
        if result.height < 0.0 {
            result.height = -result.height;
            result.y -= result.height;
        }
        if result.depth < 0.0 {
            result.depth = -result.depth;
            result.z -= result.depth;
        }
        result
    }

    /// Overlapping volume of two cubes, or [`CubeF::EMPTY`] when disjoint
    pub fn intersect(a: &Self, b: &Self) -> Self {
        let x = a.x.max(b.x);
        let right = (a.x + a.width).min(b.x + b.width);
        let y = a.y.max(b.y);
        let bottom = (a.y + a.height).min(b.y + b.height);
        let z = a.z.max(b.z);
        let back = (a.z + a.depth).min(b.z + b.depth);

        if right >= x && bottom >= y && back >= z {
            Self::new(x, y, z, right - x, bottom - y, back - z)
        } else {
            Self::EMPTY
        }
    }

    /// Whether the two cubes overlap or touch
    pub fn intersects_with(&self, other: &Self) -> bool {
        other.x <= self.x + self.width
            && self.x <= other.x + other.width
            && other.y <= self.y + self.height
            && self.y <= other.y + other.height
            && other.z <= self.z + self.depth
            && self.z <= other.z + other.depth
    }

    /// Smallest cube containing both
    pub fn union(a: &Self, b: &Self) -> Self {
        let x = a.x.min(b.x);
        let right = (a.x + a.width).max(b.x + b.width);
        let y = a.y.min(b.y);
        let bottom = (a.y + a.height).max(b.y + b.height);
        let z = a.z.min(b.z);
        let back = (a.z + a.depth).max(b.z + b.depth);
        Self::new(x, y, z, right - x, bottom - y, back - z)
    }

    /// Translated copy
    pub fn offset(&self, by: Vec3) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.z + by.z, self.width, self.height, self.depth)
    }

    /// Copy with location and size scaled per axis
    pub fn scaled(&self, scale: Vec3) -> Self {
        Self::new(
            self.x * scale.x,
            self.y * scale.y,
            self.z * scale.z,
            self.width * scale.x,
            self.height * scale.y,
            self.depth * scale.z,
        )
    }
}
