//! Render state values pushed onto the renderer's stacks

use std::fmt;

use crate::foundation::math::{Colour4, Mat4, RectF, Vec2};

/// Depth comparison used when depth testing is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunction {
    /// Never pass
    Never,
    /// Pass if the incoming depth is less than the stored depth
    Less,
    /// Pass if equal
    Equal,
    /// Pass if less or equal
    LessOrEqual,
    /// Pass if greater
    Greater,
    /// Always pass
    Always,
}

/// Depth test configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthInfo {
    /// Whether fragments are tested against the depth buffer
    pub depth_test: bool,
    /// Whether passing fragments write their depth
    pub write_depth: bool,
    /// Comparison function
    pub function: DepthFunction,
}

impl DepthInfo {
    /// Depth test and write enabled, nearer fragments win
    pub const DEFAULT: Self = Self {
        depth_test: true,
        write_depth: true,
        function: DepthFunction::Less,
    };

    /// Depth test disabled
    pub const DISABLED: Self = Self {
        depth_test: false,
        write_depth: false,
        function: DepthFunction::Always,
    };
}

impl Default for DepthInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Blend factor applied to source or destination colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendingType {
    /// Inherit from the enclosing node
    Inherit,
    /// Factor 1
    One,
    /// Factor 0
    Zero,
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
}

/// Equation combining source and destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendingEquation {
    /// Inherit from the enclosing node
    Inherit,
    /// source + destination
    Add,
    /// min(source, destination)
    Min,
    /// max(source, destination)
    Max,
}

/// Full blend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendingParameters {
    /// Colour source factor
    pub source: BlendingType,
    /// Colour destination factor
    pub destination: BlendingType,
    /// Alpha source factor
    pub source_alpha: BlendingType,
    /// Alpha destination factor
    pub destination_alpha: BlendingType,
    /// Colour equation
    pub rgb_equation: BlendingEquation,
    /// Alpha equation
    pub alpha_equation: BlendingEquation,
}

impl BlendingParameters {
    /// Blending disabled: the source replaces the destination
    pub const NONE: Self = Self {
        source: BlendingType::One,
        destination: BlendingType::Zero,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::Zero,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };

    /// Take every parameter from the enclosing node
    pub const INHERIT: Self = Self {
        source: BlendingType::Inherit,
        destination: BlendingType::Inherit,
        source_alpha: BlendingType::Inherit,
        destination_alpha: BlendingType::Inherit,
        rgb_equation: BlendingEquation::Inherit,
        alpha_equation: BlendingEquation::Inherit,
    };

    /// Standard alpha blending
    pub const MIXTURE: Self = Self {
        source: BlendingType::SrcAlpha,
        destination: BlendingType::OneMinusSrcAlpha,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::One,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };

    /// Additive blending
    pub const ADDITIVE: Self = Self {
        source: BlendingType::SrcAlpha,
        destination: BlendingType::One,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::One,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };
}

impl Default for BlendingParameters {
    fn default() -> Self {
        Self::INHERIT
    }
}

/// Colour and blending a node is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawColourInfo {
    /// Tint
    pub colour: Colour4,
    /// Blend state
    pub blending: BlendingParameters,
}

impl DrawColourInfo {
    /// Create from a colour and blending
    pub const fn new(colour: Colour4, blending: BlendingParameters) -> Self {
        Self { colour, blending }
    }
}

impl Default for DrawColourInfo {
    fn default() -> Self {
        Self::new(Colour4::WHITE, BlendingParameters::INHERIT)
    }
}

/// Parameters of a clear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearInfo {
    /// Colour written to every pixel
    pub colour: Colour4,
    /// Depth written to the depth buffer
    pub depth: f64,
    /// Stencil value
    pub stencil: i32,
}

impl ClearInfo {
    /// Clear to a colour with default depth and stencil
    pub const fn new(colour: Colour4) -> Self {
        Self { colour, depth: 1.0, stencil: 0 }
    }
}

/// Integer rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectI {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl RectI {
    /// Create a rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Masking state pushed while rendering an isolated subtree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskingInfo {
    /// Screen-space bounds of the masked area
    pub screen_space_aabb: RectI,
    /// Masking rectangle in masking space
    pub masking_rect: RectF,
    /// Transform from screen space to masking space
    pub to_masking_space: Mat4,
    /// Width of the smoothed edge
    pub blend_range: f32,
    /// Exponent applied to the edge alpha
    pub alpha_exponent: f32,
}

/// Primitive assembly for linear batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Independent triangles
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Independent lines
    Lines,
    /// Quads (four vertices each)
    Quads,
}

/// The renderer's push/pop stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStack {
    /// Local (model) matrix
    LocalMatrix,
    /// Projection matrix
    ProjectionMatrix,
    /// Depth configuration
    Depth,
    /// Viewport
    Viewport,
    /// Scissor rectangle
    Scissor,
    /// Scissor offset
    ScissorOffset,
    /// Masking
    Masking,
    /// Shader binding
    Shader,
    /// Frame buffer binding
    FrameBuffer,
}

impl fmt::Display for RenderStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocalMatrix => "local matrix",
            Self::ProjectionMatrix => "projection matrix",
            Self::Depth => "depth",
            Self::Viewport => "viewport",
            Self::Scissor => "scissor",
            Self::ScissorOffset => "scissor offset",
            Self::Masking => "masking",
            Self::Shader => "shader",
            Self::FrameBuffer => "frame buffer",
        };
        f.write_str(name)
    }
}

/// Offset applied to scissor rectangles, in pixels
pub type ScissorOffset = Vec2;
