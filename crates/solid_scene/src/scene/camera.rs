//! Camera: the root of a 3D sub-scene
//!
//! A camera owns its children and renders them as an isolated pass through a
//! perspective projection derived from its field of view and the screen-space
//! rectangle it was laid out into.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use slotmap::SlotMap;

use crate::config::SceneConfig;
use crate::foundation::math::{Colour4, CubeF, Mat4, Mat4Ext, RectF, Vec2};
use crate::foundation::time::FrameClock;
use crate::render::api::{FrameBuffer, Renderer, ResourceLoader};
use crate::render::guard::{FrameBufferBinding, RendererExt};
use crate::render::state::{BlendingParameters, ClearInfo, DrawColourInfo, MaskingInfo, RectI};
use crate::scene::draw_node::CompositeDrawNode;
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::invalidation::{Invalidation, InvalidationState};
use crate::scene::node::{NodeId, SceneNode};
use crate::scene::solid::ParentLink;

/// Near clipping plane of every camera
pub const NEAR_PLANE: f32 = 0.1;

/// Far clipping plane of every camera
pub const FAR_PLANE: f32 = 1000.0;

static NEXT_CAMERA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u64);

impl CameraId {
    fn next() -> Self {
        Self(NEXT_CAMERA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Composite node that owns a 3D sub-scene
pub struct Camera {
    id: CameraId,
    children: SlotMap<NodeId, SceneNode>,
    next_child_id: u64,

    background_colour: Colour4,
    fov: f32,
    frame_buffer_draw_colour: Option<DrawColourInfo>,
    blending: BlendingParameters,
    draw_rectangle: RectF,
    use_frame_buffer: bool,

    clock: FrameClock,
    resources: Option<Arc<dyn ResourceLoader>>,
    invalidation: InvalidationState,
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("id", &self.id)
            .field("children", &self.children.len())
            .field("background_colour", &self.background_colour)
            .field("fov", &self.fov)
            .field("draw_rectangle", &self.draw_rectangle)
            .field("use_frame_buffer", &self.use_frame_buffer)
            .field("loaded", &self.resources.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Create an empty camera with a black background and a field of view of one radian
    pub fn new() -> Self {
        Self {
            id: CameraId::next(),
            children: SlotMap::with_key(),
            next_child_id: 0,
            background_colour: Colour4::BLACK,
            fov: 1.0,
            frame_buffer_draw_colour: None,
            blending: BlendingParameters::INHERIT,
            draw_rectangle: RectF::default(),
            use_frame_buffer: false,
            clock: FrameClock::new(),
            resources: None,
            invalidation: InvalidationState::default(),
        }
    }

    /// Create an empty camera from configuration
    pub fn with_config(config: &SceneConfig) -> Self {
        let mut camera = Self::new();
        camera.set_fov(config.fov);
        camera.set_background_colour(config.background_colour);
        camera.set_use_frame_buffer(config.use_frame_buffer);
        camera
    }

    /// Identity
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Time base shared with every child
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Colour the sub-scene is cleared to
    pub fn background_colour(&self) -> Colour4 {
        self.background_colour
    }

    /// Set the clear colour
    pub fn set_background_colour(&mut self, colour: Colour4) {
        if self.background_colour == colour {
            return;
        }
        self.background_colour = colour;
        self.invalidate(Invalidation::COLOUR);
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the field of view
    #[allow(clippy::float_cmp)]
    pub fn set_fov(&mut self, fov: f32) {
        if self.fov == fov {
            return;
        }
        self.fov = fov;
        self.invalidate(Invalidation::DRAW_INFO);
    }

    /// Colour used when compositing the frame buffer, if overridden
    pub fn frame_buffer_draw_colour(&self) -> Option<DrawColourInfo> {
        self.frame_buffer_draw_colour
    }

    /// Override the compositing colour
    pub fn set_frame_buffer_draw_colour(&mut self, colour: Option<DrawColourInfo>) {
        if self.frame_buffer_draw_colour == colour {
            return;
        }
        self.frame_buffer_draw_colour = colour;
        self.invalidate(Invalidation::COLOUR);
    }

    /// Blending inherited by the compositing colour
    pub fn blending(&self) -> BlendingParameters {
        self.blending
    }

    /// Set the inherited blending
    pub fn set_blending(&mut self, blending: BlendingParameters) {
        if self.blending == blending {
            return;
        }
        self.blending = blending;
        self.invalidate(Invalidation::COLOUR);
    }

    /// Screen-space rectangle the camera renders into
    pub fn draw_rectangle(&self) -> RectF {
        self.draw_rectangle
    }

    /// Written by the enclosing layout system
    pub fn set_draw_rectangle(&mut self, rectangle: RectF) {
        if self.draw_rectangle == rectangle {
            return;
        }
        self.draw_rectangle = rectangle;
        self.invalidate(Invalidation::DRAW_SIZE | Invalidation::DRAW_INFO);
    }

    /// Whether the sub-scene is rendered into its own frame buffer first
    pub fn use_frame_buffer(&self) -> bool {
        self.use_frame_buffer
    }

    /// Toggle frame-buffer isolation
    pub fn set_use_frame_buffer(&mut self, use_frame_buffer: bool) {
        if self.use_frame_buffer == use_frame_buffer {
            return;
        }
        self.use_frame_buffer = use_frame_buffer;
        self.invalidate(Invalidation::DRAW_NODE);
    }

    /// Resolve resources for every current and future child
    pub fn load(&mut self, resources: Arc<dyn ResourceLoader>) {
        for (_, node) in &mut self.children {
            node.load(resources.as_ref());
        }
        self.resources = Some(resources);
        log::debug!("{:?} loaded {} children", self.id, self.children.len());
    }

    /// Take ownership of a node.
    ///
    /// Fails if the node is disposed or still linked to another camera; the
    /// node is dropped and the camera is unchanged in that case.
    pub fn add(&mut self, node: impl Into<SceneNode>) -> SceneResult<NodeId> {
        let mut node = node.into();
        node.solid_mut()
            .set_parent(Some(ParentLink::new(self.id, self.clock.clone())))?;

        self.next_child_id += 1;
        node.solid_mut().set_child_id(self.next_child_id);
        if let Some(resources) = &self.resources {
            node.load(resources.as_ref());
        }

        let kind = node.kind_name();
        let id = self.children.insert(node);
        self.invalidate(Invalidation::PRESENCE);
        log::trace!("{:?} added {kind} {id:?}", self.id);
        Ok(id)
    }

    /// Give up ownership of a child, unlinking it
    pub fn remove(&mut self, id: NodeId) -> SceneResult<SceneNode> {
        let mut node = self.children.remove(id).ok_or(SceneError::UnknownChild(id))?;
        node.solid_mut().set_parent(None)?;
        self.invalidate(Invalidation::PRESENCE);
        log::trace!("{:?} removed {id:?}", self.id);
        Ok(node)
    }

    /// A child by id
    pub fn child(&self, id: NodeId) -> Option<&SceneNode> {
        self.children.get(id)
    }

    /// A child by id, for mutation
    pub fn child_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.children.get_mut(id)
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children sorted back to front: larger depth first, then insertion order
    pub fn children_in_draw_order(&self) -> Vec<(NodeId, &SceneNode)> {
        let mut ordered: Vec<_> = self.children.iter().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            let (a, b) = (a.solid(), b.solid());
            b.layout_footprint()
                .depth
                .total_cmp(&a.layout_footprint().depth)
                .then(a.child_id().cmp(&b.child_id()))
        });
        ordered
    }

    /// Smallest box holding every child's bounding cube, `None` without children
    pub fn content_bounds(&self) -> Option<CubeF> {
        self.children
            .values()
            .map(|node| node.solid().bounding_cube())
            .reduce(|a, b| CubeF::union(&a, &b))
    }

    /// Highest invalidation id of the camera and its children
    pub fn latest_invalidation_id(&self) -> u64 {
        self.children
            .values()
            .map(|node| node.solid().invalidation_id())
            .fold(self.invalidation.id(), u64::max)
    }

    /// Record a change to the camera itself
    pub fn invalidate(&mut self, flags: Invalidation) -> bool {
        self.invalidation.invalidate(flags)
    }
}

/// Where a camera draw node is in its frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    /// Never captured; drawing does nothing
    Uninitialized,
    /// Captured and waiting to be drawn
    Applying,
    /// Issuing renderer calls
    Drawing,
    /// Drawn; the snapshot may be drawn again or recaptured
    Idle,
}

/// Snapshot of a camera and its subtree
pub struct CameraDrawNode {
    phase: CameraPhase,
    source: Option<CameraId>,
    invalidation_id: u64,
    background_colour: Colour4,
    draw_colour: DrawColourInfo,
    draw_rectangle: RectF,
    frame_buffer_size: Vec2,
    projection: Option<Mat4>,
    use_frame_buffer: bool,
    frame_buffer: Option<Box<dyn FrameBuffer>>,
    child: CompositeDrawNode,
}

impl fmt::Debug for CameraDrawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraDrawNode")
            .field("phase", &self.phase)
            .field("source", &self.source)
            .field("invalidation_id", &self.invalidation_id)
            .field("draw_rectangle", &self.draw_rectangle)
            .field("projection", &self.projection)
            .field("use_frame_buffer", &self.use_frame_buffer)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

impl Default for CameraDrawNode {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDrawNode {
    /// Create a node that has captured nothing yet
    pub fn new() -> Self {
        Self {
            phase: CameraPhase::Uninitialized,
            source: None,
            invalidation_id: 0,
            background_colour: Colour4::BLACK,
            draw_colour: DrawColourInfo::default(),
            draw_rectangle: RectF::default(),
            frame_buffer_size: Vec2::zeros(),
            projection: None,
            use_frame_buffer: false,
            frame_buffer: None,
            child: CompositeDrawNode::new(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    /// Camera last captured
    pub fn source(&self) -> Option<CameraId> {
        self.source
    }

    /// Latest invalidation id seen by the last capture
    pub fn invalidation_id(&self) -> u64 {
        self.invalidation_id
    }

    /// Captured projection, `None` when the rectangle had no area
    pub fn projection(&self) -> Option<Mat4> {
        self.projection
    }

    /// Captured compositing colour
    pub fn draw_colour_info(&self) -> DrawColourInfo {
        self.draw_colour
    }

    /// Captured subtree
    pub fn child(&self) -> &CompositeDrawNode {
        &self.child
    }

    /// Capture the camera and every child
    pub fn apply_state(&mut self, camera: &Camera) {
        self.phase = CameraPhase::Applying;
        self.source = Some(camera.id());
        self.background_colour = camera.background_colour();
        self.draw_rectangle = camera.draw_rectangle();
        self.frame_buffer_size = self.draw_rectangle.size().map(f32::ceil);
        self.use_frame_buffer = camera.use_frame_buffer();
        self.draw_colour = camera
            .frame_buffer_draw_colour()
            .unwrap_or_else(|| DrawColourInfo::new(Colour4::WHITE, camera.blending()));
        self.projection = Self::projection_for(camera.fov(), self.draw_rectangle);

        self.child.apply_state(camera.id(), camera.children_in_draw_order());
        self.invalidation_id = camera.latest_invalidation_id();
    }

    fn projection_for(fov: f32, rectangle: RectF) -> Option<Mat4> {
        if rectangle.has_zero_area() {
            log::warn!("Camera rectangle {rectangle:?} has no area, skipping its draw");
            return None;
        }

        let projection = Mat4::perspective_field_of_view(fov, rectangle.aspect_ratio(), NEAR_PLANE, FAR_PLANE);
        if !projection.all_finite() {
            log::warn!("Field of view {fov} gives a degenerate projection, skipping its draw");
            return None;
        }
        Some(projection)
    }

    /// Draw the captured sub-scene, returning the number of vertices submitted
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> usize {
        if self.phase == CameraPhase::Uninitialized {
            log::debug!("Camera draw node drawn before its first capture");
            return 0;
        }

        let Some(projection) = self.projection else {
            self.phase = CameraPhase::Idle;
            return 0;
        };

        self.phase = CameraPhase::Drawing;
        let vertices = if self.use_frame_buffer {
            self.draw_isolated(renderer, projection)
        } else {
            self.draw_direct(renderer, projection)
        };
        self.phase = CameraPhase::Idle;

        log::trace!("Camera {:?} drew {vertices} vertices", self.source);
        vertices
    }

    fn draw_direct(&mut self, renderer: &mut dyn Renderer, projection: Mat4) -> usize {
        let mut projected = renderer.scoped_projection_matrix(projection);
        projected.clear(ClearInfo::new(self.background_colour));
        self.child.draw(&mut *projected)
    }

    /// The frame buffer covers every pixel the rectangle touches, so a
    /// sub-pixel rectangle still gets a 1x1 target.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn draw_isolated(&mut self, renderer: &mut dyn Renderer, projection: Mat4) -> usize {
        let rectangle = self.draw_rectangle;
        let size = self.frame_buffer_size;
        let (width, height) = (size.x as i32, size.y as i32);
        let screen_space_aabb = RectI::new(rectangle.x.floor() as i32, rectangle.y.floor() as i32, width, height);

        let frame_buffer = self.frame_buffer.get_or_insert_with(|| renderer.create_frame_buffer());

        let vertices = {
            // Masking is re-applied when the frame buffer is composited
            let mut masked = renderer.scoped_masking_info(
                MaskingInfo {
                    screen_space_aabb,
                    masking_rect: rectangle,
                    to_masking_space: Mat4::identity(),
                    blend_range: 1.0,
                    alpha_exponent: 1.0,
                },
                true,
            );
            let mut viewport = masked.scoped_viewport(RectI::new(0, 0, width, height));
            let mut scissor = viewport.scoped_scissor(RectI::new(0, 0, width, height));
            let mut offset = scissor.scoped_scissor_offset(Vec2::new(
                screen_space_aabb.x as f32,
                screen_space_aabb.y as f32,
            ));

            let _binding = FrameBufferBinding::bind(&mut **frame_buffer, size);
            let mut projected = offset.scoped_projection_matrix(projection);
            projected.clear(ClearInfo::new(self.background_colour));
            self.child.draw(&mut *projected)
        };

        renderer.draw_frame_buffer(&**frame_buffer, rectangle, self.draw_colour);
        vertices
    }
}
