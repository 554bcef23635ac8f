//! Spatial scene node
//!
//! A [`Solid`] owns a 3D position, size, pivot, rotation and scale. Its local
//! matrix is never cached: [`Solid::draw_info`] composes it from the current
//! state on every call, and captured draw nodes hold the only copies.

use crate::foundation::math::{Colour4, CubeF, Quat, Vec2, Vec3};
use crate::foundation::time::FrameClock;
use crate::render::state::{BlendingParameters, DrawColourInfo};
use crate::scene::camera::CameraId;
use crate::scene::draw_info::SpaceDrawInfo;
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::invalidation::{Invalidation, InvalidationState};

/// Non-owning back-reference from a node to the camera holding it
#[derive(Debug, Clone)]
pub struct ParentLink {
    /// Owning camera
    pub camera: CameraId,
    /// The camera's time base
    pub clock: FrameClock,
}

impl ParentLink {
    /// Link to a camera and its clock
    pub fn new(camera: CameraId, clock: FrameClock) -> Self {
        Self { camera, clock }
    }
}

/// 2D placement read by an enclosing layout system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutFootprint {
    /// X/Y of the 3D position
    pub position: Vec2,
    /// X/Y of the 3D size
    pub size: Vec2,
    /// Z of the 3D position; larger values draw first
    pub depth: f32,
}

/// A positioned, transformable scene node
#[derive(Debug, Clone)]
pub struct Solid {
    position: Vec3,
    size: Vec3,
    origin_position: Vec3,
    rotation: Quat,
    scale: Vec3,
    colour: Colour4,
    blending: BlendingParameters,

    parent: Option<ParentLink>,
    clock: FrameClock,
    child_id: u64,
    disposed: bool,
    invalidation: InvalidationState,
}

impl Default for Solid {
    fn default() -> Self {
        Self::new()
    }
}

impl Solid {
    /// Create a detached node at the origin with unit scale
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            size: Vec3::zeros(),
            origin_position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            colour: Colour4::WHITE,
            blending: BlendingParameters::INHERIT,
            parent: None,
            clock: FrameClock::new(),
            child_id: 0,
            disposed: false,
            invalidation: InvalidationState::default(),
        }
    }

    /// Position in the parent's space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the position
    pub fn set_position(&mut self, position: Vec3) {
        if self.position == position {
            return;
        }
        self.position = position;
        self.invalidate(Invalidation::DRAW_INFO);
    }

    /// Extent of the node
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Set the size
    pub fn set_size(&mut self, size: Vec3) {
        if self.size == size {
            return;
        }
        self.size = size;
        self.invalidate(Invalidation::DRAW_SIZE);
    }

    /// Pivot for rotation and scale, in local space
    pub fn origin_position(&self) -> Vec3 {
        self.origin_position
    }

    /// Set the pivot
    pub fn set_origin_position(&mut self, origin_position: Vec3) {
        if self.origin_position == origin_position {
            return;
        }
        self.origin_position = origin_position;
        self.invalidate(Invalidation::DRAW_INFO | Invalidation::MISC_GEOMETRY);
    }

    /// Rotation about the pivot
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Set the rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.rotation == rotation {
            return;
        }
        self.rotation = rotation;
        self.invalidate(Invalidation::DRAW_INFO | Invalidation::MISC_GEOMETRY);
    }

    /// Per-axis scale about the pivot
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the scale. Near-zero components are accepted and clamped when the
    /// matrix is composed.
    pub fn set_scale(&mut self, scale: Vec3) {
        if self.scale == scale {
            return;
        }
        self.scale = scale;
        self.invalidate(Invalidation::DRAW_INFO | Invalidation::MISC_GEOMETRY);
    }

    /// Tint
    pub fn colour(&self) -> Colour4 {
        self.colour
    }

    /// Set the tint
    pub fn set_colour(&mut self, colour: Colour4) {
        if self.colour == colour {
            return;
        }
        self.colour = colour;
        self.invalidate(Invalidation::COLOUR);
    }

    /// Blend state
    pub fn blending(&self) -> BlendingParameters {
        self.blending
    }

    /// Set the blend state
    pub fn set_blending(&mut self, blending: BlendingParameters) {
        if self.blending == blending {
            return;
        }
        self.blending = blending;
        self.invalidate(Invalidation::COLOUR);
    }

    /// Colour and blending the node asks to be drawn with
    pub fn draw_colour_info(&self) -> DrawColourInfo {
        DrawColourInfo::new(self.colour, self.blending)
    }

    /// Local matrix and inverse for the current state
    pub fn draw_info(&self) -> SpaceDrawInfo {
        SpaceDrawInfo::compose(self.position, self.scale, self.rotation, self.origin_position)
    }

    /// 2D placement derived from the 3D state
    pub fn layout_footprint(&self) -> LayoutFootprint {
        LayoutFootprint {
            position: self.position.xy(),
            size: self.size.xy(),
            depth: self.position.z,
        }
    }

    /// Axis-aligned box the node occupies in its parent's space, ignoring
    /// rotation. Negative scale flips the box but keeps its extents positive.
    pub fn bounding_cube(&self) -> CubeF {
        let location = self.position - self.origin_position.component_mul(&self.scale);
        CubeF::from_location_size(location, self.size.component_mul(&self.scale)).with_positive_extent()
    }

    /// Camera this node is attached to
    pub fn parent(&self) -> Option<CameraId> {
        self.parent.as_ref().map(|link| link.camera)
    }

    /// Attach to or detach from a camera. Only the owning camera drives this,
    /// through [`Camera::add`](crate::scene::Camera::add) and
    /// [`Camera::remove`](crate::scene::Camera::remove).
    ///
    /// Fails without changing anything if the node is disposed or already
    /// attached to a different camera.
    pub(crate) fn set_parent(&mut self, parent: Option<ParentLink>) -> SceneResult<()> {
        if self.disposed {
            return Err(SceneError::Disposed);
        }

        if parent.is_none() {
            self.child_id = 0;
        }

        match (&self.parent, &parent) {
            (None, None) => return Ok(()),
            (Some(existing), Some(requested)) if existing.camera == requested.camera => return Ok(()),
            (Some(existing), Some(requested)) => {
                return Err(SceneError::MultipleParents {
                    existing: existing.camera,
                    requested: requested.camera,
                });
            }
            _ => {}
        }

        self.parent = parent;
        self.invalidate(
            Invalidation::FROM_PARENT_SIZE | Invalidation::COLOUR | Invalidation::PRESENCE | Invalidation::PARENT,
        );

        if let Some(link) = &self.parent {
            self.clock = link.clock.clone();
            log::trace!("Node attached to {:?}", link.camera);
        }

        Ok(())
    }

    /// Time base; the parent's once attached
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Position among the parent's children, used to break depth ties
    pub fn child_id(&self) -> u64 {
        self.child_id
    }

    pub(crate) fn set_child_id(&mut self, child_id: u64) {
        self.child_id = child_id;
    }

    /// Whether [`Solid::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Mark the node unusable. It must be detached first.
    pub fn dispose(&mut self) -> SceneResult<()> {
        if let Some(link) = &self.parent {
            return Err(SceneError::DisposeWhileAttached(link.camera));
        }
        if !self.disposed {
            self.disposed = true;
            log::trace!("Node disposed");
        }
        Ok(())
    }

    /// Record a change; returns false for an empty set
    pub fn invalidate(&mut self, flags: Invalidation) -> bool {
        let invalidated = self.invalidation.invalidate(flags);
        if invalidated {
            log::trace!("Invalidated {flags:?} -> id {}", self.invalidation.id());
        }
        invalidated
    }

    /// Id stamped by the latest mutation
    pub fn invalidation_id(&self) -> u64 {
        self.invalidation.id()
    }

    /// Clear and return the accumulated invalidation flags
    pub fn take_invalidation(&mut self) -> Invalidation {
        self.invalidation.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn link(camera: u64) -> ParentLink {
        ParentLink::new(CameraId(camera), FrameClock::new())
    }

    #[test]
    fn test_default_state() {
        let solid = Solid::new();
        assert_eq!(solid.scale(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(solid.rotation(), Quat::identity());
        assert_eq!(solid.parent(), None);
        assert_eq!(solid.draw_info(), SpaceDrawInfo::default());
        assert_eq!(solid.draw_colour_info(), DrawColourInfo::default());
    }

    #[test]
    fn test_equal_assignment_does_not_invalidate() {
        let mut solid = Solid::new();
        solid.set_position(Vec3::new(1.0, 2.0, 3.0));
        solid.take_invalidation();
        let id = solid.invalidation_id();

        solid.set_position(Vec3::new(1.0, 2.0, 3.0));
        solid.set_scale(Vec3::new(1.0, 1.0, 1.0));
        solid.set_rotation(Quat::identity());

        assert_eq!(solid.invalidation_id(), id);
        assert!(solid.take_invalidation().is_empty());
    }

    #[test]
    fn test_setters_invalidate_matching_flags() {
        let mut solid = Solid::new();
        solid.take_invalidation();

        solid.set_size(Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(solid.take_invalidation(), Invalidation::DRAW_SIZE);

        solid.set_colour(Colour4::RED);
        assert_eq!(solid.take_invalidation(), Invalidation::COLOUR);

        solid.set_scale(Vec3::new(2.0, 2.0, 2.0));
        assert!(solid.take_invalidation().contains(Invalidation::DRAW_INFO));
    }

    #[test]
    fn test_draw_info_follows_latest_state() {
        let mut solid = Solid::new();
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);

        solid.set_position(Vec3::new(3.0, 0.0, 0.0));
        solid.set_scale(Vec3::new(5.0, 5.0, 5.0));
        solid.set_position(Vec3::new(1.0, 2.0, 3.0));
        solid.set_rotation(rotation);
        solid.set_origin_position(Vec3::new(0.5, 0.0, 0.0));
        solid.set_scale(Vec3::new(2.0, 1.0, 0.5));

        let expected = SpaceDrawInfo::compose(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(2.0, 1.0, 0.5),
            rotation,
            Vec3::new(0.5, 0.0, 0.0),
        );
        assert_relative_eq!(solid.draw_info().matrix, expected.matrix);
        assert_relative_eq!(solid.draw_info().matrix_inverse, expected.matrix_inverse);
    }

    #[test]
    fn test_layout_footprint_mirrors_xy_and_depth() {
        let mut solid = Solid::new();
        solid.set_position(Vec3::new(10.0, 20.0, -5.0));
        solid.set_size(Vec3::new(30.0, 40.0, 50.0));

        let footprint = solid.layout_footprint();
        assert_eq!(footprint.position, Vec2::new(10.0, 20.0));
        assert_eq!(footprint.size, Vec2::new(30.0, 40.0));
        assert_eq!(footprint.depth, -5.0);
    }

    #[test]
    fn test_bounding_cube_follows_pivot_and_scale() {
        let mut solid = Solid::new();
        solid.set_size(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(solid.bounding_cube(), CubeF::new(0.0, 0.0, 0.0, 10.0, 20.0, 30.0));

        solid.set_position(Vec3::new(100.0, 50.0, 0.0));
        solid.set_origin_position(Vec3::new(5.0, 10.0, 15.0));
        solid.set_scale(Vec3::new(2.0, 1.0, -1.0));

        let bounds = solid.bounding_cube();
        assert_eq!(bounds, CubeF::new(90.0, 40.0, -15.0, 20.0, 20.0, 30.0));
        assert!(bounds.contains_point(solid.position()));
    }

    #[test]
    fn test_second_parent_is_rejected() {
        let mut solid = Solid::new();
        solid.set_parent(Some(link(1))).expect("first parent");

        let result = solid.set_parent(Some(link(2)));
        assert_eq!(
            result,
            Err(SceneError::MultipleParents {
                existing: CameraId(1),
                requested: CameraId(2)
            })
        );
        assert_eq!(solid.parent(), Some(CameraId(1)));

        // Re-assigning the same camera is a no-op
        assert!(solid.set_parent(Some(link(1))).is_ok());
    }

    #[test]
    fn test_disposed_node_rejects_parent() {
        let mut solid = Solid::new();
        solid.dispose().expect("detached node disposes");

        assert_eq!(solid.set_parent(Some(link(1))), Err(SceneError::Disposed));
        assert_eq!(solid.set_parent(None), Err(SceneError::Disposed));
        assert_eq!(solid.parent(), None);
    }

    #[test]
    fn test_dispose_while_attached_is_rejected() {
        let mut solid = Solid::new();
        solid.set_parent(Some(link(7))).expect("attach");

        assert_eq!(solid.dispose(), Err(SceneError::DisposeWhileAttached(CameraId(7))));
        assert!(!solid.is_disposed());

        solid.set_parent(None).expect("detach");
        assert!(solid.dispose().is_ok());
        assert!(solid.is_disposed());
    }

    #[test]
    fn test_attach_adopts_parent_clock_and_detach_resets_child_id() {
        let parent = link(3);
        let mut solid = Solid::new();
        solid.set_parent(Some(parent.clone())).expect("attach");
        solid.set_child_id(12);

        assert!(solid.clock().ptr_eq(&parent.clock));
        assert!(solid.take_invalidation().contains(Invalidation::PARENT | Invalidation::PRESENCE));

        solid.set_parent(None).expect("detach");
        assert_eq!(solid.child_id(), 0);
        assert_eq!(solid.parent(), None);
    }
}
