//! Draw nodes: per-frame snapshots of scene nodes
//!
//! A draw node is paired with one scene node and reused across frames.
//! `apply_state` overwrites its fields from the live node; `draw` reads only
//! those captured fields, so the live node can be mutated for the next frame
//! while the previous snapshot is still being drawn.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::fmt;

use crate::foundation::math::{Colour4, Mat4, RectF, Vec2, Vec3};
use crate::render::api::{Renderer, VertexBatch};
use crate::render::guard::RendererExt;
use crate::render::resources::{Shader, Texture};
use crate::render::state::{BlendingParameters, DepthInfo, DrawColourInfo, PrimitiveTopology};
use crate::render::vertex::TexturedVertex3D;
use crate::scene::camera::CameraId;
use crate::scene::draw_info::SpaceDrawInfo;
use crate::scene::node::{NodeId, SceneNode};

/// Vertices in one cube: six walls of four corners
pub const CUBE_VERTEX_COUNT: usize = 6 * 4;

/// Highest joint resolution of a path
pub const MAX_RES: usize = 24;

const PATH_BATCH_SIZE: usize = MAX_RES * 200 * 3;
const PATH_BATCH_BUFFERS: usize = 10;

/// `(to_wall, down, left)` for each wall of the cube
const CUBE_WALLS: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, -10.0, 0.0], [0.0, 0.0, -10.0], [-10.0, 0.0, 0.0]),
    ([0.0, 10.0, 0.0], [0.0, 0.0, -10.0], [10.0, 0.0, 0.0]),
    ([0.0, 0.0, -10.0], [-10.0, 0.0, 0.0], [0.0, -10.0, 0.0]),
    ([0.0, 0.0, 10.0], [10.0, 0.0, 0.0], [0.0, -10.0, 0.0]),
    ([-10.0, 0.0, 0.0], [0.0, 0.0, -10.0], [0.0, 10.0, 0.0]),
    ([10.0, 0.0, 0.0], [0.0, 0.0, -10.0], [0.0, -10.0, 0.0]),
];

/// Snapshot of one scene node
#[derive(Debug)]
pub struct DrawNode {
    source: NodeId,
    invalidation_id: u64,
    draw_info: SpaceDrawInfo,
    draw_colour: DrawColourInfo,
    kind: DrawNodeKind,
}

/// Kind-specific part of a snapshot
#[derive(Debug)]
pub enum DrawNodeKind {
    /// Nothing to draw beyond the shared state
    Solid,
    /// Textured cube
    Cube(CubeDrawState),
    /// Path ribbon
    Path(PathDrawState),
}

impl DrawNodeKind {
    fn matches(&self, node: &SceneNode) -> bool {
        matches!(
            (self, node),
            (Self::Solid, SceneNode::Solid(_)) | (Self::Cube(_), SceneNode::Cube(_)) | (Self::Path(_), SceneNode::Path(_))
        )
    }

    fn for_node(node: &SceneNode) -> Self {
        match node {
            SceneNode::Solid(_) => Self::Solid,
            SceneNode::Cube(_) => Self::Cube(CubeDrawState::default()),
            SceneNode::Path(_) => Self::Path(PathDrawState::default()),
        }
    }
}

/// Captured cube state
#[derive(Default)]
pub struct CubeDrawState {
    texture: Option<Texture>,
    shader: Option<Shader>,
    batch: Option<Box<dyn VertexBatch>>,
}

impl fmt::Debug for CubeDrawState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeDrawState")
            .field("texture", &self.texture)
            .field("shader", &self.shader)
            .field("has_batch", &self.batch.is_some())
            .finish()
    }
}

/// Captured path state
pub struct PathDrawState {
    texture: Option<Texture>,
    shader: Option<Shader>,
    segments: Vec<(Vec3, Vec3)>,
    radius: f32,
    batch: Option<Box<dyn VertexBatch>>,
}

impl Default for PathDrawState {
    fn default() -> Self {
        Self {
            texture: None,
            shader: None,
            segments: Vec::new(),
            radius: 0.0,
            batch: None,
        }
    }
}

impl PathDrawState {
    /// Captured segments
    pub fn segments(&self) -> &[(Vec3, Vec3)] {
        &self.segments
    }

    /// Captured half-width
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl fmt::Debug for PathDrawState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathDrawState")
            .field("texture", &self.texture)
            .field("shader", &self.shader)
            .field("segments", &self.segments.len())
            .field("radius", &self.radius)
            .field("has_batch", &self.batch.is_some())
            .finish()
    }
}

impl DrawNode {
    /// Create a snapshot of `node`
    pub fn new(source: NodeId, node: &SceneNode) -> Self {
        let mut draw_node = Self {
            source,
            invalidation_id: 0,
            draw_info: SpaceDrawInfo::default(),
            draw_colour: DrawColourInfo::default(),
            kind: DrawNodeKind::for_node(node),
        };
        draw_node.apply_state(node);
        draw_node
    }

    /// Node this snapshot belongs to
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Invalidation id of the node when it was captured
    pub fn invalidation_id(&self) -> u64 {
        self.invalidation_id
    }

    /// Captured transform
    pub fn draw_info(&self) -> &SpaceDrawInfo {
        &self.draw_info
    }

    /// Captured colour and blending
    pub fn draw_colour_info(&self) -> DrawColourInfo {
        self.draw_colour
    }

    /// Kind-specific snapshot
    pub fn kind(&self) -> &DrawNodeKind {
        &self.kind
    }

    /// Overwrite the snapshot from the live node. Leaves the node untouched.
    pub fn apply_state(&mut self, node: &SceneNode) {
        if !self.kind.matches(node) {
            self.kind = DrawNodeKind::for_node(node);
        }

        let solid = node.solid();
        self.invalidation_id = solid.invalidation_id();
        self.draw_info = solid.draw_info();

        match (&mut self.kind, node) {
            (DrawNodeKind::Cube(state), SceneNode::Cube(cube)) => {
                self.draw_colour = cube.draw_colour_info();
                state.texture = cube.texture();
                state.shader = cube.shader();
            }
            (DrawNodeKind::Path(state), SceneNode::Path(path)) => {
                self.draw_colour = path.draw_colour_info();
                state.texture = path.texture();
                state.shader = path.shader();
                state.radius = path.path_radius();
                state.segments.clear();
                state.segments.extend(path.segments());
            }
            _ => self.draw_colour = solid.draw_colour_info(),
        }
    }

    /// Draw the captured state.
    ///
    /// Returns the number of vertices submitted. A missing or released texture
    /// or an unresolved shader skips the node without touching the renderer.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> usize {
        let matrix = self.draw_info.matrix;

        match &mut self.kind {
            DrawNodeKind::Solid => 0,
            DrawNodeKind::Cube(state) => {
                let Some((texture, shader)) = drawable(state.texture.as_ref(), state.shader) else {
                    log::debug!("Skipping cube {:?}: texture or shader unavailable", self.source);
                    return 0;
                };
                let batch = state
                    .batch
                    .get_or_insert_with(|| renderer.create_quad_batch(CUBE_VERTEX_COUNT, CUBE_VERTEX_COUNT));
                let tex_rect = inset_texture_rect(texture);

                draw_textured(renderer, matrix, texture, shader, batch.as_mut(), |batch| {
                    for (to_wall, down, left) in CUBE_WALLS {
                        add_wall(batch, Vec3::from(to_wall), Vec3::from(down), Vec3::from(left), tex_rect);
                    }
                })
            }
            DrawNodeKind::Path(state) => {
                let Some((texture, shader)) = drawable(state.texture.as_ref(), state.shader) else {
                    log::debug!("Skipping path {:?}: texture or shader unavailable", self.source);
                    return 0;
                };
                let batch = state.batch.get_or_insert_with(|| {
                    renderer.create_linear_batch(PATH_BATCH_SIZE, PATH_BATCH_BUFFERS, PrimitiveTopology::Triangles)
                });
                let tex_rect = inset_texture_rect(texture);
                let segments = &state.segments;
                let radius = state.radius;

                draw_textured(renderer, matrix, texture, shader, batch.as_mut(), |batch| {
                    add_path(batch, segments, radius, tex_rect);
                })
            }
        }
    }
}

fn drawable(texture: Option<&Texture>, shader: Option<Shader>) -> Option<(&Texture, Shader)> {
    let texture = texture.filter(|t| t.available())?;
    Some((texture, shader?))
}

#[allow(clippy::cast_precision_loss)]
fn inset_texture_rect(texture: &Texture) -> RectF {
    texture.texture_rect(RectF::new(
        0.5,
        0.5,
        texture.width() as f32 - 1.0,
        texture.height() as f32 - 1.0,
    ))
}

fn draw_textured(
    renderer: &mut dyn Renderer,
    matrix: Mat4,
    texture: &Texture,
    shader: Shader,
    batch: &mut dyn VertexBatch,
    emit: impl FnOnce(&mut dyn VertexBatch),
) -> usize {
    let mut local = renderer.scoped_local_matrix(matrix);
    let mut depth = local.scoped_depth_info(DepthInfo::DEFAULT);
    depth.set_blend(BlendingParameters::NONE);
    let mut bound = depth.scoped_shader(shader);

    if !bound.bind_texture(texture) {
        return 0;
    }

    emit(&mut *batch);
    batch.draw()
}

fn add_wall(batch: &mut dyn VertexBatch, centre: Vec3, down: Vec3, left: Vec3, tex_rect: RectF) {
    let corners = [
        (centre + down + left, Vec2::new(tex_rect.left(), tex_rect.bottom())),
        (centre + down - left, Vec2::new(tex_rect.right(), tex_rect.bottom())),
        (centre - down - left, Vec2::new(tex_rect.right(), tex_rect.top())),
        (centre - down + left, Vec2::new(tex_rect.left(), tex_rect.top())),
    ];
    for (position, texture_position) in corners {
        batch.add(TexturedVertex3D::new(position, Colour4::WHITE, texture_position));
    }
}

/// Side vector perpendicular to the segment and the view axis
fn ribbon_side(direction: Vec3) -> Option<Vec3> {
    let mut side = direction.cross(&Vec3::z());
    if side.norm_squared() <= f32::EPSILON {
        side = direction.cross(&Vec3::y());
    }
    side.try_normalize(f32::EPSILON)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn joint_resolution(radius: f32) -> usize {
    (radius.ceil() as usize).clamp(3, MAX_RES)
}

fn add_path(batch: &mut dyn VertexBatch, segments: &[(Vec3, Vec3)], radius: f32, tex_rect: RectF) {
    let v = tex_rect.top() + tex_rect.height / 2.0;
    let centre_uv = Vec2::new(tex_rect.right(), v);
    let edge_uv = Vec2::new(tex_rect.left(), v);
    let centre = |position| TexturedVertex3D::new(position, Colour4::WHITE, centre_uv);
    let edge = |position| TexturedVertex3D::new(position, Colour4::WHITE, edge_uv);

    for &(start, end) in segments {
        let Some(side) = ribbon_side(end - start) else {
            continue;
        };
        let side = side * radius;

        for offset in [side, -side] {
            batch.add(centre(start));
            batch.add(edge(start + offset));
            batch.add(edge(end + offset));

            batch.add(centre(start));
            batch.add(edge(end + offset));
            batch.add(centre(end));
        }
    }

    let joints = segments
        .first()
        .map(|(start, _)| *start)
        .into_iter()
        .chain(segments.iter().map(|(_, end)| *end));

    let resolution = joint_resolution(radius);
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / resolution as f32;

    for joint in joints {
        for i in 0..resolution {
            #[allow(clippy::cast_precision_loss)]
            let (a, b) = (step * i as f32, step * (i + 1) as f32);
            batch.add(centre(joint));
            batch.add(edge(joint + Vec3::new(a.cos(), a.sin(), 0.0) * radius));
            batch.add(edge(joint + Vec3::new(b.cos(), b.sin(), 0.0) * radius));
        }
    }
}

/// Ordered snapshots of a camera's children
#[derive(Debug, Default)]
pub struct CompositeDrawNode {
    children: Vec<DrawNode>,
}

impl CompositeDrawNode {
    /// Create an empty composite
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every child of `owner` in the given order, reusing the draw node
    /// of any child captured before. Disposed nodes and nodes not linked to
    /// `owner` are left out of the frame.
    pub fn apply_state<'a>(
        &mut self,
        owner: CameraId,
        children: impl IntoIterator<Item = (NodeId, &'a SceneNode)>,
    ) {
        let mut previous: HashMap<NodeId, DrawNode> = self.children.drain(..).map(|c| (c.source, c)).collect();

        for (id, node) in children {
            let solid = node.solid();
            if solid.is_disposed() || solid.parent() != Some(owner) {
                log::warn!("Skipping {id:?}: not linked to {owner:?}");
                continue;
            }

            let draw_node = match previous.remove(&id) {
                Some(mut existing) => {
                    existing.apply_state(node);
                    existing
                }
                None => DrawNode::new(id, node),
            };
            self.children.push(draw_node);
        }

        if !previous.is_empty() {
            log::trace!("Dropped {} stale draw nodes", previous.len());
        }
    }

    /// Draw every child in order, returning the total vertex count
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> usize {
        self.children.iter_mut().map(|child| child.draw(renderer)).sum()
    }

    /// Captured children in draw order
    pub fn children(&self) -> &[DrawNode] {
        &self.children
    }

    /// Highest captured invalidation id
    pub fn latest_invalidation_id(&self) -> u64 {
        self.children.iter().map(DrawNode::invalidation_id).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::foundation::time::FrameClock;
    use crate::render::recording::{RecordingRenderer, RenderCommand, StaticResourceLoader};
    use crate::render::resources::TextureId;
    use crate::scene::cube::Cube;
    use crate::scene::path::SpacePath;
    use crate::scene::solid::{ParentLink, Solid};
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    const OWNER: CameraId = CameraId(1);

    fn node_id() -> NodeId {
        let mut keys: SlotMap<NodeId, ()> = SlotMap::with_key();
        keys.insert(())
    }

    fn loaded_cube() -> SceneNode {
        let mut cube = Cube::new();
        cube.load(&StaticResourceLoader::new());
        SceneNode::Cube(cube)
    }

    fn linked(mut node: SceneNode, camera: CameraId) -> SceneNode {
        node.solid_mut()
            .set_parent(Some(ParentLink::new(camera, FrameClock::new())))
            .expect("link");
        node
    }

    #[test]
    fn test_cube_emits_six_walls_in_fixed_winding() {
        let node = loaded_cube();
        let mut draw_node = DrawNode::new(node_id(), &node);
        let mut renderer = RecordingRenderer::new();

        assert_eq!(draw_node.draw(&mut renderer), CUBE_VERTEX_COUNT);
        let vertices = renderer.drawn_vertices();
        assert_eq!(vertices.len(), 24);

        // White pixel: inset rect of a 1x1 texture
        let tex_rect = RectF::new(0.5, 0.5, 0.0, 0.0);
        for (wall, (to_wall, down, left)) in CUBE_WALLS.into_iter().enumerate() {
            let (centre, down, left) = (Vec3::from(to_wall), Vec3::from(down), Vec3::from(left));
            let quad = &vertices[wall * 4..wall * 4 + 4];

            assert_eq!(quad[0].position(), centre + down + left);
            assert_eq!(quad[1].position(), centre + down - left);
            assert_eq!(quad[2].position(), centre - down - left);
            assert_eq!(quad[3].position(), centre - down + left);

            assert_eq!(quad[0].texture_position(), Vec2::new(tex_rect.left(), tex_rect.bottom()));
            assert_eq!(quad[1].texture_position(), Vec2::new(tex_rect.right(), tex_rect.bottom()));
            assert_eq!(quad[2].texture_position(), Vec2::new(tex_rect.right(), tex_rect.top()));
            assert_eq!(quad[3].texture_position(), Vec2::new(tex_rect.left(), tex_rect.top()));
            assert!(quad.iter().all(|v| v.colour == Colour4::WHITE));
        }
    }

    #[test]
    fn test_cube_draw_pushes_and_pops_in_order() {
        let node = loaded_cube();
        let mut draw_node = DrawNode::new(node_id(), &node);
        let mut renderer = RecordingRenderer::new();
        draw_node.draw(&mut renderer);
        draw_node.draw(&mut renderer);

        let commands = renderer.commands();
        assert!(matches!(commands[0], RenderCommand::CreateBatch { topology: PrimitiveTopology::Quads, size: 24, .. }));
        assert!(matches!(commands[1], RenderCommand::PushLocalMatrix(_)));
        assert!(matches!(commands[2], RenderCommand::PushDepthInfo(DepthInfo::DEFAULT)));
        assert!(matches!(commands[3], RenderCommand::SetBlend(BlendingParameters::NONE)));
        assert!(matches!(commands[4], RenderCommand::BindShader(_)));
        assert!(matches!(commands[5], RenderCommand::BindTexture(TextureId(0))));
        assert!(matches!(commands[6], RenderCommand::DrawVertices { .. }));
        assert!(matches!(commands[7], RenderCommand::UnbindShader(_)));
        assert!(matches!(commands[8], RenderCommand::PopDepthInfo));
        assert!(matches!(commands[9], RenderCommand::PopLocalMatrix));

        // The batch is created once and reused
        assert_eq!(renderer.count(|c| matches!(c, RenderCommand::CreateBatch { .. })), 1);
        assert!(renderer.finish_frame().is_ok());
    }

    #[test]
    fn test_missing_texture_or_shader_touches_nothing() {
        let mut renderer = RecordingRenderer::new();

        let unloaded = SceneNode::Cube(Cube::new());
        assert_eq!(DrawNode::new(node_id(), &unloaded).draw(&mut renderer), 0);

        let mut shaderless = Cube::new();
        shaderless.load(&StaticResourceLoader::without_shaders());
        assert_eq!(DrawNode::new(node_id(), &SceneNode::Cube(shaderless)).draw(&mut renderer), 0);

        let released = Texture::new(TextureId(11), 4, 4);
        let mut path = SpacePath::new();
        path.load(&StaticResourceLoader::new());
        path.set_texture(Some(released.clone()));
        let mut draw_node = DrawNode::new(node_id(), &SceneNode::Path(path));
        released.dispose();
        assert_eq!(draw_node.draw(&mut renderer), 0);

        assert!(renderer.commands().is_empty());
        assert!(renderer.finish_frame().is_ok());
    }

    #[test]
    fn test_snapshot_ignores_later_mutation() {
        let mut node = loaded_cube();
        node.solid_mut().set_position(Vec3::new(1.0, 2.0, 3.0));
        let mut draw_node = DrawNode::new(node_id(), &node);
        let captured = node.solid().draw_info();
        let captured_id = draw_node.invalidation_id();

        node.solid_mut().set_position(Vec3::new(9.0, 9.0, 9.0));
        node.solid_mut().set_rotation(Quat::from_axis_angle(&Vec3::x_axis(), 1.0));

        assert_eq!(*draw_node.draw_info(), captured);
        assert_eq!(draw_node.invalidation_id(), captured_id);

        let mut renderer = RecordingRenderer::new();
        draw_node.draw(&mut renderer);
        assert_eq!(renderer.commands()[1], RenderCommand::PushLocalMatrix(captured.matrix));

        draw_node.apply_state(&node);
        assert_relative_eq!(draw_node.draw_info().matrix, node.solid().draw_info().matrix);
        assert!(draw_node.invalidation_id() > captured_id);
    }

    #[test]
    fn test_solid_snapshot_keeps_node_colour() {
        let mut solid = Solid::new();
        solid.set_colour(Colour4::RED);
        let node = SceneNode::Solid(solid);
        let mut draw_node = DrawNode::new(node_id(), &node);

        assert_eq!(draw_node.draw_colour_info().colour, Colour4::RED);
        let mut renderer = RecordingRenderer::new();
        assert_eq!(draw_node.draw(&mut renderer), 0);
        assert!(renderer.commands().is_empty());
    }

    #[test]
    fn test_path_tessellation_vertex_count() {
        let mut path = SpacePath::new();
        path.load(&StaticResourceLoader::new());
        path.set_vertices([Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]);
        let node = SceneNode::Path(path);

        let mut draw_node = DrawNode::new(node_id(), &node);
        let DrawNodeKind::Path(state) = draw_node.kind() else {
            panic!("expected a path snapshot");
        };
        assert_eq!(state.segments().len(), 2);
        assert_eq!(state.radius(), 10.0);

        let mut renderer = RecordingRenderer::new();
        // Two segments of four triangles plus three joints of ten triangles
        let expected = 2 * 12 + 3 * joint_resolution(10.0) * 3;
        assert_eq!(draw_node.draw(&mut renderer), expected);

        let vertices = renderer.drawn_vertices();
        assert!(vertices.iter().all(|v| v.position().y.abs() <= 10.0 + 1e-4));
        assert!(renderer.finish_frame().is_ok());
    }

    #[test]
    fn test_cube_texture_corners_follow_texture_rect() {
        let mut cube = Cube::new();
        cube.load(&StaticResourceLoader::new());
        cube.set_texture(Some(Texture::new(TextureId(5), 9, 5)));
        let mut draw_node = DrawNode::new(node_id(), &SceneNode::Cube(cube));
        let mut renderer = RecordingRenderer::new();
        draw_node.draw(&mut renderer);

        // Inset rect (0.5, 0.5, 8, 4) over a 9x5 texture
        let (left, right) = (0.5 / 9.0, 8.5 / 9.0);
        let (top, bottom) = (0.5 / 5.0, 4.5 / 5.0);
        let vertices = renderer.drawn_vertices();
        for quad in vertices.chunks(4) {
            assert_relative_eq!(quad[0].texture_position(), Vec2::new(left, bottom), epsilon = 1e-6);
            assert_relative_eq!(quad[1].texture_position(), Vec2::new(right, bottom), epsilon = 1e-6);
            assert_relative_eq!(quad[2].texture_position(), Vec2::new(right, top), epsilon = 1e-6);
            assert_relative_eq!(quad[3].texture_position(), Vec2::new(left, top), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_long_path_counts_vertices_flushed_by_full_batches() {
        let mut path = SpacePath::new();
        path.load(&StaticResourceLoader::new());
        path.set_vertices((0..601_u16).map(|i| Vec3::new(f32::from(i), 0.0, 0.0)));
        let mut draw_node = DrawNode::new(node_id(), &SceneNode::Path(path));

        let expected = 600 * 12 + 601 * joint_resolution(10.0) * 3;
        assert!(expected > PATH_BATCH_SIZE);

        let mut renderer = RecordingRenderer::new();
        assert_eq!(draw_node.draw(&mut renderer), expected);
        assert_eq!(renderer.drawn_vertices().len(), expected);
        assert!(renderer.count(|c| matches!(c, RenderCommand::DrawVertices { .. })) > 1);

        // Nothing carries over into the next frame
        renderer.take_commands();
        assert_eq!(draw_node.draw(&mut renderer), expected);
        assert!(renderer.finish_frame().is_ok());
    }

    #[test]
    fn test_ribbon_side_handles_view_axis_segments() {
        let side = ribbon_side(Vec3::new(0.0, 0.0, 5.0)).expect("segment along z");
        assert_relative_eq!(side.dot(&Vec3::z()), 0.0);
        assert_relative_eq!(side.norm(), 1.0, epsilon = 1e-6);

        assert!(ribbon_side(Vec3::zeros()).is_none());
        assert_eq!(joint_resolution(0.5), 3);
        assert_eq!(joint_resolution(100.0), MAX_RES);
    }

    #[test]
    fn test_composite_reuses_draw_nodes_by_id() {
        let mut nodes: SlotMap<NodeId, SceneNode> = SlotMap::with_key();
        let first = nodes.insert(linked(loaded_cube(), OWNER));
        let second = nodes.insert(linked(SceneNode::Solid(Solid::new()), OWNER));

        let mut composite = CompositeDrawNode::new();
        composite.apply_state(OWNER, [(first, &nodes[first]), (second, &nodes[second])]);

        let mut renderer = RecordingRenderer::new();
        assert_eq!(composite.draw(&mut renderer), CUBE_VERTEX_COUNT);

        composite.apply_state(OWNER, [(second, &nodes[second]), (first, &nodes[first])]);
        assert_eq!(composite.children()[0].source(), second);
        assert_eq!(composite.draw(&mut renderer), CUBE_VERTEX_COUNT);
        assert_eq!(renderer.count(|c| matches!(c, RenderCommand::CreateBatch { .. })), 1);

        composite.apply_state(OWNER, [(second, &nodes[second])]);
        assert_eq!(composite.children().len(), 1);
        assert_eq!(composite.latest_invalidation_id(), nodes[second].solid().invalidation_id());
    }

    #[test]
    fn test_composite_leaves_out_disposed_and_foreign_nodes() {
        let mut nodes: SlotMap<NodeId, SceneNode> = SlotMap::with_key();
        let owned = nodes.insert(linked(loaded_cube(), OWNER));
        let foreign = nodes.insert(linked(loaded_cube(), CameraId(2)));
        let detached = nodes.insert(loaded_cube());
        let mut disposed = loaded_cube();
        disposed.dispose().expect("detached node disposes");
        let disposed = nodes.insert(disposed);

        let mut composite = CompositeDrawNode::new();
        composite.apply_state(OWNER, nodes.iter());

        let captured: Vec<NodeId> = composite.children().iter().map(DrawNode::source).collect();
        assert_eq!(captured, vec![owned]);
        assert!(![foreign, detached, disposed].iter().any(|id| captured.contains(id)));

        let mut renderer = RecordingRenderer::new();
        assert_eq!(composite.draw(&mut renderer), CUBE_VERTEX_COUNT);
    }
}
