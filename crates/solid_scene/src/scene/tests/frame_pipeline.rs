//! Frame pipeline tests
//!
//! Builds a camera holding a cube and a path, captures it, draws it through the
//! recording renderer and checks what reached the renderer.

use std::sync::Arc;

use crate::config::SceneConfig;
use crate::foundation::math::{Colour4, Quat, RectF, Vec3};
use crate::render::recording::{RecordingRenderer, RenderCommand, StaticResourceLoader};
use crate::render::resources::{Texture, TextureId};
use crate::render::state::PrimitiveTopology;
use crate::scene::camera::{Camera, CameraDrawNode, CameraPhase};
use crate::scene::cube::Cube;
use crate::scene::draw_node::{DrawNodeKind, CUBE_VERTEX_COUNT};
use crate::scene::node::NodeId;
use crate::scene::path::SpacePath;
use approx::assert_relative_eq;

struct CubeScene {
    camera: Camera,
    cube: NodeId,
    path: NodeId,
}

fn cube_scene() -> CubeScene {
    let config = SceneConfig::default();
    let mut camera = Camera::with_config(&config);
    camera.load(Arc::new(StaticResourceLoader::new()));
    camera.set_draw_rectangle(RectF::new(0.0, 0.0, 1000.0, 700.0));

    let mut cube = Cube::new();
    cube.solid_mut().set_size(Vec3::new(0.5, 0.5, 0.5));
    cube.solid_mut().set_colour(Colour4::RED);
    cube.solid_mut().set_position(Vec3::new(50.0, 50.0, 100.0));
    let cube = camera.add(cube).expect("add cube");

    let mut path = SpacePath::with_config(&config);
    path.set_path_radius(12.0);
    path.set_vertices([Vec3::new(500.0, 350.0, 0.0), Vec3::new(540.0, 350.0, 0.0)]);
    let path = camera.add(path).expect("add path");

    CubeScene { camera, cube, path }
}

fn path_vertex_count(segments: usize, joints: usize, radius: f32) -> usize {
    let resolution = (radius.ceil() as usize).clamp(3, crate::scene::draw_node::MAX_RES);
    segments * 12 + joints * resolution * 3
}

#[test]
fn test_frame_draws_cube_then_path_balanced() {
    let scene = cube_scene();
    let mut draw_node = CameraDrawNode::new();
    draw_node.apply_state(&scene.camera);

    // The cube sits further back (z = 100), so it draws first
    let order: Vec<NodeId> = draw_node.child().children().iter().map(|c| c.source()).collect();
    assert_eq!(order, vec![scene.cube, scene.path]);

    let mut renderer = RecordingRenderer::new();
    let drawn = draw_node.draw(&mut renderer);
    assert_eq!(drawn, CUBE_VERTEX_COUNT + path_vertex_count(1, 2, 12.0));
    assert_eq!(renderer.drawn_vertices().len(), drawn);

    let topologies: Vec<PrimitiveTopology> = renderer
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            RenderCommand::DrawVertices { topology, .. } => Some(topology),
            _ => None,
        })
        .collect();
    assert_eq!(topologies, vec![PrimitiveTopology::Quads, PrimitiveTopology::Triangles]);

    assert_eq!(draw_node.phase(), CameraPhase::Idle);
    assert!(renderer.finish_frame().is_ok());
}

#[test]
fn test_spinning_cube_updates_only_on_capture() {
    let mut scene = cube_scene();
    let mut draw_node = CameraDrawNode::new();
    let mut renderer = RecordingRenderer::new();

    for time_step in 0..5_u16 {
        let angle = f32::from(time_step) * 0.001;
        let rotation = Quat::from_euler_angles(0.0, angle, angle);
        let inner = Vec3::new(500.0 + 40.0 * angle.cos(), 350.0 + 40.0 * angle.sin(), 0.0);

        let cube = scene.camera.child_mut(scene.cube).expect("cube present");
        cube.solid_mut().set_rotation(rotation);
        let expected = cube.solid().draw_info();
        scene
            .camera
            .child_mut(scene.path)
            .and_then(|node| node.as_path_mut())
            .expect("path present")
            .set_vertices([Vec3::new(500.0, 350.0, 0.0), inner]);

        draw_node.apply_state(&scene.camera);

        // Mutations after the capture do not leak into the snapshot
        scene
            .camera
            .child_mut(scene.cube)
            .expect("cube present")
            .solid_mut()
            .set_rotation(Quat::identity());

        draw_node.draw(&mut renderer);
        let pushed = renderer.commands().into_iter().find_map(|c| match c {
            RenderCommand::PushLocalMatrix(matrix) => Some(matrix),
            _ => None,
        });
        assert_relative_eq!(pushed.expect("cube matrix pushed"), expected.matrix);

        let path_snapshot = &draw_node.child().children()[1];
        let DrawNodeKind::Path(state) = path_snapshot.kind() else {
            panic!("second child should be the path");
        };
        assert_eq!(state.segments(), &[(Vec3::new(500.0, 350.0, 0.0), inner)]);

        assert!(renderer.finish_frame().is_ok());
        renderer.take_commands();
    }
}

#[test]
fn test_removed_and_disposed_nodes_leave_the_frame() {
    let mut scene = cube_scene();
    let texture = Texture::new(TextureId(77), 32, 32);
    scene
        .camera
        .child_mut(scene.path)
        .and_then(|node| node.as_path_mut())
        .expect("path present")
        .set_texture(Some(texture.clone()));

    let mut draw_node = CameraDrawNode::new();
    draw_node.apply_state(&scene.camera);
    assert_eq!(draw_node.child().children().len(), 2);

    let mut removed = scene.camera.remove(scene.path).expect("remove path");
    removed.dispose().expect("detached path disposes");
    assert!(!texture.available());
    assert!(removed.solid_mut().set_parent(None).is_err());

    draw_node.apply_state(&scene.camera);
    assert_eq!(draw_node.child().children().len(), 1);

    let mut renderer = RecordingRenderer::new();
    assert_eq!(draw_node.draw(&mut renderer), CUBE_VERTEX_COUNT);
    assert!(renderer.finish_frame().is_ok());
}

#[test]
fn test_released_texture_between_capture_and_draw_skips_node() {
    let mut scene = cube_scene();
    let texture = Texture::new(TextureId(78), 8, 8);
    scene
        .camera
        .child_mut(scene.cube)
        .and_then(|node| node.as_cube_mut())
        .expect("cube present")
        .set_texture(Some(texture.clone()));

    let mut draw_node = CameraDrawNode::new();
    draw_node.apply_state(&scene.camera);
    texture.dispose();

    let mut renderer = RecordingRenderer::new();
    assert_eq!(draw_node.draw(&mut renderer), path_vertex_count(1, 2, 12.0));
    assert_eq!(
        renderer.count(|c| matches!(c, RenderCommand::BindTexture(TextureId(78)))),
        0
    );
    assert!(renderer.finish_frame().is_ok());
}
