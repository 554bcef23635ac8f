//! Spinning cube demo
//!
//! Builds a camera holding a red cube and a short path, spins the cube and
//! sweeps the path from an update thread, and renders frames headlessly through
//! the recording renderer, logging what each frame submitted.
//!
//! Usage: `cube_demo [scene.toml|scene.ron] [frames]`

use std::sync::Arc;
use std::thread;

use solid_scene::foundation::logging::{self, LevelFilter};
use solid_scene::prelude::*;
use thiserror::Error;

const DEFAULT_FRAMES: u32 = 120;
const CENTRE: (f32, f32) = (500.0, 350.0);

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Update thread panicked")]
    UpdatePanicked,
}

struct DemoScene {
    host: SceneHost,
    cube: NodeId,
    path: NodeId,
}

fn build_scene(config: &SceneConfig) -> Result<DemoScene, DemoError> {
    let mut camera = Camera::with_config(config);
    camera.load(Arc::new(StaticResourceLoader::new()));
    camera.set_draw_rectangle(RectF::new(0.0, 0.0, 1000.0, 700.0));

    let mut cube = Cube::new();
    cube.solid_mut().set_size(Vec3::new(0.5, 0.5, 0.5));
    cube.solid_mut().set_colour(Colour4::RED);
    cube.solid_mut().set_position(Vec3::new(50.0, 50.0, 100.0));
    let cube = camera.add(cube)?;

    let mut path = SpacePath::with_config(config);
    path.set_path_radius(12.0);
    let path = camera.add(path)?;

    log::info!(
        "Scene ready: camera {:?} with {} children, bounds {:?}",
        camera.id(),
        camera.len(),
        camera.content_bounds()
    );
    Ok(DemoScene {
        host: SceneHost::new(camera),
        cube,
        path,
    })
}

fn spin(updater: &SceneUpdater, cube: NodeId, path: NodeId, time_step: u32) -> SceneResult<()> {
    #[allow(clippy::cast_precision_loss)]
    let angle = (time_step % 3000) as f32 * 0.001;

    updater.update(|camera| {
        camera.clock().advance(1.0 / 60.0);

        if let Some(node) = camera.child_mut(cube) {
            node.solid_mut().set_rotation(Quat::from_euler_angles(0.0, angle, angle));
        }

        let inner = Vec3::new(CENTRE.0 + 40.0 * angle.cos(), CENTRE.1 + 40.0 * angle.sin(), 0.0);
        if let Some(path) = camera.child_mut(path).and_then(SceneNode::as_path_mut) {
            path.set_vertices([Vec3::new(CENTRE.0, CENTRE.1, 0.0), inner]);
        }
    })
}

fn run() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading scene configuration from {path}");
            SceneConfig::load_from_file(&path)?
        }
        None => SceneConfig::default(),
    };
    let frames = args.next().and_then(|f| f.parse().ok()).unwrap_or(DEFAULT_FRAMES);

    let scene = build_scene(&config)?;
    let updater = scene.host.updater();
    let (cube, path) = (scene.cube, scene.path);

    let update_role = thread::spawn(move || -> SceneResult<()> {
        for time_step in 0..frames {
            spin(&updater, cube, path, time_step)?;
            thread::yield_now();
        }
        Ok(())
    });

    let mut draw_node = CameraDrawNode::new();
    let mut renderer = RecordingRenderer::new();
    let render_clock = FrameClock::new();
    let mut total_vertices = 0;

    for frame in 0..frames {
        if !scene.host.needs_redraw(&draw_node)? {
            log::debug!("Frame {frame}: nothing changed");
            continue;
        }

        let vertices = scene.host.render_frame(&mut draw_node, &mut renderer)?;
        renderer.finish_frame()?;
        let commands = renderer.take_commands();
        render_clock.process_frame();
        total_vertices += vertices;

        log::debug!(
            "Frame {frame} (generation {}): {vertices} vertices, {} renderer calls, {:.0} fps",
            scene.host.generation(),
            commands.len(),
            render_clock.current_fps()
        );
    }

    update_role.join().map_err(|_| DemoError::UpdatePanicked)??;

    log::info!(
        "Rendered {} frames, {total_vertices} vertices in total, over {:.3}s",
        scene.host.generation(),
        render_clock.current_time()
    );
    Ok(())
}

fn main() {
    logging::init_with_level(LevelFilter::Info);
    log::info!("Starting cube demo");

    if let Err(e) = run() {
        log::error!("Cube demo failed: {e}");
        std::process::exit(1);
    }

    log::info!("Cube demo finished successfully");
}
