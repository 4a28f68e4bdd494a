// ABOUTME: CLI entry point - loads maps, opens the macroquad window, drives the simulation loop
// ABOUTME: Everything past input-polling/mesh-drawing here is outer-loop glue, not core behavior

mod engine;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;

use engine::core::{BoxConfig, Terrain};
use engine::input::{Action, FrameInput};
use engine::mapfile;
use engine::mesh::{MeshVertex, MeshView, TerrainMesh, TerrainVertex};
use engine::{App, Settings};

#[derive(Parser)]
#[command(name = "hydroterrain")]
#[command(about = "Interactive terrain synthesis and shallow-water simulation")]
struct Args {
    /// One or more `.mod1` map files to load, cycled with the next/previous-map keys.
    maps: Vec<PathBuf>,

    /// Print usage and exit.
    #[arg(short = 'u', long = "usage")]
    usage: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.usage {
        print_usage();
        return ExitCode::FAILURE;
    }
    if args.maps.is_empty() {
        eprintln!("[hydroterrain] at least one .mod1 map file is required");
        print_usage();
        return ExitCode::FAILURE;
    }

    let settings = Settings::load(Path::new("configs/settings.json"));
    let (w, h, d) = settings.box_dims();
    let cfg = BoxConfig::new(w, h, d, BoxConfig::default().ground_depth);

    // Grounded on the original's `argParse` (original_source/src/mod1.cpp):
    // the first argument lacking the `.mod1` suffix aborts the whole
    // program via `usage()` rather than being skipped — it never keeps
    // scanning the remaining arguments.
    for path in &args.maps {
        let path_str = path.to_string_lossy().into_owned();
        if !mapfile::has_map_suffix(&path_str) {
            eprintln!("[hydroterrain] invalid argument: {path_str}");
            print_usage();
            return ExitCode::FAILURE;
        }
    }

    let mut terrains = Vec::new();
    for path in &args.maps {
        match mapfile::load_points(path, &cfg) {
            Ok(points) => terrains.push(Terrain::build(&points, &cfg)),
            Err(e) => eprintln!("[hydroterrain] {}: {e}, skipping", path.display()),
        }
    }

    if terrains.is_empty() {
        eprintln!("[hydroterrain] no map loaded successfully");
        return ExitCode::FAILURE;
    }

    let app = App::new(cfg, terrains);

    let window_conf = Conf {
        window_title: "hydroterrain".to_owned(),
        window_width: settings.graphics.width as i32,
        window_height: settings.graphics.height as i32,
        fullscreen: settings.graphics.fullscreen,
        window_resizable: true,
        ..Default::default()
    };
    macroquad::Window::from_config(window_conf, run(app, settings));

    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!("usage: hydroterrain <map1.mod1> [map2.mod1 ...]");
    eprintln!("  -u, --usage   print this message and exit");
    eprintln!();
    eprintln!("keys: space = pause, tab = cycle scenario, [ / ] = previous/next map, 1 = wireframe");
}

/// Orbit-camera state the outer loop owns; the core never sees it.
struct Orbit {
    distance: f32,
    yaw: f32,
    pitch: f32,
    fovy: f32,
}

impl Orbit {
    fn eye(&self, target: Vec3) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        target + vec3(x, y, z)
    }
}

async fn run(mut app: App, settings: Settings) {
    let (bw, bd) = {
        let cfg = app.box_config();
        (cfg.width, cfg.depth)
    };
    let target = vec3(bw as f32 / 2.0, 0.0, bd as f32 / 2.0);
    let mut orbit = Orbit {
        distance: (bw.max(bd) as f32) * 1.3,
        yaw: 0.6,
        pitch: 0.5,
        fovy: 45.0_f32.to_radians(),
    };

    loop {
        let dt = get_frame_time();
        let eye = orbit.eye(target);
        let frame = poll_frame_input(&mut orbit, eye, target, app.terrain());
        app.apply_frame(frame, dt);

        clear_background(Color::new(0.09, 0.09, 0.09, 1.0));

        set_camera(&Camera3D {
            position: orbit.eye(target),
            target,
            up: vec3(0.0, 1.0, 0.0),
            fovy: orbit.fovy,
            ..Default::default()
        });

        draw_grid(bw.max(bd) as u32, 1.0, GRAY, DARKGRAY);
        draw_terrain_mesh(app.terrain_mesh(), app.wireframe());
        draw_water_mesh(app.mesh(), app.wireframe());

        set_default_camera();
        draw_text(
            &format!(
                "scenario: {}  map {}/{}  {}",
                app.scenario().name(),
                app.current_map_index() + 1,
                app.map_count(),
                if app.paused() { "(paused)" } else { "" }
            ),
            10.0,
            20.0,
            24.0,
            WHITE,
        );

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        next_frame().await;
    }
}

fn poll_frame_input(orbit: &mut Orbit, eye: Vec3, target: Vec3, terrain: &Terrain) -> FrameInput {
    let mut actions = Vec::new();
    if is_key_pressed(KeyCode::Space) {
        actions.push(Action::TogglePause);
    }
    if is_key_pressed(KeyCode::Tab) {
        actions.push(Action::CycleScenario);
    }
    if is_key_pressed(KeyCode::LeftBracket) {
        actions.push(Action::PreviousMap);
    }
    if is_key_pressed(KeyCode::RightBracket) {
        actions.push(Action::NextMap);
    }
    if is_key_pressed(KeyCode::Key1) {
        actions.push(Action::ToggleWireframe);
    }

    let (_, wheel_y) = mouse_wheel();
    orbit.distance = (orbit.distance - wheel_y * 0.05).max(4.0);
    if is_mouse_button_down(MouseButton::Right) {
        let d = mouse_delta_position();
        orbit.yaw += d.x * 2.0;
        orbit.pitch = (orbit.pitch - d.y * 2.0).clamp(-1.5, 1.5);
    }

    // Analytic ray/plane intersection against y = 0, not the real
    // heightfield: full raycasting against the mesh is out of scope.
    // Good enough for the sandbox "drop water here" gesture.
    let sandbox_click = if is_mouse_button_pressed(MouseButton::Left) {
        let (ray_origin, ray_dir) = screen_ray(mouse_position(), eye, target, orbit.fovy);
        intersect_ground_plane(ray_origin, ray_dir, terrain)
    } else {
        None
    };

    FrameInput { actions, sandbox_click }
}

fn screen_ray(mouse: (f32, f32), eye: Vec3, target: Vec3, fovy: f32) -> (Vec3, Vec3) {
    let sw = screen_width();
    let sh = screen_height();
    let aspect = sw / sh;

    let forward = (target - eye).normalize();
    let right = forward.cross(vec3(0.0, 1.0, 0.0)).normalize();
    let cam_up = right.cross(forward).normalize();

    let tan_fov = (fovy * 0.5).tan();
    let ndc_x = (2.0 * mouse.0 / sw - 1.0) * aspect * tan_fov;
    let ndc_y = (1.0 - 2.0 * mouse.1 / sh) * tan_fov;

    let dir = (forward + right * ndc_x + cam_up * ndc_y).normalize();
    (eye, dir)
}

fn intersect_ground_plane(origin: Vec3, dir: Vec3, terrain: &Terrain) -> Option<(f32, f32)> {
    if dir.y.abs() < 1e-6 {
        return None;
    }
    let t = -origin.y / dir.y;
    if t < 0.0 {
        return None;
    }
    let hit = origin + dir * t;
    terrain.near_height(hit.x, hit.z)?;
    Some((hit.x, hit.z))
}

fn draw_terrain_mesh(mesh: &TerrainMesh, wireframe: bool) {
    let verts: Vec<Vertex> = mesh
        .vertices()
        .iter()
        .map(|v| terrain_vertex(v))
        .collect();
    let triangles = strip_to_triangles(mesh.indices());
    draw_triangle_list(&verts, &triangles, wireframe);

    let (skirt_v, skirt_i) = mesh.skirt();
    let verts: Vec<Vertex> = skirt_v.iter().map(terrain_vertex).collect();
    let triangles = strip_to_triangles(skirt_i);
    draw_triangle_list(&verts, &triangles, wireframe);
}

fn draw_water_mesh(mesh: &MeshView, wireframe: bool) {
    let (surface_v, surface_i) = mesh.surface();
    let verts: Vec<Vertex> = surface_v.iter().map(water_vertex).collect();
    let triangles = strip_to_triangles(surface_i);
    draw_triangle_list(&verts, &triangles, wireframe);

    let (skirt_v, skirt_i) = mesh.skirt();
    let verts: Vec<Vertex> = skirt_v.iter().map(water_vertex).collect();
    let triangles = strip_to_triangles(skirt_i);
    draw_triangle_list(&verts, &triangles, wireframe);
}

fn terrain_vertex(v: &TerrainVertex) -> Vertex {
    Vertex {
        position: vec3(v.position[0], v.position[1], v.position[2]),
        uv: vec2(0.0, 0.0),
        color: [
            (v.color[0] * 255.0) as u8,
            (v.color[1] * 255.0) as u8,
            (v.color[2] * 255.0) as u8,
            255,
        ],
        normal: vec4(v.normal[0], v.normal[1], v.normal[2], 0.0),
    }
}

fn water_vertex(v: &MeshVertex) -> Vertex {
    Vertex {
        position: vec3(v.position[0], v.position[1], v.position[2]),
        uv: vec2(0.0, 0.0),
        color: [40, 110, 200, (v.visible * 200.0) as u8],
        normal: vec4(v.normal[0], v.normal[1], v.normal[2], 0.0),
    }
}

/// Walks a triangle strip (as emitted by `engine::mesh`'s index builders,
/// including its degenerate stitch indices) into a flat triangle list,
/// dropping any triangle with a repeated vertex.
fn strip_to_triangles(strip: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(strip.len() * 3);
    for w in 0..strip.len().saturating_sub(2) {
        let (a, b, c) = (strip[w], strip[w + 1], strip[w + 2]);
        if a == b || b == c || a == c {
            continue;
        }
        if w % 2 == 0 {
            out.extend_from_slice(&[a, b, c]);
        } else {
            out.extend_from_slice(&[a, c, b]);
        }
    }
    out
}

fn draw_triangle_list(verts: &[Vertex], triangles: &[u32], wireframe: bool) {
    if wireframe {
        for tri in triangles.chunks_exact(3) {
            let (a, b, c) = (
                verts[tri[0] as usize].position,
                verts[tri[1] as usize].position,
                verts[tri[2] as usize].position,
            );
            draw_line_3d(a, b, LIGHTGRAY);
            draw_line_3d(b, c, LIGHTGRAY);
            draw_line_3d(c, a, LIGHTGRAY);
        }
        return;
    }

    draw_mesh(&Mesh {
        vertices: verts.to_vec(),
        indices: triangles.iter().map(|&i| i as u16).collect(),
        texture: None,
    });
}
