use std::path::Path;
use std::time::{Duration, Instant};

use glam::Vec3;
use wireview::config::ViewerConfig;
use wireview::controller::{FrameLoopContext, InputEvent, InteractionMode, MouseButton, ProjectionType};
use wireview::math;
use wireview::model::{parse_obj, Scene, SceneObject};

fn asset(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(name);
    std::fs::read_to_string(path).unwrap()
}

fn key(name: &str) -> [InputEvent; 2] {
    [InputEvent::KeyDown(name.into()), InputEvent::KeyUp(name.into())]
}

#[test]
fn bundled_assets_parse_into_closed_wireframes() {
    let cube = parse_obj(&asset("cube.obj")).unwrap();
    assert_eq!((cube.positions.len(), cube.edge_count(), cube.face_count()), (8, 12, 12));

    let pyramid = parse_obj(&asset("pyramid.obj")).unwrap();
    assert_eq!((pyramid.positions.len(), pyramid.edge_count()), (5, 8));

    let wedge = parse_obj(&asset("wedge.obj")).unwrap();
    assert_eq!((wedge.positions.len(), wedge.edge_count()), (6, 9));
}

#[test]
fn default_scene_loads_in_the_background() {
    let mut config = ViewerConfig::default();
    for object in &mut config.objects {
        object.mesh = Path::new(env!("CARGO_MANIFEST_DIR")).join(&object.mesh);
    }
    let mut scene: Scene<usize> = Scene::from_options(&config.objects);
    let mut frame = FrameLoopContext::new(&config, 1280, 720);
    frame.request_meshes(scene.objects());

    let deadline = Instant::now() + Duration::from_secs(5);
    while scene.loaded_count() < scene.len() && Instant::now() < deadline {
        for loaded in frame.update(0.016) {
            assert!(scene.set_mesh(loaded.slot, loaded.mesh.edge_count()));
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(scene.loaded_count(), scene.len());
    assert_eq!(frame.loader.pending(), 0);
    let edges: Vec<usize> = scene.drawables().map(|(_, _, edges)| *edges).collect();
    assert_eq!(edges, vec![12, 8, 12, 9]);
}

#[test]
fn mouse_session_then_fly_session() {
    let mut frame = FrameLoopContext::new(&ViewerConfig::default(), 800, 600);
    let start = *frame.controller.camera();

    // orbit with a left drag
    frame.handle_event(&InputEvent::CursorMoved { x: 100.0, y: 100.0 });
    frame.handle_event(&InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
    frame.handle_event(&InputEvent::CursorMoved { x: 400.0, y: 150.0 });
    frame.handle_event(&InputEvent::MouseButton { button: MouseButton::Left, pressed: false });
    let cam = *frame.controller.camera();
    assert_eq!(cam.center(), start.center());
    assert!((cam.distance() - start.distance()).abs() < 1e-4);
    assert_ne!(cam.eye(), start.eye());

    // dolly in with the wheel
    frame.handle_event(&InputEvent::MouseWheel { delta: 1000.0 });
    assert!((frame.controller.camera().distance() - (start.distance() - 1.0)).abs() < 1e-4);

    // switch to fly, hold forward for three frames
    for event in key("Tab") {
        frame.handle_event(&event);
    }
    assert_eq!(frame.controller.mode(), InteractionMode::Fly);
    let before = frame.controller.camera().eye();
    let dir = frame.controller.camera().view_direction().unwrap();
    frame.handle_event(&InputEvent::KeyDown("KeyW".into()));
    for _ in 0..3 {
        frame.update(0.016);
    }
    frame.handle_event(&InputEvent::KeyUp("KeyW".into()));
    frame.update(0.016);
    let moved = frame.controller.camera().eye() - before;
    assert!(moved.abs_diff_eq(dir * 0.15, 1e-4));

    // wheel is ignored in fly mode
    let eye = frame.controller.camera().eye();
    frame.handle_event(&InputEvent::MouseWheel { delta: 1000.0 });
    assert_eq!(frame.controller.camera().eye(), eye);

    // reset brings back the configured pose, mode is kept
    for event in key("KeyR") {
        frame.handle_event(&event);
    }
    assert_eq!(frame.controller.camera().eye(), Vec3::new(0.0, 1.0, 3.0));
    assert_eq!(frame.controller.mode(), InteractionMode::Fly);
}

#[test]
fn uploaded_matrices_project_the_center_to_the_middle_of_the_screen() {
    let mut frame = FrameLoopContext::new(&ViewerConfig::default(), 1024, 512);
    for volume in [ProjectionType::Perspective, ProjectionType::Orthographic] {
        frame.controller.set_projection_type(volume);
        let uniform = frame.frame_uniform();
        let view_proj = math::multiply(&uniform.proj, &uniform.view);
        let center = frame.controller.camera().center().to_array();
        let m = math::to_cols_2d(&view_proj);
        let clip: Vec<f32> = (0..4)
            .map(|row| (0..3).map(|col| m[col][row] * center[col]).sum::<f32>() + m[3][row])
            .collect();
        assert!((clip[0] / clip[3]).abs() < 1e-4, "{volume:?}");
        assert!((clip[1] / clip[3]).abs() < 1e-4, "{volume:?}");
        let depth = clip[2] / clip[3];
        assert!((0.0..=1.0).contains(&depth), "{volume:?} depth {depth}");
    }
}

#[test]
fn object_placement_moves_mesh_vertices() {
    let config = ViewerConfig::default();
    let tower = config.objects.iter().find(|o| o.name == "tower").unwrap();
    let object = SceneObject::from_options(tower);
    let base = math::transform_point(&object.model, [0.0, -0.5, 0.0]);
    let top = math::transform_point(&object.model, [0.0, 0.5, 0.0]);
    assert!(base[1].abs() < 1e-5);
    assert!((top[1] - 1.5).abs() < 1e-5);
}
