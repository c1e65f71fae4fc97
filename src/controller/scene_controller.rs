use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{CameraOptions, ProjectionOptions};
use crate::controller::input::MovementKey;
use crate::error::ViewerError;
use crate::math::{self, Mat4Array};
use crate::model::Camera;

/// Which gesture set drives the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Drag orbits (shift-drag tracks), wheel dollies.
    #[default]
    Mouse,
    /// Drag turns, movement keys translate.
    Fly,
}

impl InteractionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Mouse => Self::Fly,
            Self::Fly => Self::Mouse,
        }
    }
}

impl FromStr for InteractionMode {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mouse" => Ok(Self::Mouse),
            "fly" => Ok(Self::Fly),
            other => Err(ViewerError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mouse => "mouse",
            Self::Fly => "fly",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionType {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionType {
    pub fn toggled(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }
}

impl FromStr for ProjectionType {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perspective" => Ok(Self::Perspective),
            "orthographic" => Ok(Self::Orthographic),
            other => Err(ViewerError::UnknownViewVolume(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        })
    }
}

/// Routes raw input deltas to the camera according to the current mode and
/// keeps the view and projection matrices in sync with camera and viewport.
///
/// Both matrices are caches: every state change recomputes them from scratch.
pub struct SceneController {
    camera: Camera,
    mode: InteractionMode,
    projection_type: ProjectionType,
    viewport_width: u32,
    viewport_height: u32,
    view_matrix: Mat4Array,
    proj_matrix: Mat4Array,
    camera_options: CameraOptions,
    projection_options: ProjectionOptions,
}

impl SceneController {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_options(CameraOptions::default(), ProjectionOptions::default(), width, height)
    }

    pub fn with_options(
        camera_options: CameraOptions,
        projection_options: ProjectionOptions,
        width: u32,
        height: u32,
    ) -> Self {
        let mut controller = Self {
            camera: Camera::default(),
            mode: camera_options.mode,
            projection_type: projection_options.kind,
            viewport_width: width.max(1),
            viewport_height: height.max(1),
            view_matrix: math::identity(),
            proj_matrix: math::identity(),
            camera_options,
            projection_options,
        };
        controller.reset_camera();
        controller.update_projection();
        controller
    }

    pub fn camera(&self) -> &Camera { &self.camera }

    pub fn mode(&self) -> InteractionMode { self.mode }

    pub fn projection_type(&self) -> ProjectionType { self.projection_type }

    pub fn viewport(&self) -> (u32, u32) { (self.viewport_width, self.viewport_height) }

    pub fn aspect(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }

    pub fn view_matrix(&self) -> &Mat4Array { &self.view_matrix }

    pub fn proj_matrix(&self) -> &Mat4Array { &self.proj_matrix }

    fn update_view(&mut self) {
        self.camera.write_view_matrix(&mut self.view_matrix);
    }

    fn update_projection(&mut self) {
        let opts = &self.projection_options;
        let aspect = self.aspect();
        self.proj_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                math::perspective(opts.fov_y_degrees.to_radians(), aspect, opts.near, opts.far)
            }
            ProjectionType::Orthographic => {
                math::ortho(-aspect, aspect, -1.0, 1.0, opts.near, opts.far)
            }
        };
    }

    /// Drag in input units: orbit (mouse), track (mouse + shift) or turn (fly).
    pub fn dispatch_drag(&mut self, dx: f32, dy: f32, shift_held: bool) {
        let s = self.camera_options.sensitivity;
        let (dx, dy) = (dx * s, dy * s);
        match (self.mode, shift_held) {
            (InteractionMode::Mouse, false) => self.camera.orbit(dx, dy),
            (InteractionMode::Mouse, true) => self.camera.track(dx, dy),
            (InteractionMode::Fly, _) => self.camera.turn(dx, dy),
        }
        self.update_view();
    }

    /// Wheel in input units, positive toward the center. Mouse mode only.
    pub fn dispatch_wheel(&mut self, delta: f32) {
        if self.mode != InteractionMode::Mouse {
            return;
        }
        self.camera.dolly(delta * self.camera_options.sensitivity);
        self.update_view();
    }

    /// Applies every held movement key once. Fly mode only.
    pub fn poll_movement_keys(&mut self, keys: &HashSet<MovementKey>) {
        if self.mode != InteractionMode::Fly {
            return;
        }
        let step = self.camera_options.fly_step;
        for key in MovementKey::ALL {
            if !keys.contains(&key) {
                continue;
            }
            match key {
                MovementKey::StrafeLeft => self.camera.track(step, 0.0),
                MovementKey::StrafeRight => self.camera.track(-step, 0.0),
                MovementKey::Up => self.camera.track(0.0, step),
                MovementKey::Down => self.camera.track(0.0, -step),
                MovementKey::DollyIn => self.camera.dolly(step),
                MovementKey::DollyOut => self.camera.dolly(-step),
            }
            self.update_view();
        }
    }

    /// Switches gesture set; the camera keeps its pose.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            info!(%mode, "interaction mode changed");
        }
        self.mode = mode;
    }

    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        if projection_type != self.projection_type {
            info!(view_volume = %projection_type, "projection changed");
        }
        self.projection_type = projection_type;
        self.update_projection();
    }

    /// `"perspective"` or `"orthographic"`.
    pub fn set_view_volume(&mut self, name: &str) -> Result<(), ViewerError> {
        self.set_projection_type(name.parse()?);
        Ok(())
    }

    /// Zero-sized viewports (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring empty viewport");
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;
        self.update_projection();
    }

    pub fn reset_camera(&mut self) {
        let opts = &self.camera_options;
        self.camera.orient(Vec3::from(opts.eye), Vec3::from(opts.center), Vec3::from(opts.up));
        self.update_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-4;

    fn keys(list: &[MovementKey]) -> HashSet<MovementKey> {
        list.iter().copied().collect()
    }

    #[test]
    fn reset_restores_default_pose() {
        let mut sc = SceneController::new(800, 600);
        sc.dispatch_drag(300.0, -120.0, false);
        sc.dispatch_drag(50.0, 50.0, true);
        sc.dispatch_wheel(400.0);
        sc.reset_camera();
        let cam = sc.camera();
        assert_eq!(cam.eye(), Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(cam.center(), Vec3::ZERO);
        assert_eq!(cam.up(), Vec3::Y);
        assert_eq!(sc.view_matrix(), &cam.view_matrix());
    }

    #[test]
    fn mode_switch_leaves_view_untouched() {
        let mut sc = SceneController::new(800, 600);
        sc.dispatch_drag(120.0, 40.0, false);
        let before = *sc.view_matrix();
        sc.set_mode(InteractionMode::Fly);
        assert_eq!(sc.view_matrix(), &before);
        assert_eq!(sc.camera().view_matrix(), before);
    }

    #[test]
    fn orthographic_volume_follows_aspect() {
        let mut sc = SceneController::new(640, 480);
        sc.set_view_volume("orthographic").unwrap();
        sc.resize(800, 400);
        let p = sc.proj_matrix();
        // left/right = -2/+2, bottom/top = -1/+1
        assert!((p[0] - 0.5).abs() < 1e-6);
        assert!((p[5] - 1.0).abs() < 1e-6);
        assert!(p[12].abs() < 1e-6 && p[13].abs() < 1e-6);
    }

    #[test]
    fn perspective_uses_45_degree_fov() {
        let mut sc = SceneController::new(800, 400);
        sc.set_view_volume("orthographic").unwrap();
        sc.set_view_volume("perspective").unwrap();
        let cot = 1.0 / 22.5f32.to_radians().tan();
        assert!((sc.proj_matrix()[5] - cot).abs() < 1e-5);
        assert!((sc.proj_matrix()[0] - cot / 2.0).abs() < 1e-5);
    }

    #[test]
    fn unknown_view_volume_is_rejected() {
        let mut sc = SceneController::new(800, 600);
        let before = *sc.proj_matrix();
        assert!(matches!(sc.set_view_volume("fisheye"), Err(ViewerError::UnknownViewVolume(_))));
        assert_eq!(sc.proj_matrix(), &before);
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut sc = SceneController::new(800, 600);
        let before = *sc.proj_matrix();
        sc.resize(0, 600);
        assert_eq!(sc.viewport(), (800, 600));
        assert_eq!(sc.proj_matrix(), &before);
    }

    #[test]
    fn plain_drag_orbits_in_mouse_mode() {
        let mut sc = SceneController::new(800, 600);
        let start = *sc.camera();
        sc.dispatch_drag(1000.0, 0.0, false);
        let cam = sc.camera();
        assert_ne!(cam.eye(), start.eye());
        assert_eq!(cam.center(), start.center());
        assert!((cam.distance() - start.distance()).abs() < TOL);
    }

    #[test]
    fn shift_drag_tracks_in_mouse_mode() {
        let mut sc = SceneController::new(800, 600);
        sc.dispatch_drag(100.0, 0.0, true);
        let cam = sc.camera();
        assert!((cam.center().x + 0.1).abs() < TOL);
        assert!((cam.eye().x + 0.1).abs() < TOL);
    }

    #[test]
    fn drag_turns_in_fly_mode() {
        let mut sc = SceneController::new(800, 600);
        sc.set_mode(InteractionMode::Fly);
        let start = *sc.camera();
        sc.dispatch_drag(200.0, 0.0, true);
        assert_eq!(sc.camera().eye(), start.eye());
        assert_ne!(sc.camera().center(), start.center());
    }

    #[test]
    fn wheel_dollies_only_in_mouse_mode() {
        let mut sc = SceneController::new(800, 600);
        let start = sc.camera().distance();
        sc.dispatch_wheel(500.0);
        assert!((sc.camera().distance() - (start - 0.5)).abs() < TOL);

        sc.set_mode(InteractionMode::Fly);
        let before = *sc.camera();
        sc.dispatch_wheel(500.0);
        assert_eq!(*sc.camera(), before);
    }

    #[test]
    fn movement_keys_only_apply_in_fly_mode() {
        let mut sc = SceneController::new(800, 600);
        let before = *sc.camera();
        sc.poll_movement_keys(&keys(&[MovementKey::DollyIn, MovementKey::StrafeLeft]));
        assert_eq!(*sc.camera(), before);
    }

    #[test]
    fn simultaneous_movement_keys_all_apply() {
        let mut sc = SceneController::new(800, 600);
        sc.set_mode(InteractionMode::Fly);
        let start = *sc.camera();
        sc.poll_movement_keys(&keys(&[MovementKey::StrafeRight, MovementKey::Up]));
        let (_, u, v) = start.basis().unwrap();
        let expected = start.eye() + u * 0.05 + v * 0.05;
        assert!(sc.camera().eye().abs_diff_eq(expected, TOL));
        assert_eq!(sc.view_matrix(), &sc.camera().view_matrix());
    }

    #[test]
    fn opposite_movement_keys_cancel() {
        let mut sc = SceneController::new(800, 600);
        sc.set_mode(InteractionMode::Fly);
        let start = *sc.camera();
        sc.poll_movement_keys(&keys(&[MovementKey::DollyIn, MovementKey::DollyOut]));
        assert!(sc.camera().eye().abs_diff_eq(start.eye(), TOL));
    }

    #[test]
    fn modes_and_volumes_parse_from_strings() {
        assert_eq!("fly".parse::<InteractionMode>().unwrap(), InteractionMode::Fly);
        assert_eq!("mouse".parse::<InteractionMode>().unwrap(), InteractionMode::Mouse);
        assert!("walk".parse::<InteractionMode>().is_err());
        assert_eq!(
            "orthographic".parse::<ProjectionType>().unwrap(),
            ProjectionType::Orthographic
        );
        assert_eq!(InteractionMode::Fly.to_string(), "fly");
        assert_eq!(ProjectionType::Perspective.toggled(), ProjectionType::Orthographic);
    }
}
