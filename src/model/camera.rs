use glam::{Mat3, Vec3};
use tracing::trace;

use crate::math::{self, Mat4Array};

const EPSILON: f32 = 1e-6;

/// Target-centered viewing transform: where the eye is, what it looks at, and
/// which way is up. The view direction and the right/up basis are derived on
/// every call instead of being stored, so orbit/track/dolly never accumulate
/// drift in a cached matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
}

fn unit(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    (len > EPSILON).then(|| v / len)
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 3.0), Vec3::ZERO, Vec3::Y)
    }
}

impl Camera {
    pub fn new(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        Self { eye, center, up }
    }

    pub fn orient(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.eye = eye;
        self.center = center;
        self.up = up;
    }

    pub fn eye(&self) -> Vec3 { self.eye }

    pub fn center(&self) -> Vec3 { self.center }

    pub fn up(&self) -> Vec3 { self.up }

    pub fn distance(&self) -> f32 { (self.eye - self.center).length() }

    /// `normalize(center - eye)`, or `None` when eye and center coincide.
    pub fn view_direction(&self) -> Option<Vec3> {
        unit(self.center - self.eye)
    }

    /// `(view_direction, u, v)` where `u` is camera-right and `v` camera-up.
    /// `None` when the view direction is undefined or parallel to `up`.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let dir = self.view_direction()?;
        let u = unit(dir.cross(self.up))?;
        Some((dir, u, u.cross(dir)))
    }

    /// Yaw about `up`, then pitch about the right vector recomputed after the
    /// yaw. `looking` maps the rotated vector to the view direction it implies.
    fn yaw_then_pitch(&self, v: Vec3, looking: f32, dx: f32, dy: f32) -> Vec3 {
        let mut v = v;
        match unit(self.up) {
            Some(axis) => v = Mat3::from_axis_angle(axis, -dx) * v,
            None => trace!("zero-length up vector, skipping yaw"),
        }
        let dir = (v * looking).normalize_or_zero();
        match unit(dir.cross(self.up)) {
            Some(u) => v = Mat3::from_axis_angle(u, -dy) * v,
            None => trace!("view direction parallel to up, skipping pitch"),
        }
        v
    }

    /// Rotates the eye around the center, preserving distance.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let offset = self.eye - self.center;
        if offset.length() <= EPSILON {
            trace!("eye coincides with center, skipping orbit");
            return;
        }
        self.eye = self.center + self.yaw_then_pitch(offset, -1.0, dx, dy);
    }

    /// Translates eye and center together in the view plane.
    pub fn track(&mut self, dx: f32, dy: f32) {
        let Some((_, u, v)) = self.basis() else {
            trace!("degenerate camera basis, skipping track");
            return;
        };
        let offset = u * -dx + v * dy;
        self.eye += offset;
        self.center += offset;
    }

    /// Moves the eye along the view direction; positive is toward the center.
    pub fn dolly(&mut self, delta: f32) {
        let Some(dir) = self.view_direction() else {
            trace!("eye coincides with center, skipping dolly");
            return;
        };
        let eye = self.eye + dir * delta;
        if (self.center - eye).length() <= EPSILON {
            trace!("dolly would land on center, skipping");
            return;
        }
        self.eye = eye;
    }

    /// First-person look: rotates the center around a fixed eye.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        let forward = self.center - self.eye;
        if forward.length() <= EPSILON {
            trace!("eye coincides with center, skipping turn");
            return;
        }
        self.center = self.eye + self.yaw_then_pitch(forward, 1.0, dx, dy);
    }

    pub fn view_matrix(&self) -> Mat4Array {
        math::look_at(self.eye.to_array(), self.center.to_array(), self.up.to_array())
    }

    pub fn write_view_matrix(&self, out: &mut Mat4Array) {
        *out = self.view_matrix();
    }
}
