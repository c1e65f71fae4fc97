//! Column-major 4x4 matrix helpers on fixed-size arrays.
//!
//! Every matrix is a `[f32; 16]` laid out column by column, which is the
//! layout the shaders expect for `uView`, `uProj` and `uModel`. Projections
//! map depth to `[0, 1]`.

use glam::{Mat4, Vec3};

/// Column-major 4x4 matrix.
pub type Mat4Array = [f32; 16];

const EPSILON: f32 = 1e-6;

pub fn identity() -> Mat4Array {
    Mat4::IDENTITY.to_cols_array()
}

/// `a * b`
pub fn multiply(a: &Mat4Array, b: &Mat4Array) -> Mat4Array {
    (Mat4::from_cols_array(a) * Mat4::from_cols_array(b)).to_cols_array()
}

/// Post-multiplies `m` by a translation.
pub fn translate(m: &Mat4Array, offset: [f32; 3]) -> Mat4Array {
    (Mat4::from_cols_array(m) * Mat4::from_translation(Vec3::from(offset))).to_cols_array()
}

/// Post-multiplies `m` by a non-uniform scale.
pub fn scale(m: &Mat4Array, factors: [f32; 3]) -> Mat4Array {
    (Mat4::from_cols_array(m) * Mat4::from_scale(Vec3::from(factors))).to_cols_array()
}

/// Post-multiplies `m` by a rotation of `radians` about `axis`.
/// A zero-length axis leaves `m` unchanged.
pub fn rotate(m: &Mat4Array, radians: f32, axis: [f32; 3]) -> Mat4Array {
    let axis = Vec3::from(axis);
    if axis.length() <= EPSILON {
        return *m;
    }
    (Mat4::from_cols_array(m) * Mat4::from_axis_angle(axis.normalize(), radians)).to_cols_array()
}

/// Right-handed look-at view matrix.
///
/// If `eye` and `center` coincide the result is a pure translation by
/// `-eye`. If `up` is zero or parallel to the view direction, a
/// perpendicular world axis stands in for it.
pub fn look_at(eye: [f32; 3], center: [f32; 3], up: [f32; 3]) -> Mat4Array {
    let eye = Vec3::from(eye);
    let center = Vec3::from(center);
    let forward = center - eye;
    if forward.length() <= EPSILON {
        return Mat4::from_translation(-eye).to_cols_array();
    }

    let forward = forward.normalize();
    let mut up = Vec3::from(up);
    if forward.cross(up).length() <= EPSILON {
        up = if forward.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
    }
    Mat4::look_at_rh(eye, center, up).to_cols_array()
}

/// Perspective projection; `fov_y` in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4Array {
    Mat4::perspective_rh(fov_y, aspect, near, far).to_cols_array()
}

/// Orthographic projection over the given view volume.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4Array {
    Mat4::orthographic_rh(left, right, bottom, top, near, far).to_cols_array()
}

/// `translate * rotate * scale`, the placement transform of a diorama object.
pub fn model_matrix(translation: [f32; 3], axis: [f32; 3], radians: f32, factors: [f32; 3]) -> Mat4Array {
    let m = translate(&identity(), translation);
    let m = rotate(&m, radians, axis);
    scale(&m, factors)
}

/// Applies `m` to a point (w = 1).
pub fn transform_point(m: &Mat4Array, point: [f32; 3]) -> [f32; 3] {
    Mat4::from_cols_array(m).transform_point3(Vec3::from(point)).to_array()
}

/// Reshapes a column-major array into the nested layout uniform structs use.
pub fn to_cols_2d(m: &Mat4Array) -> [[f32; 4]; 4] {
    Mat4::from_cols_array(m).to_cols_array_2d()
}
