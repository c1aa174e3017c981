//! # Default values
//!
//! Initial camera state for both interaction modes.
//! Camera paths recorded by other tools depend on these exact values.

use nalgebra::{point, Point3};

use super::ProjectionMode;

/// State applied by [`Camera::reset`](super::Camera::reset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDefaults {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub orbital_radius: f32,
    pub speed: f32,
    /// Fixed eye position, `None` places the eye on the orbit around the look-at point
    pub position: Option<Point3<f32>>,
    pub projection_mode: ProjectionMode,
    pub orthogonal_scale: f32,
}

pub const ORBITAL_DEFAULTS: CameraDefaults = CameraDefaults {
    rotation_x: 0.5,
    rotation_y: 4.0,
    orbital_radius: 1.5,
    speed: 2.0,
    position: None,
    projection_mode: ProjectionMode::Perspective,
    orthogonal_scale: 5.0,
};

pub const FIRST_PERSON_DEFAULTS: CameraDefaults = CameraDefaults {
    rotation_x: 0.6,
    rotation_y: 2.25,
    orbital_radius: 1.0,
    speed: 2.0,
    position: Some(point![-0.8, 0.6666, -0.8]),
    projection_mode: ProjectionMode::Perspective,
    orthogonal_scale: 5.0,
};

// Construction values, partly overwritten by reset
pub const NEAR: f32 = 0.05;
pub const FAR: f32 = 1.0e3;
pub const INITIAL_POSITION: Point3<f32> = point![0.0, 0.0, 5.0];

/// `0.33 * pi`, with the factor rounded to `f32` before the product
pub fn vertical_fov() -> f32 {
    (0.33_f32 as f64 * std::f64::consts::PI) as f32
}
