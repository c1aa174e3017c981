use std::fmt;
use std::io::{Read, Write};

use nalgebra::{matrix, vector, Matrix4, Point3, Vector3};

use super::{
    defaults::{self, FIRST_PERSON_DEFAULTS, ORBITAL_DEFAULTS},
    CameraError, CameraState, ProjectionMode,
};

pub type UpdateCallback = Box<dyn FnMut() + Send>;

/// Viewer state characterizing the world to projection space transform,
/// except for the aspect ratio.
///
/// No transform is stored, matrices are computed from the current state on request.
/// The world is right-handed: y is up, x to the right, z points out of the xy plane.
/// Without rotation the camera looks into the negative z direction.
pub struct Camera {
    /// Orbital (rotate around look-at point) instead of first person controls
    pub orbital: bool,
    /// Distance of the camera to the look-at point in orbital mode
    pub orbital_radius: f32,
    /// Position of the camera in world space
    pub position: Point3<f32>,
    /// Position of the look-at point in world space
    pub look_at: Point3<f32>,
    /// Rotation around the local x axis, radians
    pub rotation_x: f32,
    /// Rotation around the global y axis, radians
    pub rotation_y: f32,
    /// Vertical field of view (top to bottom), radians
    pub vertical_fov: f32,
    /// Distance of the near plane
    pub near: f32,
    /// Distance of the far plane
    pub far: f32,
    /// Movement speed along a single axis, meters per second
    pub speed: f32,
    pub projection_mode: ProjectionMode,
    /// Width of the view volume in orthogonal mode
    pub orthogonal_scale: f32,
    /// Rotation when the current drag started
    rotation_anchor: Option<(f32, f32)>,
    update_callback: Option<UpdateCallback>,
}

impl Camera {
    /// Construct camera in the given mode, with that mode's defaults applied.
    pub fn new(orbital: bool) -> Camera {
        let mut camera = Camera {
            orbital,
            orbital_radius: ORBITAL_DEFAULTS.orbital_radius,
            position: defaults::INITIAL_POSITION,
            look_at: Point3::origin(),
            rotation_x: 0.0,
            rotation_y: 0.0,
            vertical_fov: defaults::vertical_fov(),
            near: defaults::NEAR,
            far: defaults::FAR,
            speed: ORBITAL_DEFAULTS.speed,
            projection_mode: ProjectionMode::Perspective,
            orthogonal_scale: ORBITAL_DEFAULTS.orthogonal_scale,
            rotation_anchor: None,
            update_callback: None,
        };
        camera.reset();
        camera
    }

    /// Apply the defaults of the current mode.
    ///
    /// Field of view and clipping planes are kept.
    pub fn reset(&mut self) {
        let defaults = if self.orbital {
            &ORBITAL_DEFAULTS
        } else {
            &FIRST_PERSON_DEFAULTS
        };

        self.rotation_x = defaults.rotation_x;
        self.rotation_y = defaults.rotation_y;
        self.rotation_anchor = None;
        self.orbital_radius = defaults.orbital_radius;
        self.speed = defaults.speed;
        // The orbit is placed around the previous look-at point, before it is reset
        self.position = match defaults.position {
            Some(position) => position,
            None => self.orbit_position(),
        };
        self.look_at = Point3::origin();
        self.projection_mode = defaults.projection_mode;
        self.orthogonal_scale = defaults.orthogonal_scale;
    }

    /// Eye position on the orbit, from spherical coordinates around the look-at point.
    pub fn orbit_position(&self) -> Point3<f32> {
        let r = self.orbital_radius;
        let (rx, ry) = (self.rotation_x, self.rotation_y);
        self.look_at
            + vector![
                r * ry.cos() * rx.cos(),
                r * rx.sin(),
                r * ry.sin() * rx.cos()
            ]
    }

    /// Position of the camera.
    ///
    /// In orbital mode the stored position is first synchronized with the orbit.
    pub fn position(&mut self) -> Point3<f32> {
        if self.orbital {
            self.position = self.orbit_position();
        }
        self.position
    }

    // Difference from eye to target projected on the xz plane, rotated by 90 degrees
    fn horizontal_tangent(&self) -> Vector3<f32> {
        vector![
            self.position.z - self.look_at.z,
            0.0,
            self.look_at.x - self.position.x
        ]
    }

    /// Up vector of the view, orthogonal to the view direction.
    ///
    /// Undefined (NaN) when eye and look-at point share the same xz projection,
    /// see [`checked_up_vector`](Camera::checked_up_vector).
    pub fn up_vector(&self) -> Vector3<f32> {
        let tangent = self.horizontal_tangent().normalize();
        (self.position - self.look_at).normalize().cross(&tangent)
    }

    /// Like [`up_vector`](Camera::up_vector), but fails when looking along the vertical axis.
    pub fn checked_up_vector(&self) -> Result<Vector3<f32>, CameraError> {
        let tangent = self.horizontal_tangent();
        if tangent.norm() <= f32::EPSILON {
            return Err(CameraError::DegenerateUpVector);
        }
        Ok((self.position - self.look_at)
            .normalize()
            .cross(&tangent.normalize()))
    }

    /// World to view space transform.
    ///
    /// Orbital mode looks from the stored position at the look-at point.
    /// First person mode translates the world into the camera frame, then applies yaw, then pitch.
    pub fn world_to_view(&self) -> Matrix4<f32> {
        if self.orbital {
            look_at_rh(&self.position, &self.look_at, &self.up_vector())
        } else {
            rotation_x(self.rotation_x)
                * rotation_y(self.rotation_y)
                * Matrix4::new_translation(&-self.position.coords)
        }
    }

    /// View to projection space transform for `aspect_ratio` (width / height).
    ///
    /// Entry (1,1) is negated, the target's vertical axis points down.
    pub fn view_to_projection(&self, aspect_ratio: f32) -> Matrix4<f32> {
        let mut proj = match self.projection_mode {
            ProjectionMode::Perspective => {
                perspective_rh(self.vertical_fov, aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthogonal => {
                let half_width = 0.5 * self.orthogonal_scale;
                let half_height = 0.5 * self.orthogonal_scale / aspect_ratio;
                orthographic(-half_width, half_width, -half_height, half_height)
            }
        };

        proj[(1, 1)] *= -1.0;

        proj
    }

    /// World to projection space transform for `aspect_ratio` (width / height).
    pub fn world_to_projection(&self, aspect_ratio: f32) -> Matrix4<f32> {
        self.view_to_projection(aspect_ratio) * self.world_to_view()
    }

    /// Remember the rotation at the start of a drag.
    pub fn begin_rotation(&mut self) {
        self.rotation_anchor = Some((self.rotation_x, self.rotation_y));
    }

    pub fn end_rotation(&mut self) {
        self.rotation_anchor = None;
    }

    /// Rotation `(x, y)` when the current drag started.
    pub fn rotation_anchor(&self) -> Option<(f32, f32)> {
        self.rotation_anchor
    }

    /// Install the function called by [`on_update`](Camera::on_update).
    ///
    /// There is a single slot, the previously installed function is returned.
    pub fn set_update_callback<F>(&mut self, callback: F) -> Option<UpdateCallback>
    where
        F: FnMut() + Send + 'static,
    {
        self.update_callback.replace(Box::new(callback))
    }

    pub fn clear_update_callback(&mut self) -> Option<UpdateCallback> {
        self.update_callback.take()
    }

    /// Notify the installed function that the camera moved.
    pub fn on_update(&mut self) {
        if let Some(callback) = self.update_callback.as_mut() {
            callback();
        }
    }

    /// Write the serialized subset of the camera state, see [`CameraState`].
    pub fn write_to<W: Write>(&self, out: W, human_readable: bool) -> Result<(), CameraError> {
        let state = CameraState::from(self);
        if human_readable {
            state.write_text(out)?;
        } else {
            state.write_binary(out)?;
        }
        Ok(())
    }

    /// Read the serialized subset of the camera state, see [`CameraState`].
    /// Other fields are left untouched.
    pub fn read_from<R: Read>(
        &mut self,
        input: R,
        human_readable: bool,
    ) -> Result<(), CameraError> {
        let state = if human_readable {
            CameraState::read_text(input)?
        } else {
            CameraState::read_binary(input)?
        };
        state.apply_to(self);
        Ok(())
    }

    /// Width / height
    pub fn aspect_ratio(width: u32, height: u32) -> f32 {
        (width as f32) / (height as f32)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(true)
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("orbital", &self.orbital)
            .field("orbital_radius", &self.orbital_radius)
            .field("position", &self.position)
            .field("look_at", &self.look_at)
            .field("rotation_x", &self.rotation_x)
            .field("rotation_y", &self.rotation_y)
            .field("vertical_fov", &self.vertical_fov)
            .field("near", &self.near)
            .field("far", &self.far)
            .field("speed", &self.speed)
            .field("projection_mode", &self.projection_mode)
            .field("orthogonal_scale", &self.orthogonal_scale)
            .field("rotation_anchor", &self.rotation_anchor)
            .field("update_callback", &self.update_callback.is_some())
            .finish()
    }
}

// Right-handed look-at, rows are side, up and backward direction
fn look_at_rh(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let f = (target - eye).normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(&f);
    let eye = eye.coords;

    matrix![s.x, s.y, s.z, -s.dot(&eye);
            u.x, u.y, u.z, -u.dot(&eye);
            -f.x, -f.y, -f.z, f.dot(&eye);
            0.0, 0.0, 0.0, 1.0]
}

// Diagonal terms of the rotation axis are `c + (1 - c)`, as an axis-angle
// rotation computes them, not a literal 1
fn rotation_x(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    let one = c + (1.0 - c);
    matrix![one, 0.0, 0.0, 0.0;
            0.0, c, -s, 0.0;
            0.0, s, c, 0.0;
            0.0, 0.0, 0.0, 1.0]
}

fn rotation_y(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    let one = c + (1.0 - c);
    matrix![c, 0.0, s, 0.0;
            0.0, one, 0.0, 0.0;
            -s, 0.0, c, 0.0;
            0.0, 0.0, 0.0, 1.0]
}

// Clip space depth in <-1;1>
fn perspective_rh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let tan_half_fov = (fov_y / 2.0).tan();
    matrix![1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0;
            0.0, 1.0 / tan_half_fov, 0.0, 0.0;
            0.0, 0.0, -(far + near) / (far - near), -(2.0 * far * near) / (far - near);
            0.0, 0.0, -1.0, 0.0]
}

// Orthographic projection without depth range, z is mirrored
fn orthographic(left: f32, right: f32, bottom: f32, top: f32) -> Matrix4<f32> {
    matrix![2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left);
            0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom);
            0.0, 0.0, -1.0, 0.0;
            0.0, 0.0, 0.0, 1.0]
}
