//! Viewer state and the transforms derived from it.

use thiserror::Error;

pub mod defaults;
mod state;
mod view_camera;
mod view_pose;

pub use defaults::CameraDefaults;
pub use state::CameraState;
pub use view_camera::{Camera, UpdateCallback};
pub use view_pose::ViewPose;

pub(crate) use state::camera_text;

/// Projection from view space to clip space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthogonal,
}

impl TryFrom<i32> for ProjectionMode {
    type Error = CameraError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ProjectionMode::Perspective),
            1 => Ok(ProjectionMode::Orthogonal),
            _ => Err(CameraError::UnknownProjectionMode(code)),
        }
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Unknown camera projection mode {0}")]
    UnknownProjectionMode(i32),

    #[error("Up vector is undefined when looking along the vertical axis")]
    DegenerateUpVector,

    #[error("Malformed camera record: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
