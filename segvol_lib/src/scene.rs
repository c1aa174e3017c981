//! Scene description for the external volume renderer.
//!
//! The renderer works in voxel units (one voxel is one world unit),
//! while the camera lives in a space where the largest volume axis is 1.
//! Camera distances are scaled up instead of scaling the volume down.

use std::f64::consts::PI;

use nalgebra::{Matrix4, Vector3};

use crate::{
    camera::{CameraError, ViewPose},
    vcfg::{AxisOrder, VolcaniteParameters},
};

/// Per axis `[min, max]`
pub type Bounds = [[f64; 2]; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSetup {
    /// World units per voxel
    pub spacing: Vector3<f64>,
    /// Bounds of the untransformed volume
    pub raw_bounds: Bounds,
    /// Raw bounds limited by the split planes
    pub crop_bounds: Bounds,
    /// Length of the largest volume axis
    pub max_size: f64,
    /// Centers the volume and applies the axis permutation
    pub volume_transform: Matrix4<f64>,
    pub pose: ViewPose,
    /// Projection for a renderer with upward y axis
    pub projection: Matrix4<f64>,
}

impl RenderSetup {
    /// Fails if the camera looks along the vertical axis.
    pub fn new(
        params: &mut VolcaniteParameters,
        dims: Vector3<usize>,
        aspect_ratio: f32,
    ) -> Result<RenderSetup, CameraError> {
        let spacing = params.axis_scale.cast::<f64>();
        let raw_bounds = raw_bounds(dims, &spacing);

        let max_size = raw_bounds
            .iter()
            .map(|[lo, hi]| hi - lo)
            .fold(0.0, f64::max);

        let center = Vector3::from_fn(|i, _| (raw_bounds[i][0] + raw_bounds[i][1]) / 2.0);
        let axes = axis_matrix(&params.axis_order, &params.axis_flip);
        let volume_transform = Matrix4::new_translation(&-center) * axes;

        let camera = &mut params.camera;
        let position = camera.position().cast::<f64>() * max_size;
        let focal_point = camera.look_at.cast::<f64>() * max_size;
        let view_up = camera.checked_up_vector()?.cast::<f64>();
        let view_angle = camera.vertical_fov as f64 / (2.0 * PI) * 360.0;

        // flip y back, the renderer's image y axis points up
        let mut projection = camera.view_to_projection(aspect_ratio).cast::<f64>();
        projection[(1, 1)] *= -1.0;

        let crop_bounds = crop(&raw_bounds, &params.split_planes);

        Ok(RenderSetup {
            spacing,
            raw_bounds,
            crop_bounds,
            max_size,
            volume_transform,
            pose: ViewPose {
                position,
                focal_point,
                view_up,
                view_angle,
                ..ViewPose::default()
            },
            projection,
        })
    }

    /// Replace the camera pose, e.g. with one exported from an earlier run.
    pub fn with_pose(mut self, pose: ViewPose) -> RenderSetup {
        self.pose = pose;
        self
    }
}

/// Column `a` holds `+-1` in row `order[a]`.
pub fn axis_matrix(order: &AxisOrder, flip: &[bool; 3]) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    for a in 0..3 {
        for row in 0..3 {
            m[(row, a)] = 0.0;
        }
        m[(order[a], a)] = if flip[a] { -1.0 } else { 1.0 };
    }
    m
}

/// Bounds of a volume with the first voxel at the origin.
pub fn raw_bounds(dims: Vector3<usize>, spacing: &Vector3<f64>) -> Bounds {
    let mut bounds = [[0.0; 2]; 3];
    for (i, b) in bounds.iter_mut().enumerate() {
        b[1] = dims[i].saturating_sub(1) as f64 * spacing[i];
    }
    bounds
}

pub fn crop(bounds: &Bounds, split_planes: &[[f32; 2]; 3]) -> Bounds {
    let mut cropped = *bounds;
    for (c, plane) in cropped.iter_mut().zip(split_planes) {
        c[0] = c[0].max(plane[0] as f64);
        c[1] = c[1].min(plane[1] as f64);
    }
    cropped
}
