//! # vcfg parameter files
//!
//! Line oriented text format holding the camera, the segmentation materials
//! and the voxel axis layout of a data set.
//!
//! ```text
//! Version 0.9.1
//! [Camera]
//! orbital: 1
//! position: 0.4 0.6 0.9
//! lookat: 0 0 0
//! rotation: 0.5 4 1.5
//! Materials: 1 # 0 10 20 0 0 1 1 0 0 0 -1 0
//! Axis_Order: XYZ
//! X_Axis: 0
//! ```
//!
//! Unknown labels are skipped. A known label with malformed values fails the whole file.

use std::{
    fs,
    ops::Index,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{info, warn};
use nalgebra::{vector, Vector3};
use thiserror::Error;

use crate::{camera::Camera, common::Interval};

mod parse;

pub use parse::read_parameters;

/// Most color map control points a material may carry
pub const MAX_COLOR_MAP_POINTS: usize = 65536;

#[derive(Error, Debug)]
pub enum VcfgError {
    #[error("Could not open parameter file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing version header")]
    MissingVersion,

    #[error("Error reading camera block")]
    Camera,

    #[error("Error reading parameter {label} {reason}")]
    Parameter { label: &'static str, reason: String },
}

/// Voxel attribute deciding which voxels a material applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator {
    /// Material is disabled
    None,
    /// Any attribute
    Any,
    Attribute(u32),
}

impl Discriminator {
    pub const NONE_CODE: i32 = -2;
    pub const ANY_CODE: i32 = -1;
}

impl TryFrom<i32> for Discriminator {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            Discriminator::NONE_CODE => Ok(Discriminator::None),
            Discriminator::ANY_CODE => Ok(Discriminator::Any),
            n if n >= 0 => Ok(Discriminator::Attribute(n as u32)),
            n => Err(format!("Unsupported discriminator attribute {n}")),
        }
    }
}

/// Wrap mode of a material's color map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapping {
    #[default]
    Clamp,
    Repeat,
    Random,
}

impl TryFrom<i32> for Wrapping {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Wrapping::Clamp),
            1 => Ok(Wrapping::Repeat),
            2 => Ok(Wrapping::Random),
            n => Err(format!("Unsupported wrapping mode {n}")),
        }
    }
}

/// One visibility and styling rule of a segmentation volume.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedVolumeMaterial {
    /// At most one character, the name field of the format is narrow.
    /// `#` in the file stands for an unnamed material.
    pub name: String,
    pub discr_attribute: Discriminator,
    /// Labels in this inclusive range belong to the material
    pub discr_interval: [f32; 2],
    pub tf_attribute: i32,
    pub tf_min_max: [f32; 2],
    pub opacity: f32,
    pub emission: f32,
    pub wrapping: Wrapping,
    /// Color map control points
    pub color_map: Vec<Vector3<f32>>,
    /// Index of a precomputed color map, negative if none
    pub precomputed_index: i32,
    /// Color map type in `<0;3>`
    pub color_map_type: u8,
}

impl SegmentedVolumeMaterial {
    pub fn is_visible(&self) -> bool {
        self.discr_attribute != Discriminator::None
    }

    /// Discriminator interval in integer labels
    pub fn label_interval(&self) -> Interval {
        Interval::new(self.discr_interval[0] as u32, self.discr_interval[1] as u32)
    }
}

impl Default for SegmentedVolumeMaterial {
    fn default() -> Self {
        SegmentedVolumeMaterial {
            name: String::new(),
            discr_attribute: Discriminator::Attribute(0),
            discr_interval: [0.0, 1.0],
            tf_attribute: 0,
            tf_min_max: [0.0, 1.0],
            opacity: 1.0,
            emission: 0.0,
            wrapping: Wrapping::Clamp,
            color_map: vec![],
            precomputed_index: -1,
            color_map_type: 0,
        }
    }
}

/// Permutation of the voxel axes.
///
/// `order[a]` is the destination axis of source axis `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisOrder([usize; 3]);

impl AxisOrder {
    pub fn identity() -> AxisOrder {
        AxisOrder([0, 1, 2])
    }

    /// Fails unless `order` is a permutation of `0, 1, 2`.
    pub fn new(order: [usize; 3]) -> Result<AxisOrder, String> {
        let mut seen = [false; 3];
        for &axis in &order {
            if axis > 2 || seen[axis] {
                return Err(format!("{order:?} is not a permutation of the axes"));
            }
            seen[axis] = true;
        }
        Ok(AxisOrder(order))
    }

    pub fn as_array(&self) -> [usize; 3] {
        self.0
    }
}

impl Default for AxisOrder {
    fn default() -> Self {
        AxisOrder::identity()
    }
}

impl Index<usize> for AxisOrder {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

/// Token of exactly one `X`, one `Y` and one `Z`, like `YXZ`.
/// The letter at position `i` gives the value of `order[i]`.
impl FromStr for AxisOrder {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut order = [0; 3];
        let mut chars = token.chars();
        for slot in order.iter_mut() {
            *slot = match chars.next() {
                Some('X') => 0,
                Some('Y') => 1,
                Some('Z') => 2,
                _ => return Err(format!("Invalid axis order {token}")),
            };
        }
        if chars.next().is_some() {
            return Err(format!("Invalid axis order {token}"));
        }
        AxisOrder::new(order).map_err(|_| format!("Invalid axis order {token}"))
    }
}

/// Everything read from a vcfg file.
#[derive(Debug)]
pub struct VolcaniteParameters {
    pub camera: Camera,
    pub materials: Vec<SegmentedVolumeMaterial>,
    pub axis_order: AxisOrder,
    /// Mirror destination axis
    pub axis_flip: [bool; 3],
    /// Physical voxel spacing
    pub axis_scale: Vector3<f32>,
    /// Crop planes per axis in voxels, `[min, max]`
    pub split_planes: [[f32; 2]; 3],
}

impl Default for VolcaniteParameters {
    fn default() -> Self {
        VolcaniteParameters {
            camera: Camera::default(),
            materials: vec![],
            axis_order: AxisOrder::identity(),
            axis_flip: [false; 3],
            axis_scale: vector![1.0, 1.0, 1.0],
            split_planes: [[f32::NEG_INFINITY, f32::INFINITY]; 3],
        }
    }
}

impl VolcaniteParameters {
    /// Label intervals of all materials that are not disabled.
    pub fn visible_intervals(&self) -> Vec<Interval> {
        visible_intervals(&self.materials)
    }
}

/// Label intervals of all materials that are not disabled, in material order.
pub fn visible_intervals(materials: &[SegmentedVolumeMaterial]) -> Vec<Interval> {
    materials
        .iter()
        .filter(|m| m.is_visible())
        .map(SegmentedVolumeMaterial::label_interval)
        .collect()
}

/// Reads all parameters from a vcfg file.
pub fn read_parameter_file<P: AsRef<Path>>(path: P) -> Result<VolcaniteParameters, VcfgError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| VcfgError::Open {
        path: path.to_owned(),
        source,
    })?;
    let params = read_parameters(&text)?;
    info!("Imported rendering parameters from {}", path.display());
    Ok(params)
}

/// Reads all parameters from a vcfg file, returning `fallback` if that fails.
pub fn read_parameter_file_or<P: AsRef<Path>>(
    path: P,
    fallback: VolcaniteParameters,
) -> VolcaniteParameters {
    let path = path.as_ref();
    match read_parameter_file(path) {
        Ok(params) => params,
        Err(e) => {
            warn!(
                "Could not import rendering parameters from {}: {e}",
                path.display()
            );
            fallback
        }
    }
}

/// Reads all parameters from a vcfg file, defaults if that fails.
pub fn read_parameter_file_or_default<P: AsRef<Path>>(path: P) -> VolcaniteParameters {
    read_parameter_file_or(path, VolcaniteParameters::default())
}
