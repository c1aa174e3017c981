//! Module with helper functions
//! Saves repetition in unit tests

use nalgebra::{vector, Vector3};

use crate::volume::LabelVolume;

/// Parameter file with a camera block, one visible material with labels `<10;20>`
/// and the y axis flipped.
pub const SAMPLE_VCFG: &str = "Version 0.9.1
[Camera]
orbital: 1
position: 0.3 0.4 1.2
lookat: 0 0 0
rotation: 0.5 4 1.5
Materials: 1 cell 0 10 20 0 0 1 1 0 0 2 1 0 0 0 0 1 -1 0
Axis_Order: XYZ
X_Axis: 0
Y_Axis: 1
Z_Axis: 0
Shading: 1
";

/// Volume with labels `(x + 2y + 3z) % 200`, fits into one byte per sample.
pub fn striped_volume(dims: Vector3<usize>) -> LabelVolume {
    let mut data = Vec::with_capacity(dims.x * dims.y * dims.z);
    for z in 0..dims.z {
        for y in 0..dims.y {
            for x in 0..dims.x {
                data.push(((x + 2 * y + 3 * z) % 200) as u32);
            }
        }
    }
    LabelVolume {
        dims,
        scale: vector![1.0, 1.0, 1.0],
        data,
    }
}
