//! # Label volume
//!
//! Raw segmentation volume handed to the renderer. File layout:
//! header (see [`HEADER_LEN`]) followed by `x` fastest samples of
//! 1, 2 or 4 bytes. Samples are widened to `u32` labels on load.

use std::{fs::File, path::Path};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{info, warn};
use memmap::{Mmap, MmapOptions};
use nalgebra::{Point3, Vector3};
use thiserror::Error;

use crate::common::LabelRange;

mod parse;

pub use parse::{label_volume_parser, HEADER_LEN};

#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("Cannot open volume file: {0}")]
    Open(#[from] std::io::Error),

    #[error("Malformed volume header: {0}")]
    Header(&'static str),

    #[error("Unsupported sample width {0} bytes")]
    UnsupportedSampleWidth(u8),

    #[error("Volume data truncated, expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("Volume of {dims:?} voxels needs {expected} samples, got {found}")]
    SizeMismatch {
        dims: [usize; 3],
        expected: usize,
        found: usize,
    },
}

/// Bytes per stored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    U8,
    U16,
    U32,
}

impl SampleWidth {
    pub fn bytes(&self) -> usize {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::U16 => 2,
            SampleWidth::U32 => 4,
        }
    }
}

impl TryFrom<u8> for SampleWidth {
    type Error = VolumeError;

    fn try_from(width: u8) -> Result<Self, Self::Error> {
        match width {
            1 => Ok(SampleWidth::U8),
            2 => Ok(SampleWidth::U16),
            4 => Ok(SampleWidth::U32),
            w => Err(VolumeError::UnsupportedSampleWidth(w)),
        }
    }
}

/// Number of voxels, `None` when it does not fit into `usize`
pub(crate) fn checked_voxel_count(dims: &Vector3<usize>) -> Option<usize> {
    dims.x.checked_mul(dims.y)?.checked_mul(dims.z)
}

pub struct VolumeMetadata {
    pub dims: Vector3<usize>,
    pub scale: Vector3<f32>, // shape of voxels
    pub sample_width: SampleWidth,
    pub data_offset: usize,
}

pub enum DataSource {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl DataSource {
    pub fn get_slice(&self) -> &[u8] {
        match self {
            DataSource::Vec(v) => v.as_slice(),
            DataSource::Mmap(m) => &m[..],
        }
    }

    pub fn from_file<P>(path: P) -> Result<DataSource, VolumeError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        // empty files cannot be mapped
        if file.metadata()?.len() == 0 {
            return Ok(DataSource::Vec(vec![]));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(DataSource::Mmap(mmap))
    }
}

/// Segmentation volume, one `u32` label per voxel.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    pub dims: Vector3<usize>,
    /// Shape of voxels as stored in the file. Kept for writing back,
    /// render spacing is taken from the parameter file's `Axis_Scale`.
    pub scale: Vector3<f32>,
    pub data: Vec<u32>,
}

impl LabelVolume {
    /// Wraps samples in `x` fastest order.
    pub fn from_vec(
        dims: Vector3<usize>,
        scale: Vector3<f32>,
        data: Vec<u32>,
    ) -> Result<LabelVolume, VolumeError> {
        let expected = checked_voxel_count(&dims)
            .ok_or(VolumeError::Header("volume dimensions overflow"))?;
        if data.len() != expected {
            return Err(VolumeError::SizeMismatch {
                dims: [dims.x, dims.y, dims.z],
                expected,
                found: data.len(),
            });
        }
        Ok(LabelVolume { dims, scale, data })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LabelVolume, VolumeError> {
        let path = path.as_ref();
        let ds = DataSource::from_file(path)?;
        let volume = LabelVolume::from_data_source(&ds, label_volume_parser)?;
        info!(
            "Loaded label volume {} with {}x{}x{} voxels",
            path.display(),
            volume.dims.x,
            volume.dims.y,
            volume.dims.z
        );
        Ok(volume)
    }

    pub fn from_data_source<PF>(ds: &DataSource, parser: PF) -> Result<LabelVolume, VolumeError>
    where
        PF: FnOnce(&[u8]) -> Result<VolumeMetadata, VolumeError>,
    {
        let slice = ds.get_slice();
        let meta = parser(slice)?;

        let expected = checked_voxel_count(&meta.dims)
            .and_then(|voxels| voxels.checked_mul(meta.sample_width.bytes()))
            .ok_or(VolumeError::Header("volume dimensions overflow"))?;
        let samples = slice.get(meta.data_offset..).unwrap_or(&[]);
        if samples.len() < expected {
            return Err(VolumeError::Truncated {
                expected,
                found: samples.len(),
            });
        }
        if samples.len() > expected {
            warn!(
                "Ignoring {} bytes after volume data",
                samples.len() - expected
            );
        }

        let samples = &samples[..expected];
        let data: Vec<u32> = match meta.sample_width {
            SampleWidth::U8 => samples.iter().map(|&s| s as u32).collect(),
            SampleWidth::U16 => samples
                .chunks_exact(2)
                .map(|c| LittleEndian::read_u16(c) as u32)
                .collect(),
            SampleWidth::U32 => samples
                .chunks_exact(4)
                .map(LittleEndian::read_u32)
                .collect(),
        };

        LabelVolume::from_vec(meta.dims, meta.scale, data)
    }

    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Label at voxel coordinates, `None` outside of the volume
    pub fn get(&self, pos: Point3<usize>) -> Option<u32> {
        if pos.x >= self.dims.x || pos.y >= self.dims.y || pos.z >= self.dims.z {
            return None;
        }
        let index = pos.x + self.dims.x * (pos.y + self.dims.y * pos.z);
        self.data.get(index).copied()
    }

    /// Smallest and largest label present
    pub fn label_range(&self) -> LabelRange {
        LabelRange::from_slice_par(&self.data)
    }

    /// Write in the raw label volume format with samples of `width` bytes.
    /// Labels not fitting into `width` are truncated.
    pub fn write_to<W: std::io::Write>(
        &self,
        mut out: W,
        width: SampleWidth,
    ) -> std::io::Result<()> {
        for d in [self.dims.x, self.dims.y, self.dims.z] {
            out.write_u32::<LittleEndian>(d as u32)?;
        }
        for s in [self.scale.x, self.scale.y, self.scale.z] {
            out.write_f32::<LittleEndian>(s)?;
        }
        out.write_u8(width.bytes() as u8)?;
        for &label in &self.data {
            match width {
                SampleWidth::U8 => out.write_u8(label as u8)?,
                SampleWidth::U16 => out.write_u16::<LittleEndian>(label as u16)?,
                SampleWidth::U32 => out.write_u32::<LittleEndian>(label)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::test_helpers::striped_volume;
    use nalgebra::{point, vector};
    use std::io::Write;

    #[test]
    fn file_round_trip_all_widths() {
        let volume = striped_volume(vector![4, 3, 2]);
        let dir = tempfile::tempdir().unwrap();

        for width in [SampleWidth::U8, SampleWidth::U16, SampleWidth::U32] {
            let path = dir.path().join(format!("vol{}.raw", width.bytes()));
            let mut file = File::create(&path).unwrap();
            volume.write_to(&mut file, width).unwrap();
            file.flush().unwrap();

            let read = LabelVolume::from_file(&path).unwrap();
            assert_eq!(read, volume);
        }
    }

    #[test]
    fn wide_labels() {
        let scale = vector![1.0, 1.0, 1.0];
        let volume = LabelVolume::from_vec(vector![2, 1, 1], scale, vec![7, 70000]).unwrap();
        let mut buf = vec![];
        volume.write_to(&mut buf, SampleWidth::U32).unwrap();

        let ds = DataSource::Vec(buf);
        let read = LabelVolume::from_data_source(&ds, label_volume_parser).unwrap();
        assert_eq!(read.data, vec![7, 70000]);
        assert_eq!(read.label_range(), LabelRange::from(7..=70000));
        assert_eq!(read.scale, scale);
    }

    #[test]
    fn truncated_data() {
        let volume = striped_volume(vector![4, 4, 4]);
        let mut buf = vec![];
        volume.write_to(&mut buf, SampleWidth::U16).unwrap();
        buf.truncate(buf.len() - 3);

        let res = LabelVolume::from_data_source(&DataSource::Vec(buf), label_volume_parser);
        assert!(matches!(
            res,
            Err(VolumeError::Truncated {
                expected: 128,
                found: 125
            })
        ));
    }

    #[test]
    fn oversized_dimensions() {
        let mut buf = vec![];
        for _ in 0..3 {
            buf.write_u32::<LittleEndian>(1 << 21).unwrap();
        }
        for _ in 0..3 {
            buf.write_f32::<LittleEndian>(1.0).unwrap();
        }
        buf.write_u8(4).unwrap();

        let res = LabelVolume::from_data_source(&DataSource::Vec(buf), label_volume_parser);
        assert!(matches!(res, Err(VolumeError::Header(_))));
    }

    #[test]
    fn oversized_metadata_from_custom_parser() {
        let scale = vector![1.0, 1.0, 1.0];
        let meta = VolumeMetadata {
            dims: vector![usize::MAX, 2, 1],
            scale,
            sample_width: SampleWidth::U8,
            data_offset: 0,
        };

        let res = LabelVolume::from_data_source(&DataSource::Vec(vec![]), |_| Ok(meta));
        assert!(matches!(res, Err(VolumeError::Header(_))));

        let res = LabelVolume::from_vec(vector![usize::MAX, 2, 1], scale, vec![]);
        assert!(matches!(res, Err(VolumeError::Header(_))));
    }

    #[test]
    fn size_mismatch() {
        let res = LabelVolume::from_vec(vector![2, 2, 2], vector![1.0, 1.0, 1.0], vec![0; 7]);
        assert!(matches!(res, Err(VolumeError::SizeMismatch { .. })));
    }

    #[test]
    fn voxel_lookup() {
        let volume = striped_volume(vector![4, 3, 2]);

        assert_eq!(volume.get(point![0, 0, 0]), Some(volume.data[0]));
        assert_eq!(volume.get(point![3, 2, 1]), volume.data.last().copied());
        assert_eq!(volume.get(point![4, 0, 0]), None);
        assert_eq!(volume.voxel_count(), 24);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            LabelVolume::from_file("/nonexistent/volume.raw"),
            Err(VolumeError::Open(_))
        ));
    }
}
