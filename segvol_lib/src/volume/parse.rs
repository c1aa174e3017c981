use nalgebra::vector;
use nom::{
    number::complete::{le_f32, le_u32, le_u8},
    sequence::tuple,
    IResult,
};

use super::{checked_voxel_count, SampleWidth, VolumeError, VolumeMetadata};

/// dims 3x u32, scale 3x f32, sample width u8
pub const HEADER_LEN: usize = 3 * 4 + 3 * 4 + 1;

fn header(s: &[u8]) -> IResult<&[u8], ((u32, u32, u32), (f32, f32, f32), u8)> {
    tuple((
        tuple((le_u32, le_u32, le_u32)),
        tuple((le_f32, le_f32, le_f32)),
        le_u8,
    ))(s)
}

/// Parser of the raw label volume header, little endian.
pub fn label_volume_parser(slice: &[u8]) -> Result<VolumeMetadata, VolumeError> {
    let (_rest, (dims, scale, width)) = match header(slice) {
        Ok(r) => r,
        Err(_) => return Err(VolumeError::Header("file shorter than header")),
    };

    let sample_width = SampleWidth::try_from(width)?;
    let dims = vector![dims.0 as usize, dims.1 as usize, dims.2 as usize];

    checked_voxel_count(&dims)
        .and_then(|voxels| voxels.checked_mul(sample_width.bytes()))
        .ok_or(VolumeError::Header("volume dimensions overflow"))?;

    Ok(VolumeMetadata {
        dims,
        scale: vector![scale.0, scale.1, scale.2],
        sample_width,
        data_offset: HEADER_LEN,
    })
}

#[cfg(test)]
mod test {

    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn header_bytes(dims: [u32; 3], width: u8) -> Vec<u8> {
        let mut buf = vec![];
        for d in dims {
            buf.write_u32::<LittleEndian>(d).unwrap();
        }
        for s in [1.0, 1.0, 2.0] {
            buf.write_f32::<LittleEndian>(s).unwrap();
        }
        buf.write_u8(width).unwrap();
        buf
    }

    #[test]
    fn parse_header() {
        let meta = label_volume_parser(&header_bytes([4, 5, 6], 2)).unwrap();

        assert_eq!(meta.dims, vector![4, 5, 6]);
        assert_eq!(meta.scale, vector![1.0, 1.0, 2.0]);
        assert_eq!(meta.sample_width, SampleWidth::U16);
        assert_eq!(meta.data_offset, HEADER_LEN);
    }

    #[test]
    fn bad_sample_width() {
        assert!(matches!(
            label_volume_parser(&header_bytes([1, 1, 1], 3)),
            Err(VolumeError::UnsupportedSampleWidth(3))
        ));
    }

    #[test]
    fn overflowing_byte_count() {
        assert!(matches!(
            label_volume_parser(&header_bytes([1 << 21; 3], 4)),
            Err(VolumeError::Header("volume dimensions overflow"))
        ));
        assert!(label_volume_parser(&header_bytes([1 << 21; 3], 1)).is_ok());
    }

    #[test]
    fn short_header() {
        let bytes = header_bytes([1, 1, 1], 1);
        assert!(matches!(
            label_volume_parser(&bytes[..HEADER_LEN - 1]),
            Err(VolumeError::Header(_))
        ));
    }
}
