//! Serialized camera state.
//!
//! Only the fields needed to restore a view are stored. Field of view, clipping
//! planes, projection mode and speed are not part of the record.
//!
//! Binary form, little-endian, no header, 37 bytes total:
//!
//! | field            | type     | bytes |
//! |------------------|----------|-------|
//! | `orbital`        | `u8` 0/1 | 1     |
//! | `position`       | 3x `f32` | 12    |
//! | `look_at`        | 3x `f32` | 12    |
//! | `rotation_x`     | `f32`    | 4     |
//! | `rotation_y`     | `f32`    | 4     |
//! | `orbital_radius` | `f32`    | 4     |
//!
//! Text form, one labelled line per group:
//!
//! ```text
//! orbital: 1
//! position: x y z
//! lookat: x y z
//! rotation: rotation_x rotation_y orbital_radius
//! ```

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::{point, Point3};
use nom::{
    bytes::complete::is_not,
    character::complete::{digit1, multispace0},
    combinator::map_res,
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use super::{Camera, CameraError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub orbital: bool,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub orbital_radius: f32,
}

impl CameraState {
    /// Length of the binary record
    pub const BINARY_LEN: usize = 1 + 3 * 4 + 3 * 4 + 3 * 4;

    /// Overwrite the stored fields of `camera`.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.orbital = self.orbital;
        camera.position = self.position;
        camera.look_at = self.look_at;
        camera.rotation_x = self.rotation_x;
        camera.rotation_y = self.rotation_y;
        camera.orbital_radius = self.orbital_radius;
    }

    pub fn write_binary<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        out.write_u8(self.orbital as u8)?;
        write_point(&mut out, &self.position)?;
        write_point(&mut out, &self.look_at)?;
        out.write_f32::<LittleEndian>(self.rotation_x)?;
        out.write_f32::<LittleEndian>(self.rotation_y)?;
        out.write_f32::<LittleEndian>(self.orbital_radius)?;
        Ok(())
    }

    pub fn read_binary<R: Read>(mut input: R) -> Result<CameraState, CameraError> {
        let orbital = input.read_u8()? != 0;
        let position = read_point(&mut input)?;
        let look_at = read_point(&mut input)?;
        let rotation_x = input.read_f32::<LittleEndian>()?;
        let rotation_y = input.read_f32::<LittleEndian>()?;
        let orbital_radius = input.read_f32::<LittleEndian>()?;

        Ok(CameraState {
            orbital,
            position,
            look_at,
            rotation_x,
            rotation_y,
            orbital_radius,
        })
    }

    pub fn write_text<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let p = &self.position;
        let l = &self.look_at;
        writeln!(out, "orbital: {}", self.orbital as u8)?;
        writeln!(out, "position: {} {} {}", p.x, p.y, p.z)?;
        writeln!(out, "lookat: {} {} {}", l.x, l.y, l.z)?;
        writeln!(
            out,
            "rotation: {} {} {}",
            self.rotation_x, self.rotation_y, self.orbital_radius
        )?;
        Ok(())
    }

    /// Read the text form. Content after the record is ignored.
    pub fn read_text<R: Read>(mut input: R) -> Result<CameraState, CameraError> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        match camera_text(&text) {
            Ok((_rest, state)) => Ok(state),
            Err(_) => Err(CameraError::Malformed("camera text record".into())),
        }
    }
}

impl From<&Camera> for CameraState {
    fn from(camera: &Camera) -> Self {
        CameraState {
            orbital: camera.orbital,
            position: camera.position,
            look_at: camera.look_at,
            rotation_x: camera.rotation_x,
            rotation_y: camera.rotation_y,
            orbital_radius: camera.orbital_radius,
        }
    }
}

fn write_point<W: Write>(out: &mut W, p: &Point3<f32>) -> std::io::Result<()> {
    out.write_f32::<LittleEndian>(p.x)?;
    out.write_f32::<LittleEndian>(p.y)?;
    out.write_f32::<LittleEndian>(p.z)
}

fn read_point<R: Read>(input: &mut R) -> std::io::Result<Point3<f32>> {
    let x = input.read_f32::<LittleEndian>()?;
    let y = input.read_f32::<LittleEndian>()?;
    let z = input.read_f32::<LittleEndian>()?;
    Ok(point![x, y, z])
}

// Any whitespace delimited token, labels are skipped without checking them
fn label(s: &str) -> IResult<&str, &str> {
    preceded(multispace0, is_not(" \t\r\n"))(s)
}

fn value(s: &str) -> IResult<&str, f32> {
    preceded(multispace0, float)(s)
}

fn flag_value(d: &str) -> Result<bool, &'static str> {
    match d.parse::<u32>() {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err("flag must be 0 or 1"),
    }
}

fn flag(s: &str) -> IResult<&str, bool> {
    map_res(preceded(multispace0, digit1), flag_value)(s)
}

/// Text record, starting at the `orbital:` label.
/// Leading whitespace and line breaks between values are accepted.
pub(crate) fn camera_text(s: &str) -> IResult<&str, CameraState> {
    let (s, (_, orbital)) = tuple((label, flag))(s)?;
    let (s, (_, px, py, pz)) = tuple((label, value, value, value))(s)?;
    let (s, (_, lx, ly, lz)) = tuple((label, value, value, value))(s)?;
    let (s, (_, rotation_x, rotation_y, orbital_radius)) = tuple((label, value, value, value))(s)?;

    Ok((
        s,
        CameraState {
            orbital,
            position: point![px, py, pz],
            look_at: point![lx, ly, lz],
            rotation_x,
            rotation_y,
            orbital_radius,
        },
    ))
}
