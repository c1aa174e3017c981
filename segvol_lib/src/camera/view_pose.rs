//! Camera pose file used by the rendering setup.
//!
//! One keyword line per field:
//!
//! ```text
//! Position x y z
//! FocalPoint x y z
//! ViewUp x y z
//! ViewAngle degrees
//! ClippingRange near far
//! ```
//!
//! All lines are written. When reading, lines are matched by their leading
//! keyword in any order, other lines are ignored.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use nalgebra::{point, vector, Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::space1,
    combinator::map,
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use super::CameraError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPose {
    pub position: Point3<f64>,
    pub focal_point: Point3<f64>,
    pub view_up: Vector3<f64>,
    /// Vertical view angle in degrees
    pub view_angle: f64,
    /// Near and far clipping distance
    pub clipping_range: (f64, f64),
}

impl Default for ViewPose {
    fn default() -> Self {
        ViewPose {
            position: point![0.0, 0.0, 1.0],
            focal_point: point![0.0, 0.0, 0.0],
            view_up: vector![0.0, 1.0, 0.0],
            view_angle: 30.0,
            clipping_range: (0.01, 1000.01),
        }
    }
}

enum PoseLine {
    Position(Point3<f64>),
    FocalPoint(Point3<f64>),
    ViewUp(Vector3<f64>),
    ViewAngle(f64),
    ClippingRange(f64, f64),
}

impl ViewPose {
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let p = &self.position;
        let f = &self.focal_point;
        let u = &self.view_up;
        writeln!(out, "Position {} {} {}", p.x, p.y, p.z)?;
        writeln!(out, "FocalPoint {} {} {}", f.x, f.y, f.z)?;
        writeln!(out, "ViewUp {} {} {}", u.x, u.y, u.z)?;
        writeln!(out, "ViewAngle {}", self.view_angle)?;
        writeln!(
            out,
            "ClippingRange {} {}",
            self.clipping_range.0, self.clipping_range.1
        )?;
        Ok(())
    }

    /// Overwrite fields with the keyword lines found in `input`.
    ///
    /// A keyword line with malformed values is an error.
    pub fn update_from<R: BufRead>(&mut self, input: R) -> Result<(), CameraError> {
        for line in input.lines() {
            let line = line?;
            if !KEYWORDS.iter().any(|k| line.starts_with(k)) {
                continue;
            }
            let parsed = match pose_line(&line) {
                Ok((_, parsed)) => parsed,
                Err(_) => return Err(CameraError::Malformed(line)),
            };
            match parsed {
                PoseLine::Position(p) => self.position = p,
                PoseLine::FocalPoint(p) => self.focal_point = p,
                PoseLine::ViewUp(v) => self.view_up = v,
                PoseLine::ViewAngle(a) => self.view_angle = a,
                PoseLine::ClippingRange(near, far) => self.clipping_range = (near, far),
            }
        }
        Ok(())
    }

    /// Write pose to a file, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Read pose from a file. Fields missing from the file keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ViewPose, CameraError> {
        let file = File::open(path)?;
        let mut pose = ViewPose::default();
        pose.update_from(BufReader::new(file))?;
        Ok(pose)
    }
}

const KEYWORDS: [&str; 5] = [
    "Position",
    "FocalPoint",
    "ViewUp",
    "ViewAngle",
    "ClippingRange",
];

fn number(s: &str) -> IResult<&str, f64> {
    preceded(space1, double)(s)
}

fn triple(s: &str) -> IResult<&str, (f64, f64, f64)> {
    tuple((number, number, number))(s)
}

fn pose_line(s: &str) -> IResult<&str, PoseLine> {
    alt((
        map(preceded(tag("Position"), triple), |(x, y, z)| {
            PoseLine::Position(point![x, y, z])
        }),
        map(preceded(tag("FocalPoint"), triple), |(x, y, z)| {
            PoseLine::FocalPoint(point![x, y, z])
        }),
        map(preceded(tag("ViewUp"), triple), |(x, y, z)| {
            PoseLine::ViewUp(vector![x, y, z])
        }),
        map(preceded(tag("ViewAngle"), number), PoseLine::ViewAngle),
        map(
            preceded(tag("ClippingRange"), tuple((number, number))),
            |(near, far)| PoseLine::ClippingRange(near, far),
        ),
    ))(s)
}
