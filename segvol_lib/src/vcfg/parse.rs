use log::{debug, info};
use nalgebra::vector;
use nom::{
    bytes::complete::is_not,
    character::complete::{i32 as int, multispace0, not_line_ending, u32 as uint},
    multi::count,
    number::complete::float,
    sequence::{pair, preceded, tuple},
    IResult,
};

use super::{
    AxisOrder, Discriminator, SegmentedVolumeMaterial, VcfgError, VolcaniteParameters, Wrapping,
    MAX_COLOR_MAP_POINTS,
};
use crate::camera::camera_text;

const CAMERA_MARKER: &str = "[Camera]";

fn token(s: &str) -> IResult<&str, &str> {
    preceded(multispace0, is_not(" \t\r\n"))(s)
}

fn integer(s: &str) -> IResult<&str, i32> {
    preceded(multispace0, int)(s)
}

fn count_value(s: &str) -> IResult<&str, u32> {
    preceded(multispace0, uint)(s)
}

fn real(s: &str) -> IResult<&str, f32> {
    preceded(multispace0, float)(s)
}

fn real_pair(s: &str) -> IResult<&str, [f32; 2]> {
    let (s, (a, b)) = pair(real, real)(s)?;
    Ok((s, [a, b]))
}

/// Splits off one line without its terminator.
fn line(s: &str) -> (&str, &str) {
    let res: IResult<&str, &str> = not_line_ending(s);
    let (rest, line) = res.unwrap_or(("", s));
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    (rest, line)
}

/// Run one field parser, naming the field on failure.
fn field<'a, O, P>(s: &'a str, mut parser: P, what: &str) -> Result<(&'a str, O), String>
where
    P: FnMut(&'a str) -> IResult<&'a str, O>,
{
    parser(s).map_err(|_| format!("missing or malformed {what}"))
}

fn material(s: &str) -> Result<(&str, SegmentedVolumeMaterial), String> {
    let (s, name) = field(s, token, "name")?;
    let name = match name {
        "#" => String::new(),
        other => other.chars().take(1).collect(),
    };

    let (s, discr) = field(s, integer, "discriminator attribute")?;
    let discr_attribute = Discriminator::try_from(discr)?;
    let (s, discr_interval) = field(s, real_pair, "discriminator interval")?;
    let (s, tf_attribute) = field(s, integer, "transfer function attribute")?;
    let (s, tf_min_max) = field(s, real_pair, "transfer function range")?;
    let (s, opacity) = field(s, real, "opacity")?;
    let (s, emission) = field(s, real, "emission")?;
    let (s, wrapping) = field(s, integer, "wrapping")?;
    let wrapping = Wrapping::try_from(wrapping)?;

    let (s, point_count) = field(s, count_value, "color map control point count")?;
    let point_count = point_count as usize;
    if point_count > MAX_COLOR_MAP_POINTS {
        return Err(format!(
            "Invalid color map control point count {point_count}"
        ));
    }
    let (s, points) = field(
        s,
        count(tuple((real, real, real)), point_count),
        "color map control points",
    )?;
    let color_map = points
        .into_iter()
        .map(|(r, g, b)| vector![r, g, b])
        .collect();

    let (s, precomputed_index) = field(s, integer, "precomputed color map index")?;
    let (s, map_type) = field(s, integer, "color map type")?;
    if !(0..=3).contains(&map_type) {
        return Err(format!("Unsupported color map type {map_type}"));
    }

    Ok((
        s,
        SegmentedVolumeMaterial {
            name,
            discr_attribute,
            discr_interval,
            tf_attribute,
            tf_min_max,
            opacity,
            emission,
            wrapping,
            color_map,
            precomputed_index,
            color_map_type: map_type as u8,
        },
    ))
}

fn materials(s: &str) -> Result<Vec<SegmentedVolumeMaterial>, String> {
    let (mut s, mat_count) = field(s, count_value, "material count")?;
    let mut materials = Vec::with_capacity((mat_count as usize).min(1024));
    for _ in 0..mat_count {
        let (rest, mat) = material(s)?;
        materials.push(mat);
        s = rest;
    }
    Ok(materials)
}

fn flip(s: &str) -> Result<bool, String> {
    let (_, value) = field(s, integer, "axis flip")?;
    Ok(value != 0)
}

/// Applies one labelled line. Returns false for unknown labels.
fn parameter(
    label: &str,
    rest: &str,
    params: &mut VolcaniteParameters,
) -> Result<bool, VcfgError> {
    let (known, res): (&'static str, Result<(), String>) = match label {
        "Materials:" => (
            "Materials:",
            materials(rest).map(|m| {
                params.materials = m;
                info!("successfully imported {} materials", params.materials.len());
            }),
        ),
        "Axis_Order:" => (
            "Axis_Order:",
            field(rest, token, "axis order")
                .and_then(|(_, t)| t.parse::<AxisOrder>())
                .map(|order| params.axis_order = order),
        ),
        "X_Axis:" => ("X_Axis:", flip(rest).map(|f| params.axis_flip[0] = f)),
        "Y_Axis:" => ("Y_Axis:", flip(rest).map(|f| params.axis_flip[1] = f)),
        "Z_Axis:" => ("Z_Axis:", flip(rest).map(|f| params.axis_flip[2] = f)),
        "Axis_Scale:" => (
            "Axis_Scale:",
            field(rest, tuple((real, real, real)), "axis scale")
                .map(|(_, (x, y, z))| params.axis_scale = vector![x, y, z]),
        ),
        "Split_Plane_X:" => (
            "Split_Plane_X:",
            field(rest, real_pair, "split plane").map(|(_, p)| params.split_planes[0] = p),
        ),
        "Split_Plane_Y:" => (
            "Split_Plane_Y:",
            field(rest, real_pair, "split plane").map(|(_, p)| params.split_planes[1] = p),
        ),
        "Split_Plane_Z:" => (
            "Split_Plane_Z:",
            field(rest, real_pair, "split plane").map(|(_, p)| params.split_planes[2] = p),
        ),
        _ => return Ok(false),
    };

    res.map(|_| true)
        .map_err(|reason| VcfgError::Parameter {
            label: known,
            reason,
        })
}

/// Parses the whole content of a vcfg file.
///
/// Starts from default parameters, every recognised line overwrites its part.
pub fn read_parameters(text: &str) -> Result<VolcaniteParameters, VcfgError> {
    let mut params = VolcaniteParameters::default();

    let (mut input, _version) =
        pair(token, token)(text).map_err(|_: nom::Err<nom::error::Error<&str>>| {
            VcfgError::MissingVersion
        })?;

    while !input.is_empty() {
        let (rest, current) = line(input);
        input = rest;

        let trimmed = current.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed == CAMERA_MARKER {
            let (rest, state) = camera_text(input).map_err(|_| VcfgError::Camera)?;
            state.apply_to(&mut params.camera);
            info!("successfully imported camera");
            input = rest;
            continue;
        }

        // the line is not blank, there is a label
        let (remainder, label) = match token(current) {
            Ok(res) => res,
            Err(_) => continue,
        };
        if !parameter(label, remainder, &mut params)? {
            debug!("Skipping unknown parameter {label}");
        }
    }

    Ok(params)
}
