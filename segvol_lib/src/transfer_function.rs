//! # Transfer function
//!
//! Opacity and color control points for a segmentation volume.
//! Every visible label interval becomes a rectangular opacity pulse,
//! colors are scattered over the hue circle by hashing the label.

use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

use log::debug;
use thiserror::Error;

use crate::{
    color::{self, RGB, RGBA},
    common::{Interval, LabelRange},
};

/// Size of the control point domain in normalized mode
pub const TF_SIZE: u32 = (1 << 16) - 1;

/// Opacity of visible labels
pub const OPACITY_ON: f64 = f32::MAX as f64;

/// Most labels that get a color point
pub const COLOR_ENTRIES: u32 = 256;

/// Label spans up to this size count as low cardinality in native mode
pub const LOW_CARDINALITY: u32 = 256;

/// Offset of the end of a single label pulse in native mode
pub const SINGLE_LABEL_OFFSET: f64 = 0.9;

/// Fast integer hash (PCG output permutation).
pub fn pcg_hash(v: u32) -> u32 {
    let state = v.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

/// Hue assigned to a label
pub fn label_hue(label: u32) -> f64 {
    ((pcg_hash(label) >> 2) % 256) as f64 / 255.0
}

#[derive(Error, Debug)]
pub enum TransferFunctionError {
    #[error("Volume contains no labels")]
    NoLabels,

    #[error("All voxels have label {0}, normalized range is empty")]
    EmptyLabelRange(u32),
}

/// Domain of the control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TfMode {
    /// Labels rescaled from `<label_min;label_max>` to `<0;TF_SIZE>`
    #[default]
    Normalized,
    /// Labels used as they are
    Native,
}

impl FromStr for TfMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normalized" => Ok(TfMode::Normalized),
            "native" => Ok(TfMode::Native),
            other => Err(format!("Unknown transfer function mode {other}")),
        }
    }
}

impl fmt::Display for TfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TfMode::Normalized => write!(f, "normalized"),
            TfMode::Native => write!(f, "native"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityPoint {
    pub x: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvPoint {
    pub x: f64,
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl HsvPoint {
    pub fn rgb(&self) -> RGB {
        color::hsv_to_rgb(self.h as f32, self.s as f32, self.v as f32)
    }
}

/// Piecewise linear transfer function.
///
/// Points are sorted by `x`. Several points may share `x` to form a step,
/// between them the later point wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub mode: TfMode,
    pub opacity: Vec<OpacityPoint>,
    pub color: Vec<HsvPoint>,
}

impl TransferFunction {
    /// Build control points for merged `intervals` of a volume with labels in `labels`.
    pub fn build(
        intervals: &[Interval],
        labels: LabelRange,
        mode: TfMode,
    ) -> Result<TransferFunction, TransferFunctionError> {
        if labels.is_empty() {
            return Err(TransferFunctionError::NoLabels);
        }

        let color = (0..COLOR_ENTRIES.min(labels.high))
            .map(|x| HsvPoint {
                x: x as f64,
                h: label_hue(x),
                s: 1.0,
                v: 1.0,
            })
            .collect();

        let opacity = match mode {
            TfMode::Normalized => normalized_opacity(intervals, labels)?,
            TfMode::Native => native_opacity(intervals, labels),
        };

        Ok(TransferFunction {
            mode,
            opacity,
            color,
        })
    }

    /// Opacity at `x`, clamped to the outermost points.
    pub fn opacity_at(&self, x: f64) -> f64 {
        interpolate(
            &self.opacity,
            x,
            |p| p.x,
            |p| p.opacity,
            |a, b, t| a + (b - a) * t,
        )
        .unwrap_or(0.0)
    }

    /// Color at `x`, interpolated in RGB.
    pub fn color_at(&self, x: f64) -> RGB {
        interpolate(
            &self.color,
            x,
            |p| p.x,
            HsvPoint::rgb,
            |a, b, t| a + (b - a) * t as f32,
        )
        .unwrap_or_else(RGB::zeros)
    }

    /// Color and opacity at `x`, opacity saturated to 1.
    pub fn rgba_at(&self, x: f64) -> RGBA {
        let rgb = self.color_at(x);
        let alpha = self.opacity_at(x).clamp(0.0, 1.0) as f32;
        color::new(rgb.x, rgb.y, rgb.z, alpha)
    }

    /// Dump all control points, opacity first.
    pub fn write_csv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "kind,x,opacity,h,s,v")?;
        for p in &self.opacity {
            writeln!(out, "opacity,{},{},,,", p.x, p.opacity)?;
        }
        for p in &self.color {
            writeln!(out, "color,{},,{},{},{}", p.x, p.h, p.s, p.v)?;
        }
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_csv(&mut out)?;
        out.flush()
    }
}

fn step(points: &mut Vec<OpacityPoint>, start: f64, end: f64) {
    points.push(OpacityPoint {
        x: start,
        opacity: 0.0,
    });
    points.push(OpacityPoint {
        x: start,
        opacity: OPACITY_ON,
    });
    points.push(OpacityPoint {
        x: end,
        opacity: OPACITY_ON,
    });
    points.push(OpacityPoint {
        x: end,
        opacity: 0.0,
    });
}

fn sort_points(points: &mut [OpacityPoint]) {
    // stable, keeps the order of steps
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
}

fn normalized_opacity(
    intervals: &[Interval],
    labels: LabelRange,
) -> Result<Vec<OpacityPoint>, TransferFunctionError> {
    if labels.span() == 0 {
        return Err(TransferFunctionError::EmptyLabelRange(labels.low));
    }

    let size = TF_SIZE as f64;
    let low = labels.low as f64;
    let span = labels.span() as f64;

    let mut points = Vec::with_capacity(2 + 4 * intervals.len());
    points.push(OpacityPoint {
        x: 0.0,
        opacity: 0.0,
    });
    points.push(OpacityPoint {
        x: size,
        opacity: 0.0,
    });

    for i in intervals {
        let start = (i.start as f64 - low) / span;
        let end = (i.end as f64 + 1.0 - low) / span;
        debug!("Interval [{start},{end}]");

        step(&mut points, (start * size).round(), (end * size).round());
    }

    sort_points(&mut points);
    Ok(points)
}

fn native_opacity(intervals: &[Interval], labels: LabelRange) -> Vec<OpacityPoint> {
    let low_cardinality = labels.span() <= LOW_CARDINALITY;

    let mut points = Vec::with_capacity(2 + 4 * intervals.len());
    points.push(OpacityPoint {
        x: labels.low as f64,
        opacity: 0.0,
    });
    points.push(OpacityPoint {
        x: labels.high as f64,
        opacity: 0.0,
    });

    for i in intervals {
        let start = i.start as f64;
        let end = if i.is_single() && low_cardinality {
            i.end as f64 + SINGLE_LABEL_OFFSET
        } else {
            i.end as f64
        };
        debug!("Interval [{start},{end}]");

        step(&mut points, start, end);
    }

    sort_points(&mut points);
    points
}

/// Piecewise linear lookup. The last point with `x <= at` starts the segment.
fn interpolate<P, V, FX, FV, L>(points: &[P], at: f64, x: FX, value: FV, lerp: L) -> Option<V>
where
    FX: Fn(&P) -> f64,
    FV: Fn(&P) -> V,
    L: Fn(V, V, f64) -> V,
{
    let first = points.first()?;
    let idx = points.partition_point(|p| x(p) <= at);
    if idx == 0 {
        return Some(value(first));
    }
    if idx == points.len() {
        return points.last().map(value);
    }

    let (a, b) = (&points[idx - 1], &points[idx]);
    let t = (at - x(a)) / (x(b) - x(a));
    Some(lerp(value(a), value(b), t))
}

#[cfg(test)]
mod test {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pcg_reference_values() {
        assert_eq!(pcg_hash(0), 129708002);
        assert_eq!(pcg_hash(1), 2831084092);
        assert_eq!(pcg_hash(2), 2055130248);
        assert_eq!(pcg_hash(1), pcg_hash(1));
    }

    #[test]
    fn hues() {
        assert_relative_eq!(label_hue(0), 248.0 / 255.0);
        assert_relative_eq!(label_hue(1), 143.0 / 255.0);
    }

    #[test]
    fn normalized_steps() {
        let intervals = [Interval::new(10, 20)];
        let labels = LabelRange::from(0..=100);
        let tf = TransferFunction::build(&intervals, labels, TfMode::Normalized).unwrap();

        let start = (0.1 * TF_SIZE as f64).round();
        let end = (0.21 * TF_SIZE as f64).round();
        let xs: Vec<f64> = tf.opacity.iter().map(|p| p.x).collect();
        let values: Vec<f64> = tf.opacity.iter().map(|p| p.opacity).collect();

        assert_eq!(xs, [0.0, start, start, end, end, TF_SIZE as f64]);
        assert_eq!(values, [0.0, 0.0, OPACITY_ON, OPACITY_ON, 0.0, 0.0]);
    }

    #[test]
    fn normalized_requires_label_span() {
        let res = TransferFunction::build(
            &[Interval::new(3, 3)],
            LabelRange::seed(3),
            TfMode::Normalized,
        );
        assert!(matches!(
            res,
            Err(TransferFunctionError::EmptyLabelRange(3))
        ));

        let res = TransferFunction::build(&[], LabelRange::empty(), TfMode::Native);
        assert!(matches!(res, Err(TransferFunctionError::NoLabels)));
    }

    #[test]
    fn native_single_label_offset() {
        let intervals = [Interval::new(5, 5), Interval::new(8, 12)];
        let labels = LabelRange::from(0..=40);
        let tf = TransferFunction::build(&intervals, labels, TfMode::Native).unwrap();

        let on_at = |x: f64| tf.opacity.iter().any(|p| p.x == x && p.opacity > 0.0);
        assert!(on_at(5.0 + SINGLE_LABEL_OFFSET));
        assert!(on_at(12.0));

        assert_eq!(tf.opacity_at(5.5), OPACITY_ON);
        assert_eq!(tf.opacity_at(4.0), 0.0);
        assert_eq!(tf.opacity_at(6.0), 0.0);
    }

    #[test]
    fn native_no_offset_for_many_labels() {
        let intervals = [Interval::new(500, 500)];
        let labels = LabelRange::from(0..=1000);
        let tf = TransferFunction::build(&intervals, labels, TfMode::Native).unwrap();

        assert!(tf.opacity.iter().all(|p| p.x.fract() == 0.0));
    }

    #[test]
    fn points_sorted() {
        let intervals = [
            Interval::new(1, 2),
            Interval::new(30, 31),
            Interval::new(60, 90),
        ];
        for mode in [TfMode::Normalized, TfMode::Native] {
            let tf = TransferFunction::build(&intervals, LabelRange::from(0..=99), mode).unwrap();
            assert!(tf.opacity.windows(2).all(|w| w[0].x <= w[1].x));
        }
    }

    #[test]
    fn color_entries() {
        let labels = LabelRange::from(0..=10);
        let tf = TransferFunction::build(&[], labels, TfMode::Native).unwrap();
        assert_eq!(tf.color.len(), 10);

        let labels = LabelRange::from(0..=5000);
        let tf = TransferFunction::build(&[], labels, TfMode::Native).unwrap();
        assert_eq!(tf.color.len(), COLOR_ENTRIES as usize);
        assert_eq!(tf.color[7].h, label_hue(7));
        assert_eq!(tf.color[7].x, 7.0);
    }

    #[test]
    fn rgba_lookup() {
        let labels = LabelRange::from(0..=10);
        let tf = TransferFunction::build(&[Interval::new(2, 2)], labels, TfMode::Native).unwrap();

        let rgba = tf.rgba_at(2.0);
        let expected = tf.color[2].rgb();
        assert_relative_eq!(rgba.x, expected.x);
        assert_relative_eq!(rgba.y, expected.y);
        assert_relative_eq!(rgba.z, expected.z);
        assert_eq!(rgba.w, 1.0);

        assert_eq!(tf.rgba_at(0.0).w, 0.0);
    }

    #[test]
    fn csv_dump() {
        let labels = LabelRange::from(0..=2);
        let tf = TransferFunction::build(&[Interval::new(2, 3)], labels, TfMode::Native).unwrap();
        let mut buf = vec![];
        tf.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("kind,x,opacity,h,s,v"));
        assert_eq!(lines.next(), Some("opacity,0,0,,,"));
        assert_eq!(
            text.lines().filter(|l| l.starts_with("opacity")).count(),
            tf.opacity.len()
        );
        assert_eq!(text.lines().filter(|l| l.starts_with("color")).count(), 2);
    }

    #[test]
    fn mode_names() {
        assert_eq!("native".parse::<TfMode>().unwrap(), TfMode::Native);
        assert_eq!(TfMode::Normalized.to_string(), "normalized");
        assert!("linear".parse::<TfMode>().is_err());
    }
}
