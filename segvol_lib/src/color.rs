use nalgebra::{vector, Vector3, Vector4};

pub type RGBA = Vector4<f32>;
pub type RGB = Vector3<f32>;

pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
    vector![r, g, b, a]
}

/// Hue, saturation and value in `<0;1>` to RGB in `<0;1>`.
/// Hue wraps around, `1.0` is red again.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> RGB {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 % 6 {
        0 => vector![v, t, p],
        1 => vector![q, v, p],
        2 => vector![p, v, t],
        3 => vector![p, q, v],
        4 => vector![t, p, v],
        _ => vector![v, p, q],
    }
}
