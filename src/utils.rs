//! Utils

use image::Rgba;
use serde::{Deserialize, Serialize};

use super::{Color, Vec3};

/// Reflect `v` about the unit normal `n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    *v - 2.0 * v.dot(n) * *n
}

/// Refract the unit vector `v` through a surface with unit normal `n` (Snell's law)
///
/// The medium on the far side of `n` has index 1.0. When `v` starts inside the surface the
/// normal is flipped and the indices swapped. Total internal reflection yields the zero vector,
/// which must not be normalized.
pub fn refract(v: &Vec3, n: &Vec3, refractive_index: f64) -> Vec3 {
    let mut cos_i = -v.dot(n).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, refractive_index);
    let mut normal = *n;
    if cos_i < 0.0 {
        // The ray is inside the object
        cos_i = -cos_i;
        std::mem::swap(&mut eta_i, &mut eta_t);
        normal = -normal;
    }
    let eta = eta_i / eta_t;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::zeros()
    } else {
        eta * *v + (eta * cos_i - k.sqrt()) * normal
    }
}

/// Quantize a color to an opaque 8-bit pixel
///
/// Colors brighter than 1.0 in any channel are scaled down uniformly so the brightest channel
/// lands on 1.0, which keeps the hue.
pub fn get_pixel(color: &Color) -> Rgba<u8> {
    let max = color[0].max(color[1]).max(color[2]);
    let color = if max > 1.0 { *color / max } else { *color };

    Rgba([
        scale_color(color[0]),
        scale_color(color[1]),
        scale_color(color[2]),
        255,
    ])
}

/// scale the color to between 0 and 255
fn scale_color(val: f64) -> u8 {
    // `as` truncates and saturates, so negatives and NaN land on 0
    (255.0 * val) as u8
}

/// Vector as it appears in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerdeVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl SerdeVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}
impl From<Vec3> for SerdeVector {
    fn from(v: Vec3) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}
