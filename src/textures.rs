//! Backgrounds seen by rays that leave the scene

use std::f64::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{io::Reader as ImageReader, RgbImage};

use crate::{error::RenderError, Color, Vec3};

/// Color of a ray that escaped the scene, by direction
pub trait Background: Send + Sync {
    fn sample(&self, dir: &Vec3) -> Color;
}

/// Solid Color
#[derive(Debug, Clone)]
pub struct SolidColor {
    color_value: Color,
}
impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color_value: color }
    }
}
impl Background for SolidColor {
    fn sample(&self, _dir: &Vec3) -> Color {
        self.color_value
    }
}

/// Equirectangular environment map
///
/// Longitude runs across the image width and latitude (from +y down) across its height.
/// Lookups take the nearest texel; there is no filtering.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    image: RgbImage,
}
impl EnvironmentMap {
    pub fn new(image: RgbImage) -> Result<Self, RenderError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::EmptyBackground);
        }
        Ok(Self { image })
    }

    /// Open and decode an image file, format guessed from its contents
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let file = File::open(path).map_err(|source| RenderError::OpenBackground {
            path: path.to_path_buf(),
            source,
        })?;
        let image = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(|source| RenderError::OpenBackground {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| RenderError::DecodeBackground {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel coordinates of the texel seen along `dir`
    fn texel(&self, dir: &Vec3) -> (u32, u32) {
        let dir = dir.normalize();
        let (w, h) = (self.image.width(), self.image.height());

        let u = dir[2].atan2(dir[0]) / (2.0 * PI) + 0.5;
        let v = dir[1].clamp(-1.0, 1.0).acos() / PI;

        // u == 1 and v == 1 land one past the last texel
        let x = ((u * w as f64) as u32).min(w - 1);
        let y = ((v * h as f64) as u32).min(h - 1);
        (x, y)
    }
}
impl Background for EnvironmentMap {
    fn sample(&self, dir: &Vec3) -> Color {
        let (x, y) = self.texel(dir);
        let p = self.image.get_pixel(x, y);
        Color::new(p[0] as f64, p[1] as f64, p[2] as f64) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// 4x2 map: top row red, bottom row blue, with a green marker in the top-left texel
    fn test_map() -> EnvironmentMap {
        let image = RgbImage::from_fn(4, 2, |x, y| match (x, y) {
            (0, 0) => Rgb([0, 255, 0]),
            (_, 0) => Rgb([255, 0, 0]),
            _ => Rgb([0, 0, 255]),
        });
        EnvironmentMap::new(image).unwrap()
    }

    #[test]
    fn test_up_and_down() {
        let map = test_map();
        assert_eq!(map.sample(&Vec3::new(0.1, 1.0, 0.3)), Color::new(1.0, 0.0, 0.0));
        assert_eq!(map.sample(&Vec3::new(0.0, -1.0, 0.0)), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_longitude() {
        let map = test_map();
        // atan2(z, x) = -pi/2 + small, u just above 0.25 -> column 1
        assert_eq!(map.texel(&Vec3::new(0.01, 0.5, -1.0)), (1, 0));
        // atan2(0, 1) = 0, u = 0.5 -> column 2
        assert_eq!(map.texel(&Vec3::new(1.0, 0.5, 0.0)), (2, 0));
        // atan2(-0.01, -1) ~ -pi, u ~ 0 -> column 0 (the marker)
        assert_eq!(
            map.sample(&Vec3::new(-1.0, 0.5, -0.01)),
            Color::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_unnormalized_direction() {
        let map = test_map();
        assert_eq!(
            map.texel(&Vec3::new(10.0, 5.0, 0.0)),
            map.texel(&Vec3::new(1.0, 0.5, 0.0))
        );
    }

    #[test]
    fn test_edges_stay_in_bounds() {
        let map = test_map();
        // atan2(+0, -1) = pi, u = 1.0
        let (x, y) = map.texel(&Vec3::new(-1.0, -1e-12, 0.0));
        assert!(x < 4 && y < 2);
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            EnvironmentMap::new(RgbImage::new(0, 0)),
            Err(RenderError::EmptyBackground)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = EnvironmentMap::open(Path::new("does/not/exist.jpg")).unwrap_err();
        assert!(matches!(err, RenderError::OpenBackground { .. }));
    }

    #[test]
    fn test_solid_color() {
        let bg = SolidColor::new(Color::new(0.2, 0.7, 0.8));
        assert_eq!(bg.sample(&Vec3::new(0.0, 0.0, -1.0)), Color::new(0.2, 0.7, 0.8));
    }
}
