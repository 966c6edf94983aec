//! Pinhole camera
use crate::{Point, Ray, Vec3};

/// Pinhole camera at the origin looking down -z, with +y up
///
/// The image plane sits far enough away that `height` pixels span the vertical field of view,
/// which keeps pixels square.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub width: usize,
    pub height: usize,
    /// Vertical field of view in radians
    pub fov: f64,
}
impl Camera {
    pub fn new(width: usize, height: usize, fov: f64) -> Self {
        Self { width, height, fov }
    }

    /// Unit direction through the center of pixel `(i, j)`, row `j = 0` at the top
    pub fn direction(&self, i: usize, j: usize) -> Vec3 {
        let (w, h) = (self.width as f64, self.height as f64);
        let x = (i as f64 + 0.5) - w / 2.0;
        let y = -(j as f64 + 0.5) + h / 2.0;
        let z = -h / (2.0 * (self.fov / 2.0).tan());
        Vec3::new(x, y, z).normalize()
    }

    pub fn get_ray(&self, i: usize, j: usize) -> Ray {
        Ray::new(Point::zeros(), self.direction(i, j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_center_looks_down_negative_z() {
        // Odd dimensions put a pixel center exactly on the axis
        let camera = Camera::new(5, 3, PI / 3.0);
        let dir = camera.direction(2, 1);
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_corners() {
        let camera = Camera::new(1024, 768, PI / 3.0);
        let top_left = camera.direction(0, 0);
        assert!(top_left[0] < 0.0 && top_left[1] > 0.0 && top_left[2] < 0.0);
        let bottom_right = camera.direction(1023, 767);
        assert!(bottom_right[0] > 0.0 && bottom_right[1] < 0.0);
        assert!((top_left.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_fov() {
        let camera = Camera::new(1, 1000, PI / 3.0);
        // Top pixel center is half a pixel inside the 30 degree half angle
        let top = camera.direction(0, 0);
        let angle = (top[1] / -top[2]).atan();
        assert!((angle - PI / 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_ray_from_origin() {
        let camera = Camera::new(8, 6, PI / 2.0);
        let ray = camera.get_ray(3, 4);
        assert_eq!(ray.orig, Point::zeros());
        assert_eq!(ray.dir, camera.direction(3, 4));
    }
}
