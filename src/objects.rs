//! Objects
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::RenderError,
    materials::{Material, MaterialConfig},
    utils::SerdeVector,
    Point, Ray, Vec3,
};

pub trait Hittable {
    /// Nearest intersection in front of the ray origin
    fn try_hit(&self, ray: &Ray) -> Option<HitRecord<'_>>;
}

/// Represents a hit
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point,
    /// Outward unit normal
    pub normal: Vec3,
    /// Distance along the ray
    pub t: f64,
    pub material: &'a Material,
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    pub material: Arc<Material>,
}
impl Sphere {
    pub fn new(center: Point, radius: f64, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn from_config(
        config: &SphereConfig,
        materials: &HashMap<String, Arc<Material>>,
    ) -> Result<Self, RenderError> {
        if config.radius <= 0.0 {
            return Err(RenderError::InvalidScene(format!(
                "sphere at {:?} has non-positive radius {}",
                config.center, config.radius
            )));
        }
        let material = materials
            .get(&config.material)
            .ok_or_else(|| RenderError::UnknownMaterial(config.material.clone()))?;
        Ok(Self::new(
            config.center.into(),
            config.radius,
            Arc::clone(material),
        ))
    }

    /// Distance to the nearest intersection ahead of the ray origin, if any
    ///
    /// Uses the geometric solution: project the center onto the ray, then step back and forth
    /// by the half chord. A ray starting inside the sphere hits the far side.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<f64> {
        let l = self.center - ray.orig;
        let tca = l.dot(&ray.dir);
        let d2 = l.dot(&l) - tca * tca;
        let r2 = self.radius * self.radius;
        if d2 > r2 {
            return None;
        }
        let thc = (r2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }
}
impl Hittable for Sphere {
    fn try_hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let t = self.ray_intersect(ray)?;
        let p = ray.get(t);
        Some(HitRecord {
            p,
            normal: (p - self.center).normalize(),
            t,
            material: &self.material,
        })
    }
}

/// Sphere config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
    /// Name of an entry in the scene's material table
    pub material: String,
}

/// Checkerboard floor
///
/// A horizontal rectangle at `height`, bounded to `|x| < half_width` and `z_far < z < z_near`.
#[derive(Debug, Clone)]
pub struct Checkerboard {
    pub height: f64,
    pub half_width: f64,
    pub z_near: f64,
    pub z_far: f64,
    pub light: Material,
    pub dark: Material,
}
impl Default for Checkerboard {
    fn default() -> Self {
        Self {
            height: -4.0,
            half_width: 10.0,
            z_near: -10.0,
            z_far: -30.0,
            light: Material::checker_light(),
            dark: Material::checker_dark(),
        }
    }
}
impl Checkerboard {
    /// Rays this close to parallel with the floor never hit it
    const PARALLEL_EPSILON: f64 = 1e-3;

    pub fn from_config(config: &CheckerboardConfig) -> Result<Self, RenderError> {
        Ok(Self {
            height: config.height,
            half_width: config.half_width,
            z_near: config.z_near,
            z_far: config.z_far,
            light: Material::from_config("floor light", &config.light)?,
            dark: Material::from_config("floor dark", &config.dark)?,
        })
    }

    /// Tile material at a point on the floor
    ///
    /// Tiles are two units square. The x offset keeps the floor index positive so the pattern
    /// does not mirror around x = 0.
    pub fn material_at(&self, p: &Point) -> &Material {
        let parity = ((0.5 * p[0] + 1000.0).floor() + (0.5 * p[2]).floor()) as i64;
        if parity & 1 == 1 {
            &self.light
        } else {
            &self.dark
        }
    }
}
impl Hittable for Checkerboard {
    fn try_hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        if ray.dir[1].abs() <= Self::PARALLEL_EPSILON {
            return None;
        }
        let t = (self.height - ray.orig[1]) / ray.dir[1];
        if t <= 0.0 {
            return None;
        }
        let p = ray.get(t);
        if p[0].abs() >= self.half_width || p[2] >= self.z_near || p[2] <= self.z_far {
            return None;
        }
        Some(HitRecord {
            p,
            normal: Vec3::new(0.0, 1.0, 0.0),
            t,
            material: self.material_at(&p),
        })
    }
}

/// Checkerboard config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerboardConfig {
    pub height: f64,
    pub half_width: f64,
    pub z_near: f64,
    pub z_far: f64,
    pub light: MaterialConfig,
    pub dark: MaterialConfig,
}
impl Default for CheckerboardConfig {
    fn default() -> Self {
        let floor = Checkerboard::default();
        Self {
            height: floor.height,
            half_width: floor.half_width,
            z_near: floor.z_near,
            z_far: floor.z_far,
            light: MaterialConfig::from(&floor.light),
            dark: MaterialConfig::from(&floor.dark),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(center: Point, radius: f64) -> Sphere {
        Sphere::new(center, radius, Arc::new(Material::ivory()))
    }

    #[test]
    fn test_sphere_hit_straight_on() {
        let s = sphere(Point::new(0.0, 0.0, 0.0), 1.0);
        let ray = Ray::new(Point::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = s.ray_intersect(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_distance_is_center_minus_radius() {
        let s = sphere(Point::new(3.0, -2.0, -7.0), 1.5);
        let orig = Point::new(1.0, 1.0, 1.0);
        let to_center = s.center - orig;
        let ray = Ray::new(orig, to_center.normalize());
        let t = s.ray_intersect(&ray).unwrap();
        assert!((t - (to_center.norm() - 1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_miss() {
        let s = sphere(Point::new(0.0, 0.0, -10.0), 1.0);
        // Closest approach is 2 units from the center
        let ray = Ray::new(Point::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(s.ray_intersect(&ray).is_none());
        assert!(s.try_hit(&ray).is_none());
    }

    #[test]
    fn test_sphere_behind_ray() {
        let s = sphere(Point::new(0.0, 0.0, 10.0), 1.0);
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(s.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_from_inside_hits_far_side() {
        let s = sphere(Point::new(0.0, 0.0, 0.0), 2.0);
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let hr = s.try_hit(&ray).unwrap();
        assert!((hr.t - 2.0).abs() < 1e-12);
        assert!((hr.normal - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_sphere_unknown_material() {
        let cfg = SphereConfig {
            center: SerdeVector::new(0.0, 0.0, -5.0),
            radius: 1.0,
            material: "chrome".to_string(),
        };
        let err = Sphere::from_config(&cfg, &HashMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownMaterial(name) if name == "chrome"));
    }

    #[test]
    fn test_checkerboard_alternates_along_x() {
        let floor = Checkerboard::default();
        let z = -15.0;
        let a = floor.material_at(&Point::new(0.5, -4.0, z));
        let b = floor.material_at(&Point::new(2.5, -4.0, z));
        let c = floor.material_at(&Point::new(4.5, -4.0, z));
        assert_ne!(a, b);
        assert_eq!(a, c);
        // and across x = 0
        let d = floor.material_at(&Point::new(-1.5, -4.0, z));
        assert_ne!(a, d);
    }

    #[test]
    fn test_checkerboard_hit() {
        let floor = Checkerboard::default();
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, -4.0, -20.0).normalize());
        let hr = floor.try_hit(&ray).unwrap();
        assert!((hr.p[1] + 4.0).abs() < 1e-9);
        assert!((hr.p[2] + 20.0).abs() < 1e-9);
        assert_eq!(hr.normal, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_checkerboard_bounds_and_parallel() {
        let floor = Checkerboard::default();
        // Lands at z = -5, in front of the near edge
        let near = Ray::new(Point::zeros(), Vec3::new(0.0, -4.0, -5.0).normalize());
        assert!(floor.try_hit(&near).is_none());
        // Lands at x = 12
        let wide = Ray::new(Point::zeros(), Vec3::new(12.0, -4.0, -20.0).normalize());
        assert!(floor.try_hit(&wide).is_none());
        // Almost parallel
        let flat = Ray::new(Point::zeros(), Vec3::new(0.0, -1e-4, -1.0).normalize());
        assert!(floor.try_hit(&flat).is_none());
        // Looking up, away from the floor
        let up = Ray::new(Point::zeros(), Vec3::new(0.0, 1.0, -5.0).normalize());
        assert!(floor.try_hit(&up).is_none());
    }
}
