//! Scene description and nearest-hit search
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::RenderError,
    materials::{Material, MaterialConfig},
    objects::{Checkerboard, CheckerboardConfig, HitRecord, Hittable, Sphere, SphereConfig},
    utils::SerdeVector,
    Point, Ray,
};

/// Point light without distance falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Point,
    pub intensity: f64,
}
impl Light {
    pub fn new(position: Point, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// Light config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: SerdeVector,
    pub intensity: f64,
}

/// Everything a render needs to know about the world. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub floor: Option<Checkerboard>,
    pub lights: Vec<Light>,
}
impl Scene {
    /// Hits at or beyond this distance count as escaping the scene
    pub const FAR_PLANE: f64 = 1000.0;

    pub fn new(spheres: Vec<Sphere>, floor: Option<Checkerboard>, lights: Vec<Light>) -> Self {
        Self {
            spheres,
            floor,
            lights,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Result<Self, RenderError> {
        let mut materials = HashMap::with_capacity(config.materials.len());
        for (name, material_cfg) in &config.materials {
            let material = Material::from_config(name, material_cfg)?;
            materials.insert(name.clone(), Arc::new(material));
        }

        let spheres = config
            .spheres
            .iter()
            .map(|cfg| Sphere::from_config(cfg, &materials))
            .collect::<Result<Vec<_>, _>>()?;

        let floor = config
            .floor
            .as_ref()
            .map(Checkerboard::from_config)
            .transpose()?;

        let mut lights = Vec::with_capacity(config.lights.len());
        for cfg in &config.lights {
            if cfg.intensity < 0.0 {
                return Err(RenderError::InvalidScene(format!(
                    "light at {:?} has negative intensity {}",
                    cfg.position, cfg.intensity
                )));
            }
            lights.push(Light::new(cfg.position.into(), cfg.intensity));
        }

        debug!(
            "Built scene with {} spheres, {} lights, floor: {}",
            spheres.len(),
            lights.len(),
            floor.is_some()
        );
        Ok(Self::new(spheres, floor, lights))
    }

    /// Nearest hit among the spheres and the floor, closer than [`Scene::FAR_PLANE`]
    ///
    /// Spheres are scanned in order, so on an exact tie the earlier sphere wins.
    pub fn intersect(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let mut closest_so_far = Self::FAR_PLANE;
        let mut hr_final = None;

        for sphere in &self.spheres {
            if let Some(hr) = sphere.try_hit(ray) {
                if hr.t < closest_so_far {
                    closest_so_far = hr.t;
                    hr_final = Some(hr);
                }
            }
        }

        if let Some(floor_hr) = self.floor.as_ref().and_then(|floor| floor.try_hit(ray)) {
            if floor_hr.t < closest_so_far {
                hr_final = Some(floor_hr);
            }
        }
        hr_final
    }
}

/// Scene config
///
/// Spheres refer to materials by name so several can share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialConfig>,
    #[serde(default)]
    pub spheres: Vec<SphereConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
    #[serde(default = "default_floor")]
    pub floor: Option<CheckerboardConfig>,
}
impl Default for SceneConfig {
    /// Demo scene: four spheres (ivory, glass, red rubber, mirror) over the checkerboard, lit by
    /// three lights
    fn default() -> Self {
        let materials = [
            ("ivory", Material::ivory()),
            ("glass", Material::glass()),
            ("red_rubber", Material::red_rubber()),
            ("mirror", Material::mirror()),
        ]
        .iter()
        .map(|(name, m)| (name.to_string(), MaterialConfig::from(m)))
        .collect();

        let sphere = |x: f64, y: f64, z: f64, radius: f64, material: &str| SphereConfig {
            center: SerdeVector::new(x, y, z),
            radius,
            material: material.to_string(),
        };
        let light = |x: f64, y: f64, z: f64, intensity: f64| LightConfig {
            position: SerdeVector::new(x, y, z),
            intensity,
        };

        Self {
            materials,
            spheres: vec![
                sphere(-3.0, 0.0, -16.0, 2.0, "ivory"),
                sphere(-1.0, -1.5, -12.0, 2.0, "glass"),
                sphere(1.5, -0.5, -18.0, 3.0, "red_rubber"),
                sphere(7.0, 5.0, -18.0, 4.0, "mirror"),
            ],
            lights: vec![
                light(-20.0, 20.0, 20.0, 1.5),
                light(30.0, 50.0, -25.0, 1.8),
                light(30.0, 20.0, 30.0, 1.7),
            ],
            floor: default_floor(),
        }
    }
}

fn default_floor() -> Option<CheckerboardConfig> {
    Some(CheckerboardConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn test_default_config_builds_demo_scene() {
        let scene = Scene::from_config(&SceneConfig::default()).unwrap();
        let centers: Vec<Point> = scene.spheres.iter().map(|s| s.center).collect();
        assert_eq!(
            centers,
            vec![
                Point::new(-3.0, 0.0, -16.0),
                Point::new(-1.0, -1.5, -12.0),
                Point::new(1.5, -0.5, -18.0),
                Point::new(7.0, 5.0, -18.0),
            ]
        );
        let materials: Vec<&Material> = scene.spheres.iter().map(|s| &*s.material).collect();
        assert_eq!(
            materials,
            vec![
                &Material::ivory(),
                &Material::glass(),
                &Material::red_rubber(),
                &Material::mirror()
            ]
        );
        assert_eq!(scene.lights.len(), 3);
        assert_eq!(scene.lights[1], Light::new(Point::new(30.0, 50.0, -25.0), 1.8));
        assert!(scene.floor.is_some());
    }

    #[test]
    fn test_spheres_share_materials() {
        let mut cfg = SceneConfig::default();
        cfg.spheres[2].material = "ivory".to_string();
        let scene = Scene::from_config(&cfg).unwrap();
        assert!(Arc::ptr_eq(
            &scene.spheres[0].material,
            &scene.spheres[2].material
        ));
    }

    #[test]
    fn test_intersect_picks_nearest_sphere() {
        let m = Arc::new(Material::ivory());
        let scene = Scene::new(
            vec![
                Sphere::new(Point::new(0.0, 0.0, -20.0), 1.0, Arc::clone(&m)),
                Sphere::new(Point::new(0.0, 0.0, -10.0), 1.0, Arc::clone(&m)),
            ],
            None,
            vec![],
        );
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0));
        let hr = scene.intersect(&ray).unwrap();
        assert!((hr.t - 9.0).abs() < 1e-12);
        assert!((hr.normal - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_intersect_floor_in_front_of_sphere() {
        let m = Arc::new(Material::red_rubber());
        let scene = Scene::new(
            vec![Sphere::new(Point::new(0.0, -20.0 / 3.0, -25.0), 1.0, m)],
            Some(Checkerboard::default()),
            vec![],
        );
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, -4.0, -15.0).normalize());
        let hr = scene.intersect(&ray).unwrap();
        assert_eq!(hr.normal, Vec3::new(0.0, 1.0, 0.0));
        assert!((hr.p[2] + 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersect_beyond_far_plane() {
        let m = Arc::new(Material::ivory());
        let scene = Scene::new(
            vec![Sphere::new(Point::new(0.0, 0.0, -2000.0), 10.0, m)],
            None,
            vec![],
        );
        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.intersect(&ray).is_none());
    }

    #[test]
    fn test_negative_intensity_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.lights[0].intensity = -1.0;
        assert!(matches!(
            Scene::from_config(&cfg),
            Err(RenderError::InvalidScene(_))
        ));
    }

    #[test]
    fn test_yaml_without_floor() {
        let yaml = r#"
materials:
  chalk:
    albedo: [1.0, 0.0, 0.0, 0.0]
    diffuse_color: {x: 0.9, y: 0.9, z: 0.9}
spheres:
  - center: {x: 0.0, y: 0.0, z: -5.0}
    radius: 1.0
    material: chalk
lights:
  - position: {x: 0.0, y: 10.0, z: 0.0}
    intensity: 1.0
floor: null
"#;
        let cfg: SceneConfig = serde_yaml::from_str(yaml).unwrap();
        let scene = Scene::from_config(&cfg).unwrap();
        assert_eq!(scene.spheres.len(), 1);
        assert!(scene.floor.is_none());
    }

    #[test]
    fn test_yaml_floor_defaults_on() {
        let cfg: SceneConfig = serde_yaml::from_str("spheres: []\n").unwrap();
        assert_eq!(cfg.floor, Some(CheckerboardConfig::default()));
    }
}
