//! Recursive Whitted shading

use crate::{
    objects::HitRecord,
    scene::Scene,
    textures::Background,
    utils::{reflect, refract},
    Color, Point, Ray, Vec3,
};

/// Offset along the normal applied to secondary ray origins so they clear their own surface
pub const BIAS: f64 = 1e-3;

/// Default deepest level that is still shaded; rays spawned below it see the background
pub const MAX_DEPTH: u32 = 4;

/// Largest `max_depth` a render may be configured with. Every shaded hit spawns two rays, so work
/// doubles per level and the recursion runs on the band's stack.
pub const MAX_DEPTH_LIMIT: u32 = 16;

/// Number of `cast_ray` calls at each recursion depth
///
/// Slots run from depth 0 up to `max_depth + 1`, where rays terminate on the background. One
/// extra slot collects anything deeper, which should stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RayStats {
    calls: Vec<u64>,
}
impl RayStats {
    pub fn new(max_depth: u32) -> Self {
        Self {
            calls: vec![0; max_depth as usize + 3],
        }
    }

    fn record(&mut self, depth: u32) {
        let last = self.calls.len() - 1;
        self.calls[(depth as usize).min(last)] += 1;
    }

    /// Calls per depth, index = depth
    pub fn calls(&self) -> &[u64] {
        &self.calls
    }

    pub fn total(&self) -> u64 {
        self.calls.iter().sum()
    }

    /// Fold another band's counts into this one
    pub fn merge(&mut self, other: &RayStats) {
        if other.calls.len() > self.calls.len() {
            self.calls.resize(other.calls.len(), 0);
        }
        for (mine, theirs) in self.calls.iter_mut().zip(&other.calls) {
            *mine += theirs;
        }
    }
}

/// Shades rays against a scene
///
/// Borrows the scene and background, so one tracer can be shared by every render band.
pub struct Tracer<'a> {
    scene: &'a Scene,
    background: &'a dyn Background,
    max_depth: u32,
}
impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, background: &'a dyn Background, max_depth: u32) -> Self {
        Self {
            scene,
            background,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Color seen along `ray`
    ///
    /// Above `max_depth`, or when nothing is hit, the background is returned. Otherwise the
    /// result is the material-weighted sum of diffuse and specular light from every visible
    /// light, plus the recursively traced reflection and refraction. Nothing is clamped here.
    pub fn cast_ray(&self, ray: &Ray, depth: u32, stats: &mut RayStats) -> Color {
        stats.record(depth);
        if depth > self.max_depth {
            return self.background.sample(&ray.dir);
        }
        let hr = match self.scene.intersect(ray) {
            Some(hr) => hr,
            None => return self.background.sample(&ray.dir),
        };
        let material = hr.material;

        let reflect_dir = reflect(&ray.dir, &hr.normal).normalize();
        let reflect_orig = offset_origin(&hr, &reflect_dir);
        let reflect_color = self.cast_ray(&Ray::new(reflect_orig, reflect_dir), depth + 1, stats);

        // Total internal reflection leaves no transmitted ray and contributes nothing
        let refract_color = match refract(&ray.dir, &hr.normal, material.refractive_index)
            .try_normalize(f64::EPSILON)
        {
            Some(refract_dir) => {
                let refract_orig = offset_origin(&hr, &refract_dir);
                self.cast_ray(&Ray::new(refract_orig, refract_dir), depth + 1, stats)
            }
            None => Color::zeros(),
        };

        let mut diffuse_intensity = 0.0;
        let mut specular_intensity = 0.0;
        for light in &self.scene.lights {
            let to_light = light.position - hr.p;
            let light_distance = to_light.norm();
            let light_dir = to_light / light_distance;

            let shadow_orig = offset_origin(&hr, &light_dir);
            if let Some(shadow_hr) = self.scene.intersect(&Ray::new(shadow_orig, light_dir)) {
                if (shadow_hr.p - shadow_orig).norm() < light_distance {
                    continue;
                }
            }

            diffuse_intensity += light.intensity * light_dir.dot(&hr.normal).max(0.0);
            let highlight = -reflect(&-light_dir, &hr.normal).dot(&ray.dir);
            specular_intensity +=
                highlight.max(0.0).powf(material.specular_exponent) * light.intensity;
        }

        material.diffuse_color * diffuse_intensity * material.albedo[0]
            + Color::new(1.0, 1.0, 1.0) * specular_intensity * material.albedo[1]
            + reflect_color * material.albedo[2]
            + refract_color * material.albedo[3]
    }

    /// Shade a primary ray
    pub fn trace(&self, ray: &Ray, stats: &mut RayStats) -> Color {
        self.cast_ray(ray, 0, stats)
    }
}

/// Nudge the hit point off the surface, to the side `dir` leaves towards
fn offset_origin(hr: &HitRecord, dir: &Vec3) -> Point {
    if dir.dot(&hr.normal) < 0.0 {
        hr.p - hr.normal * BIAS
    } else {
        hr.p + hr.normal * BIAS
    }
}
