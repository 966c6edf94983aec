//! Whitted-style ray tracing library
//!
//! Renders spheres over a bounded checkerboard floor with hard shadows, mirror reflection and
//! dielectric refraction. Rays that leave the scene sample an equirectangular environment map.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use log::{info, warn};
use nalgebra::Vector3;
use serde::Serialize;

pub mod cameras;
pub mod config;
pub mod error;
pub mod materials;
pub mod objects;
pub mod render;
pub mod scene;
pub mod shading;
pub mod textures;
pub mod utils;

use config::RenderConfig;
use error::RenderError;

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;

/// Prelude
pub mod prelude {
    pub use crate::cameras::Camera;
    pub use crate::config::RenderConfig;
    pub use crate::error::RenderError;
    pub use crate::materials::Material;
    pub use crate::objects::{Checkerboard, HitRecord, Hittable, Sphere};
    pub use crate::render::{partition_rows, Framebuffer, Renderer};
    pub use crate::scene::{Light, Scene, SceneConfig};
    pub use crate::shading::{RayStats, Tracer};
    pub use crate::textures::{Background, EnvironmentMap, SolidColor};
    pub use crate::{Color, Point, Ray, Vec3};
}

/// The ray in ray tracing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub orig: Point,
    /// Unit direction
    pub dir: Vec3,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3) -> Self {
        Self { orig, dir }
    }

    pub fn get(&self, t: f64) -> Point {
        self.orig + t * self.dir
    }
}

/// Wall-clock time spent in each phase of [`run`], in seconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderTimings {
    pub decode: f64,
    pub cast: f64,
    pub tonemap: f64,
    pub encode: f64,
    pub total: f64,
}

/// Render the configured scene and write it as a PNG.
///
/// The background is decoded and the output file created before any ray is cast. The image is
/// written next to `config.output` under a `.partial` suffix and renamed into place once
/// complete, so an error never leaves a partial image behind.
pub fn run(config: &RenderConfig) -> Result<RenderTimings, RenderError> {
    let start = Instant::now();
    let mut timings = RenderTimings::default();

    config.validate()?;
    let scene = scene::Scene::from_config(&config.scene)?;

    let decode_start = Instant::now();
    let background = textures::EnvironmentMap::open(&config.background)?;
    timings.decode = decode_start.elapsed().as_secs_f64();
    info!(
        "Decoded background {} ({}x{}) in {:.3}s",
        config.background.display(),
        background.width(),
        background.height(),
        timings.decode
    );

    let (pending, output) = PendingOutput::create(&config.output)?;

    let camera = cameras::Camera::new(config.width, config.height, config.fov_deg.to_radians());
    let tracer = shading::Tracer::new(&scene, &background, config.max_depth);
    let renderer = render::Renderer::new(camera, config.bands());

    let progress = indicatif::ProgressBar::new(config.height as u64);
    let cast_start = Instant::now();
    let framebuffer = renderer.render(&tracer, &progress)?;
    progress.finish_and_clear();
    timings.cast = cast_start.elapsed().as_secs_f64();
    info!("Cast {} rows in {:.3}s", config.height, timings.cast);

    let tonemap_start = Instant::now();
    let raster = framebuffer.to_rgba();
    timings.tonemap = tonemap_start.elapsed().as_secs_f64();

    let encode_start = Instant::now();
    let mut writer = BufWriter::new(output);
    PngEncoder::new(&mut writer)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|source| RenderError::Encode {
            path: config.output.clone(),
            source,
        })?;
    writer.flush().map_err(|source| RenderError::Write {
        path: config.output.clone(),
        source,
    })?;
    drop(writer);
    pending.persist(&config.output)?;
    timings.encode = encode_start.elapsed().as_secs_f64();
    timings.total = start.elapsed().as_secs_f64();
    info!(
        "Tonemap {:.3}s, encode {:.3}s, wrote {}",
        timings.tonemap,
        timings.encode,
        config.output.display()
    );

    Ok(timings)
}

/// Output image being written under a temporary name
///
/// Removed on drop unless [`PendingOutput::persist`] moved it into place.
struct PendingOutput {
    path: PathBuf,
    persisted: bool,
}
impl PendingOutput {
    fn create(dest: &Path) -> Result<(Self, File), RenderError> {
        let mut name = OsString::from(dest.as_os_str());
        name.push(".partial");
        let path = PathBuf::from(name);
        let file = File::create(&path).map_err(|source| RenderError::CreateOutput {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok((
            Self {
                path,
                persisted: false,
            },
            file,
        ))
    }

    fn persist(mut self, dest: &Path) -> Result<(), RenderError> {
        fs::rename(&self.path, dest).map_err(|source| RenderError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        self.persisted = true;
        Ok(())
    }
}
impl Drop for PendingOutput {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove partial output {}: {e}", self.path.display());
        }
    }
}
