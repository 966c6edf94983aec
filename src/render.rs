//! Row-parallel rendering into a floating point framebuffer

use std::ops::Range;

use image::RgbaImage;
use indicatif::ProgressBar;
use log::debug;

use crate::{
    cameras::Camera,
    error::RenderError,
    shading::{RayStats, Tracer},
    utils, Color,
};

/// Unclamped color per pixel, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}
impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zeros(); width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Tonemap into an opaque 8-bit image
    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            utils::get_pixel(&self.get(x as usize, y as usize))
        })
    }
}

/// Split `height` rows into `bands` contiguous ranges
///
/// Every band gets `height / bands` rows and the last one also takes the remainder. The band
/// count is clamped to `1..=height` so no band is empty.
pub fn partition_rows(height: usize, bands: usize) -> Vec<Range<usize>> {
    if height == 0 {
        return Vec::new();
    }
    let bands = bands.clamp(1, height);
    let rows_per_band = height / bands;
    (0..bands)
        .map(|band| {
            let start = band * rows_per_band;
            let end = if band == bands - 1 {
                height
            } else {
                start + rows_per_band
            };
            start..end
        })
        .collect()
}

/// Renders a camera view with one task per band of rows
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    camera: Camera,
    bands: usize,
}
impl Renderer {
    pub fn new(camera: Camera, bands: usize) -> Self {
        Self { camera, bands }
    }

    pub fn render(
        &self,
        tracer: &Tracer,
        progress: &ProgressBar,
    ) -> Result<Framebuffer, RenderError> {
        self.render_with_stats(tracer, progress)
            .map(|(framebuffer, _)| framebuffer)
    }

    /// Render every pixel and return the framebuffer with the merged per-depth ray counts
    ///
    /// Each band owns a disjoint slice of the framebuffer for the whole render, so the workers
    /// share nothing mutable. Returns once every band has finished.
    pub fn render_with_stats(
        &self,
        tracer: &Tracer,
        progress: &ProgressBar,
    ) -> Result<(Framebuffer, RayStats), RenderError> {
        let (width, height) = (self.camera.width, self.camera.height);
        let mut framebuffer = Framebuffer::new(width, height);
        let mut stats = RayStats::new(tracer.max_depth());
        if width == 0 || height == 0 {
            return Ok((framebuffer, stats));
        }

        let ranges = partition_rows(height, self.bands);
        debug!("Rendering {width}x{height} in {} bands: {ranges:?}", ranges.len());

        let mut jobs = Vec::with_capacity(ranges.len());
        let mut rest = framebuffer.pixels.as_mut_slice();
        for rows in ranges {
            let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * width);
            jobs.push(Band {
                rows,
                pixels: band,
                stats: RayStats::new(tracer.max_depth()),
            });
            rest = tail;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.len())
            .thread_name(|idx| format!("band-{idx}"))
            .build()?;
        let camera = &self.camera;
        pool.scope(|s| {
            for job in jobs.iter_mut() {
                s.spawn(move |_| job.render(camera, tracer, progress));
            }
        });

        for job in &jobs {
            stats.merge(&job.stats);
        }
        debug!(
            "Cast {} rays, per depth: {:?}",
            stats.total(),
            stats.calls()
        );
        Ok((framebuffer, stats))
    }
}

/// Rows owned by one worker
struct Band<'a> {
    rows: Range<usize>,
    pixels: &'a mut [Color],
    stats: RayStats,
}
impl Band<'_> {
    fn render(&mut self, camera: &Camera, tracer: &Tracer, progress: &ProgressBar) {
        for (j, row) in self
            .rows
            .clone()
            .zip(self.pixels.chunks_mut(camera.width))
        {
            for (i, pixel) in row.iter_mut().enumerate() {
                *pixel = tracer.trace(&camera.get_ray(i, j), &mut self.stats);
            }
            progress.inc(1);
        }
    }
}
