//! Render configuration, loaded from YAML

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::RenderError,
    scene::SceneConfig,
    shading::{MAX_DEPTH, MAX_DEPTH_LIMIT},
};

/// Everything needed for one render. Missing fields fall back to [`RenderConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Vertical field of view in degrees
    pub fov_deg: f64,
    /// Deepest recursion level that is still shaded, at most [`MAX_DEPTH_LIMIT`]
    pub max_depth: u32,
    /// Equirectangular environment map
    pub background: PathBuf,
    /// PNG to write
    pub output: PathBuf,
    /// Number of row bands rendered in parallel; defaults to the available hardware threads
    pub threads: Option<usize>,
    pub scene: SceneConfig,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fov_deg: 60.0,
            max_depth: MAX_DEPTH,
            background: PathBuf::from("envmap.jpg"),
            output: PathBuf::from("out.png"),
            threads: None,
            scene: SceneConfig::default(),
        }
    }
}
impl RenderConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| RenderError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(RenderError::InvalidConfig(format!(
                "field of view {} is outside (0, 180) degrees",
                self.fov_deg
            )));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(RenderError::InvalidConfig(format!(
                "max_depth {} is above the limit of {MAX_DEPTH_LIMIT}",
                self.max_depth
            )));
        }
        if self.threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of row bands to render in parallel
    pub fn bands(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}
