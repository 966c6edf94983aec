//! Surface materials

use serde::{Deserialize, Serialize};

use crate::{error::RenderError, utils::SerdeVector, Color};

/// How a surface responds to light
///
/// The four `albedo` weights scale the diffuse, specular, reflected and refracted contributions
/// in that order. They do not need to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub refractive_index: f64,
    pub albedo: [f64; 4],
    pub diffuse_color: Color,
    pub specular_exponent: f64,
}
impl Material {
    pub fn new(
        refractive_index: f64,
        albedo: [f64; 4],
        diffuse_color: Color,
        specular_exponent: f64,
    ) -> Self {
        Self {
            refractive_index,
            albedo,
            diffuse_color,
            specular_exponent,
        }
    }

    pub fn from_config(name: &str, config: &MaterialConfig) -> Result<Self, RenderError> {
        if config.refractive_index < 1.0 {
            return Err(RenderError::InvalidScene(format!(
                "material `{name}` has refractive index {} < 1",
                config.refractive_index
            )));
        }
        if config.specular_exponent < 0.0 {
            return Err(RenderError::InvalidScene(format!(
                "material `{name}` has negative specular exponent {}",
                config.specular_exponent
            )));
        }
        Ok(Self::new(
            config.refractive_index,
            config.albedo,
            config.diffuse_color.into(),
            config.specular_exponent,
        ))
    }

    pub fn ivory() -> Self {
        Self::new(1.0, [0.6, 0.3, 0.1, 0.0], Color::new(0.4, 0.4, 0.3), 50.0)
    }

    pub fn glass() -> Self {
        Self::new(1.5, [0.0, 0.5, 0.1, 0.8], Color::new(0.6, 0.7, 0.8), 125.0)
    }

    pub fn red_rubber() -> Self {
        Self::new(1.0, [0.9, 0.1, 0.0, 0.0], Color::new(0.3, 0.1, 0.1), 10.0)
    }

    pub fn mirror() -> Self {
        Self::new(1.0, [0.0, 10.0, 0.8, 0.0], Color::new(1.0, 1.0, 1.0), 1425.0)
    }

    /// Light floor tile
    pub fn checker_light() -> Self {
        Self::new(1.0, [1.0, 0.0, 0.0, 0.0], Color::new(0.3, 0.3, 0.3), 0.0)
    }

    /// Dark floor tile
    pub fn checker_dark() -> Self {
        Self::new(1.0, [1.0, 0.0, 0.0, 0.0], Color::new(0.3, 0.2, 0.1), 0.0)
    }
}

/// Material Config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    #[serde(default = "default_refractive_index")]
    pub refractive_index: f64,
    pub albedo: [f64; 4],
    pub diffuse_color: SerdeVector,
    #[serde(default)]
    pub specular_exponent: f64,
}
impl From<&Material> for MaterialConfig {
    fn from(m: &Material) -> Self {
        Self {
            refractive_index: m.refractive_index,
            albedo: m.albedo,
            diffuse_color: m.diffuse_color.into(),
            specular_exponent: m.specular_exponent,
        }
    }
}

fn default_refractive_index() -> f64 {
    1.0
}
