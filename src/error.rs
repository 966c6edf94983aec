//! Errors that abort a render attempt

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("can't open background {}", path.display())]
    OpenBackground {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't decode background {}", path.display())]
    DecodeBackground {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("background image has no pixels")]
    EmptyBackground,

    #[error("can't create output file {}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't encode output image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("can't write output file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't read config {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("failed to start render workers")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
