//! Render a Whitted-style ray traced scene to a PNG
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use tiny_tracer::config::RenderConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    after_help = "Profiling: --timings only, no CPU profile or execution trace output."
)]
struct Args {
    /// YAML render configuration; the built-in demo scene is used without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// PNG to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Equirectangular environment map
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Number of row bands rendered in parallel
    #[arg(short, long)]
    threads: Option<usize>,

    /// Write per-phase wall-clock timings (decode, cast, tonemap, encode) to this file as YAML
    #[arg(long)]
    timings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(background) = args.background {
        config.background = background;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config.validate()?;

    info!(
        "Rendering {}x{} with {} bands, {} spheres, {} lights",
        config.width,
        config.height,
        config.bands(),
        config.scene.spheres.len(),
        config.scene.lights.len()
    );

    let timings = match tiny_tracer::run(&config) {
        Ok(timings) => timings,
        Err(e) => {
            // A failed render is reported, not fatal
            error!("{:#}", anyhow::Error::new(e));
            return Ok(());
        }
    };
    info!("Render took {:.3}s", timings.total);

    if let Some(path) = args.timings {
        let yaml = serde_yaml::to_string(&timings)?;
        std::fs::write(&path, yaml)
            .with_context(|| format!("writing timings to {}", path.display()))?;
    }
    Ok(())
}
