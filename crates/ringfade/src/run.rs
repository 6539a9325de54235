use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use carousel::{
    AssetLoader, Carousel, CircleLayout, FileAssetLoader, FixedStepTimeSource, HeadlessHost,
    Phase, RandomPalette, TextureAsset, TextureId, TimeSource, Viewport,
};
use renderer::{Renderer, RendererConfig};
use ringconfig::CarouselConfig;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, LayoutArgs, RunArgs, SimulateArgs};
use crate::paths::AppPaths;

const DEFAULT_FILTER: &str =
    "info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";

/// Viewport used when no window exists.
const HEADLESS_VIEWPORT: Viewport = Viewport {
    width: 1600,
    height: 900,
};

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let config = load_config(cli.config.as_deref())?;
    let seed = cli.seed.or(config.seed);
    match cli.command {
        None => run_window(&config, cli.run, seed),
        Some(Command::Simulate(args)) => simulate(&config, args, seed),
        Some(Command::Layout(args)) => layout(&config, args),
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the configuration. An explicit path must exist; the per-user file is
/// optional and defaults apply when it is missing.
fn load_config(explicit: Option<&Path>) -> Result<CarouselConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let paths = AppPaths::discover()?;
            let candidate = paths.config_file();
            if !candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "no config file; using defaults");
                return Ok(CarouselConfig::default());
            }
            candidate
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = CarouselConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn resolve_images(cli_images: Vec<PathBuf>, config: &CarouselConfig) -> Result<Vec<PathBuf>> {
    let images = if cli_images.is_empty() {
        config.image_paths()
    } else {
        cli_images
    };
    if images.len() < 2 {
        bail!(
            "at least two images are required (got {}); pass them as arguments or set assets.images",
            images.len()
        );
    }
    Ok(images)
}

fn load_assets(images: &[PathBuf]) -> Result<Vec<TextureAsset>> {
    let assets = FileAssetLoader
        .load(images)
        .context("failed to load carousel images")?;
    tracing::info!(count = assets.len(), "loaded images");
    Ok(assets)
}

fn run_window(config: &CarouselConfig, args: RunArgs, seed: Option<u64>) -> Result<()> {
    let images = resolve_images(args.images, config)?;
    let assets = load_assets(&images)?;

    let mut renderer_config = RendererConfig {
        target_fps: args.fps.filter(|fps| *fps > 0.0),
        antialiasing: args.antialias,
        ..RendererConfig::default()
    };
    if let Some(size) = args.size {
        renderer_config.surface_size = size;
    }

    let mut palette = RandomPalette::new(seed);
    Renderer::new(renderer_config).run(config, assets, &mut palette)
}

#[derive(Debug, Serialize)]
struct SimulationSummary {
    phase: &'static str,
    frames: u64,
    seconds: f32,
    repeats: u64,
    cursor: u64,
    current: usize,
    next: usize,
    current_image: String,
    next_image: String,
    progress: f32,
    intro_progress: f32,
    group_rotation: f32,
    camera_z: f32,
    radius: f32,
}

fn simulate(config: &CarouselConfig, args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be a positive number (got {})", args.fps);
    }
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        bail!("--seconds must be non-negative (got {})", args.seconds);
    }

    let images = resolve_images(args.images, config)?;
    let assets = load_assets(&images)?;
    let mut palette = RandomPalette::new(seed);
    let mut carousel = Carousel::build(config, assets, HEADLESS_VIEWPORT, &mut palette)
        .context("failed to build carousel")?;

    let mut host = HeadlessHost::new(HEADLESS_VIEWPORT);
    let mut clock = FixedStepTimeSource::from_fps(args.fps);
    let frames = (args.seconds * args.fps).round() as u64;
    let mut elapsed = 0.0;
    for _ in 0..frames {
        let sample = clock.sample();
        elapsed = sample.elapsed;
        let report = match carousel.tick(sample.delta, &mut host) {
            Ok(report) => report,
            Err(never) => match never {},
        };
        if report.timeline.entered_loop {
            tracing::debug!(frame = report.frame_index, "simulation entered crossfade loop");
        }
    }

    let summary = summarise(&carousel, elapsed);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("phase:     {}", summary.phase);
        println!("frames:    {} ({:.3}s)", summary.frames, summary.seconds);
        println!("repeats:   {} (cursor {})", summary.repeats, summary.cursor);
        println!("current:   #{} {}", summary.current, summary.current_image);
        println!("next:      #{} {}", summary.next, summary.next_image);
        println!("progress:  {:.3}", summary.progress);
        println!("rotation:  {:.3} rad", summary.group_rotation);
        println!("camera z:  {:.3}", summary.camera_z);
        println!("radius:    {:.4}", summary.radius);
    }
    Ok(())
}

fn summarise(carousel: &Carousel, seconds: f32) -> SimulationSummary {
    let uniforms = carousel.uniforms();
    let image_name = |id: TextureId| {
        carousel
            .asset(id)
            .map(|asset| asset.name().to_string())
            .unwrap_or_default()
    };
    SimulationSummary {
        phase: match carousel.phase() {
            Phase::Intro => "intro",
            Phase::Loop => "loop",
        },
        frames: carousel.frames(),
        seconds,
        repeats: carousel.repeats(),
        cursor: carousel.cursor(),
        current: uniforms.current.index(),
        next: uniforms.next.index(),
        current_image: image_name(uniforms.current),
        next_image: image_name(uniforms.next),
        progress: uniforms.progress,
        intro_progress: uniforms.intro_progress,
        group_rotation: carousel.rig().group_rotation(),
        camera_z: carousel.camera().position.z,
        radius: carousel.rig().layout().radius(),
    }
}

#[derive(Debug, Serialize)]
struct LayoutSummary {
    aspect: f32,
    panel_count: u32,
    margin: f32,
    radius: f32,
    angles: Vec<f32>,
}

fn layout(config: &CarouselConfig, args: LayoutArgs) -> Result<()> {
    let circle = CircleLayout::new(args.aspect, config.layout.panel_count, config.layout.margin)
        .context("failed to compute layout")?;
    let summary = LayoutSummary {
        aspect: circle.aspect(),
        panel_count: circle.panel_count(),
        margin: circle.margin(),
        radius: circle.radius(),
        angles: circle.angles().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} panels, aspect {:.3}, margin {:.3}: radius {:.4}",
            summary.panel_count, summary.aspect, summary.margin, summary.radius
        );
        for (index, angle) in summary.angles.iter().enumerate() {
            println!("  {index:>3}  {:>8.4} rad  {:>8.2} deg", angle, angle.to_degrees());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_config_is_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ringfade.toml");
        fs::write(&path, "version = 1\n[layout]\npanel_count = 2\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("panel_count"));
    }

    #[test]
    fn cli_images_override_config_images() {
        let config = CarouselConfig::from_toml_str(
            "version = 1\n[assets]\ndirectory = \"/pics\"\nimages = [\"a.png\", \"b.png\"]\n",
        )
        .unwrap();
        let from_config = resolve_images(Vec::new(), &config).unwrap();
        assert_eq!(from_config, vec![PathBuf::from("/pics/a.png"), PathBuf::from("/pics/b.png")]);

        let explicit = vec![PathBuf::from("x.png"), PathBuf::from("y.png"), PathBuf::from("z.png")];
        assert_eq!(resolve_images(explicit.clone(), &config).unwrap(), explicit);
    }

    #[test]
    fn fewer_than_two_images_is_an_error() {
        let config = CarouselConfig::default();
        assert!(resolve_images(vec![PathBuf::from("only.png")], &config).is_err());
        assert!(resolve_images(Vec::new(), &config).is_err());
    }
}
