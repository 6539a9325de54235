use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use renderer::Antialiasing;

#[derive(Parser, Debug)]
#[command(
    name = "ringfade",
    author,
    version,
    about = "Rotating ring of image panels that crossfade through a picture sequence"
)]
pub struct Cli {
    /// Configuration file; defaults to `ringfade.toml` in the user config directory.
    #[arg(long, value_name = "FILE", env = "RINGFADE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Seed for the background colour pick (overrides the config file).
    #[arg(long, value_name = "N", global = true)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Images to show, in order. Falls back to `assets.images` in the config.
    #[arg(value_name = "IMAGES")]
    pub images: Vec<PathBuf>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", default_value = "auto")]
    pub antialias: Antialiasing,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the carousel headless on a fixed-step clock and print where it ended up.
    Simulate(SimulateArgs),
    /// Print the circle layout for a panel aspect ratio.
    Layout(LayoutArgs),
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Images to load, in order. Falls back to `assets.images` in the config.
    #[arg(value_name = "IMAGES")]
    pub images: Vec<PathBuf>,

    /// Simulated duration in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 20.0)]
    pub seconds: f32,

    /// Simulated frame rate.
    #[arg(long, value_name = "FPS", default_value_t = 60.0)]
    pub fps: f32,

    /// Emit the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Panel aspect ratio (width / height).
    #[arg(long, value_name = "RATIO", default_value_t = 1.5)]
    pub aspect: f32,

    /// Emit the layout as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{trimmed}' must be non-zero"));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 800X600 "), Ok((800, 600)));
        assert!(parse_size("0x600").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn run_args_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "ringfade", "a.png", "b.png", "--size", "640x480", "--fps", "30", "--antialias", "4",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.images.len(), 2);
        assert_eq!(cli.run.size, Some((640, 480)));
        assert_eq!(cli.run.antialias, Antialiasing::Samples(4));
    }

    #[test]
    fn simulate_takes_its_own_images() {
        let cli = Cli::try_parse_from([
            "ringfade", "simulate", "a.png", "b.png", "--seconds", "5", "--seed", "3",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Simulate(args)) => {
                assert_eq!(args.images.len(), 2);
                assert_eq!(args.seconds, 5.0);
                assert_eq!(args.fps, 60.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.seed, Some(3));
    }
}
