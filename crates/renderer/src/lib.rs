//! Windowed host for the ringfade carousel.
//!
//! The window opens first, then the carousel is built against its size, and
//! only then does the GPU state upload textures and panel geometry. Redraws
//! start once all of that has succeeded. Each redraw ticks the carousel with
//! the wall-clock delta; the carousel hands back a frame view that is drawn
//! with the card shaders under `shaders/`.

mod compile;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;
use carousel::{PaletteSource, TextureAsset};
use ringconfig::CarouselConfig;

pub use runtime::FrameScheduler;
pub use types::{AdapterProfile, Antialiasing, RendererConfig};

pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks until the window is closed.
    pub fn run(
        self,
        carousel_config: &CarouselConfig,
        assets: Vec<TextureAsset>,
        palette: &mut dyn PaletteSource,
    ) -> Result<()> {
        window::run_window(self.config, carousel_config, assets, palette)
    }
}
