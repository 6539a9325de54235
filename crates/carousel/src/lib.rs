//! Core of the ringfade carousel.
//!
//! A ring of image panels turns around the viewer while a single shared
//! material crossfades between textures. The pieces:
//!
//! - [`layout`] places panels on a circle and generates their meshes.
//! - [`material`] owns the crossfade uniforms and the background colour.
//! - [`timeline`] runs the one-shot intro and then the endless crossfade loop.
//! - [`integrator`] couples frame time to ring spin and shader time.
//! - [`host`] and [`assets`] define what the carousel needs from the outside.
//!
//! Everything here is single threaded. Within a tick the timeline writes
//! first, the integrator reads after, then the host renders.

pub mod assets;
mod carousel;
pub mod clock;
pub mod host;
pub mod integrator;
pub mod layout;
pub mod material;
pub mod timeline;

pub use assets::{AssetError, AssetLoader, FileAssetLoader, TextureAsset, TextureId};
pub use carousel::{Carousel, CarouselError, TickReport};
pub use clock::{FixedStepTimeSource, SystemTimeSource, TimeSample, TimeSource};
pub use host::{Camera, FrameRecord, FrameView, HeadlessHost, SceneHost, Viewport};
pub use integrator::FrameIntegrator;
pub use layout::{CircleLayout, LayoutError, Panel, PanelRig, PanelVertex, PlaneMesh};
pub use material::{
    CrossfadeMaterial, CrossfadeUniforms, FixedPalette, LinearColor, PaletteSource, RandomPalette,
};
pub use timeline::{Phase, TimelineReport, TrackPosition};
