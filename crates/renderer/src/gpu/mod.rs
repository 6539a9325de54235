//! GPU side of the windowed host.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `textures` uploads each asset once and exposes a bind group per asset.
//! - `mesh` bakes every panel of the ring into one vertex/index buffer pair.
//! - `pipeline` compiles the card shaders into a depth-tested, alpha-blended
//!   pipeline.
//! - `uniforms` mirrors the shader's uniform block.
//! - `state` glues everything together and implements `SceneHost`.

mod context;
mod mesh;
mod pipeline;
mod state;
mod targets;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
