use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use carousel::{
    Carousel, PaletteSource, SystemTimeSource, TextureAsset, TimeSource, Viewport,
};
use ringconfig::CarouselConfig;
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::gpu::GpuState;
use crate::runtime::FrameScheduler;
use crate::types::RendererConfig;

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Opens the preview window and runs the carousel until it is closed.
pub(crate) fn run_window(
    config: RendererConfig,
    carousel_config: &CarouselConfig,
    assets: Vec<TextureAsset>,
    palette: &mut dyn PaletteSource,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut carousel = Carousel::build(
        carousel_config,
        assets,
        Viewport::new(size.width, size.height),
        palette,
    )
    .context("failed to build carousel")?;
    let mut gpu = GpuState::new(window.as_ref(), size, config.antialiasing, &carousel)
        .context("failed to initialise window renderer")?;

    let profile = gpu.adapter_profile();
    let target_fps = match config.target_fps {
        None if profile.is_software() => {
            tracing::warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping preview FPS (override with --fps)"
            );
            Some(SOFTWARE_FPS_CAP)
        }
        requested => requested,
    };
    let mut scheduler = FrameScheduler::new(target_fps);
    let mut clock = SystemTimeSource::new();
    info!(width = size.width, height = size.height, fps = ?target_fps, "preview window open");
    window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    gpu.resize(new_size);
                    carousel.resize(Viewport::new(new_size.width, new_size.height));
                }
                WindowEvent::RedrawRequested => {
                    let sample = clock.sample();
                    match carousel.tick(sample.delta, &mut gpu) {
                        Ok(report) => {
                            scheduler.mark_rendered(Instant::now());
                            if report.timeline.repeats > 0 {
                                tracing::trace!(frame = report.frame_index, "crossfade repeat");
                            }
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu.resize(gpu.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting preview");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            tracing::warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            tracing::warn!(error = ?other, "surface error; retrying next frame");
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    let ms = deadline.saturating_duration_since(now).as_millis();
                    tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}
