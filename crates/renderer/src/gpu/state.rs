use anyhow::{Context, Result};
use carousel::{Carousel, FrameView, SceneHost, TextureId, Viewport};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing};

use super::context::GpuContext;
use super::mesh::RingMesh;
use super::pipeline::{create_card_pipeline, PipelineLayouts};
use super::targets::RenderTarget;
use super::textures::{upload_assets, PanelTexture};
use super::uniforms::CardUniforms;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.025,
    a: 1.0,
};

/// Windowed scene host: everything needed to draw the carousel.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    textures: Vec<PanelTexture>,
    mesh: RingMesh,
    depth_target: RenderTarget,
    multisample_target: Option<RenderTarget>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        carousel: &Carousel,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context =
            GpuContext::new(target, size, antialiasing).context("failed to initialise GPU")?;
        let device = &context.device;

        let layouts = PipelineLayouts::new(device);
        let pipeline = create_card_pipeline(
            device,
            &layouts,
            context.surface_format,
            context.sample_count,
        );

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("card uniforms"),
            contents: bytemuck::bytes_of(&CardUniforms::from_frame(
                &carousel.frame_view(),
                viewport_of(context.size),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("card uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let textures = upload_assets(
            device,
            &context.queue,
            &layouts.texture_layout,
            carousel.assets(),
            context.max_texture_dimension(),
        );
        let mesh = RingMesh::new(device, carousel.rig());
        let depth_target = RenderTarget::depth(device, context.size, context.sample_count);
        let multisample_target = (context.sample_count > 1).then(|| {
            RenderTarget::multisample(
                device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        tracing::info!(
            adapter = %context.adapter_profile.name,
            textures = textures.len(),
            sample_count = context.sample_count,
            "GPU ready"
        );

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            textures,
            mesh,
            depth_target,
            multisample_target,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if !self.context.resize(new_size) {
            return;
        }
        let device = &self.context.device;
        let sample_count = self.context.sample_count;
        self.depth_target = RenderTarget::depth(device, new_size, sample_count);
        if self.multisample_target.is_some() {
            self.multisample_target = Some(RenderTarget::multisample(
                device,
                self.context.surface_format,
                new_size,
                sample_count,
            ));
        }
    }

    fn texture(&self, id: TextureId) -> &PanelTexture {
        &self.textures[id.index() % self.textures.len()]
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Viewport {
    Viewport::new(size.width, size.height)
}

impl SceneHost for GpuState {
    type Error = wgpu::SurfaceError;

    fn viewport(&self) -> Viewport {
        viewport_of(self.context.size)
    }

    fn render(&mut self, frame: FrameView<'_>) -> Result<(), Self::Error> {
        let uniforms = CardUniforms::from_frame(&frame, self.viewport());
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("carousel frame"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("carousel pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture(frame.uniforms.current).bind_group, &[]);
            render_pass.set_bind_group(2, &self.texture(frame.uniforms.next).bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
