use winit::dpi::PhysicalSize;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen attachment sized to the swapchain (MSAA colour or depth).
pub(crate) struct RenderTarget {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    pub(crate) fn multisample(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        Self::new(device, "msaa color target", format, size, sample_count)
    }

    pub(crate) fn depth(device: &wgpu::Device, size: PhysicalSize<u32>, sample_count: u32) -> Self {
        Self::new(device, "depth target", DEPTH_FORMAT, size, sample_count)
    }

    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
