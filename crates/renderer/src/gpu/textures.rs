use std::borrow::Cow;

use carousel::TextureAsset;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};

/// One uploaded asset, bound as a texture/sampler pair.
pub(crate) struct PanelTexture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

pub(crate) fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("panel texture layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Uploads every asset once; the carousel later binds them by id.
pub(crate) fn upload_assets(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    assets: &[TextureAsset],
    max_dimension: u32,
) -> Vec<PanelTexture> {
    assets
        .iter()
        .enumerate()
        .map(|(index, asset)| upload_asset(device, queue, layout, index, asset, max_dimension))
        .collect()
}

fn upload_asset(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    index: usize,
    asset: &TextureAsset,
    max_dimension: u32,
) -> PanelTexture {
    let image = fit_to_limit(asset.image(), max_dimension);
    if let Cow::Owned(resized) = &image {
        tracing::warn!(
            asset = asset.name(),
            width = asset.width(),
            height = asset.height(),
            resized_width = resized.width(),
            resized_height = resized.height(),
            "image exceeds GPU texture limit; downscaling"
        );
    }

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&format!("panel texture #{index} ({})", asset.name())),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        image.as_raw(),
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Panel textures repeat on both axes.
    let address_mode = wgpu::AddressMode::Repeat;
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("panel sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("panel texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });
    tracing::debug!(index, asset = asset.name(), "uploaded panel texture");

    PanelTexture {
        _texture: texture,
        bind_group,
    }
}

/// Downscales images larger than the device allows, keeping aspect ratio.
fn fit_to_limit(image: &RgbaImage, max_dimension: u32) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return Cow::Borrowed(image);
    }
    let scale = max_dimension as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    Cow::Owned(imageops::resize(
        image,
        new_width,
        new_height,
        FilterType::Triangle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_borrowed() {
        let image = RgbaImage::new(64, 32);
        assert!(matches!(fit_to_limit(&image, 64), Cow::Borrowed(_)));
    }

    #[test]
    fn oversized_images_keep_their_aspect() {
        let image = RgbaImage::new(400, 100);
        let fitted = fit_to_limit(&image, 200);
        assert_eq!(fitted.dimensions(), (200, 50));
    }
}
