use std::borrow::Cow;

use wgpu::naga::ShaderStage;

const CARD_VERTEX_GLSL: &str = include_str!("../shaders/card.vert");
const CARD_FRAGMENT_GLSL: &str = include_str!("../shaders/card.frag");

/// Compiles the panel vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("card vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(CARD_VERTEX_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the crossfade fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("card fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(CARD_FRAGMENT_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}
