use bytemuck::{Pod, Zeroable};
use carousel::{FrameView, Viewport};

/// std140 mirror of the `CardParams` block in the card shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct CardUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    bg_color: [f32; 4],
    resolution: [f32; 2],
    aspect: f32,
    progress: f32,
    time: f32,
    position_radius: f32,
    intro_progress: f32,
    _padding: f32,
}

impl CardUniforms {
    pub(crate) fn from_frame(frame: &FrameView<'_>, viewport: Viewport) -> Self {
        let uniforms = frame.uniforms;
        let [r, g, b] = uniforms.bg_color;
        Self {
            view_proj: frame.camera.view_projection(viewport).to_cols_array_2d(),
            model: frame.rig.group_matrix().to_cols_array_2d(),
            bg_color: [r, g, b, 1.0],
            resolution: uniforms.resolution,
            aspect: uniforms.aspect,
            progress: uniforms.progress,
            time: uniforms.time,
            position_radius: uniforms.position_radius,
            intro_progress: uniforms.intro_progress,
            _padding: 0.0,
        }
    }
}
