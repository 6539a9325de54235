use bytemuck::{Pod, Zeroable};
use carousel::PanelRig;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// All panels flattened into one vertex list and one index list.
pub(crate) fn flatten_rig(rig: &PanelRig) -> (Vec<GpuVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(rig.vertex_count());
    let mut indices = Vec::with_capacity(rig.index_count());
    for panel in rig.panels() {
        let base = vertices.len() as u32;
        vertices.extend(panel.mesh.vertices.iter().map(|vertex| GpuVertex {
            position: vertex.position,
            uv: vertex.uv,
        }));
        indices.extend(panel.mesh.indices.iter().map(|index| base + index));
    }
    (vertices, indices)
}

/// Panel geometry is baked once; only the group matrix changes per frame.
pub(crate) struct RingMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl RingMesh {
    pub(crate) fn new(device: &wgpu::Device, rig: &PanelRig) -> Self {
        let (vertices, indices) = flatten_rig(rig);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ring indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            "uploaded ring mesh"
        );
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel::CircleLayout;

    #[test]
    fn flattening_offsets_panel_indices() {
        let rig = PanelRig::build(CircleLayout::new(1.0, 3, 0.1).unwrap(), 1, 0.0, 1.0).unwrap();
        let (vertices, indices) = flatten_rig(&rig);
        assert_eq!(vertices.len(), 3 * 4);
        assert_eq!(indices.len(), 3 * 6);
        assert_eq!(&indices[6..12], &[4, 6, 5, 6, 7, 5]);
        assert!(indices.iter().all(|&index| (index as usize) < vertices.len()));
    }
}
