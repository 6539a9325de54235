//! Circle layout and panel geometry.
//!
//! Panels are sized from the first asset's aspect ratio and spaced evenly
//! around a circle whose radius keeps neighbours from overlapping. Each
//! panel's placement is baked into its vertices; the ring as a whole only
//! carries one rotation value that changes per frame.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Quat, Vec3};

use crate::assets::TextureAsset;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("at least 2 texture assets are required (found {found})")]
    NotEnoughAssets { found: usize },
    #[error("panel aspect ratio must be positive and finite (got {aspect})")]
    InvalidAspect { aspect: f32 },
    #[error("at least 3 panels are required to close the ring (got {count})")]
    TooFewPanels { count: u32 },
    #[error("panel subdivision must be at least 1 segment per unit")]
    NoSegments,
}

/// Radius that fits `panel_count` panels of width `aspect` on a circle,
/// plus `margin`.
pub fn ring_radius(aspect: f32, panel_count: u32, margin: f32) -> f32 {
    0.5 * aspect / (PI / panel_count as f32).tan() + margin
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleLayout {
    aspect: f32,
    panel_count: u32,
    margin: f32,
    radius: f32,
}

impl CircleLayout {
    pub fn new(aspect: f32, panel_count: u32, margin: f32) -> Result<Self, LayoutError> {
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(LayoutError::InvalidAspect { aspect });
        }
        if panel_count < 3 {
            return Err(LayoutError::TooFewPanels { count: panel_count });
        }
        Ok(Self {
            aspect,
            panel_count,
            margin,
            radius: ring_radius(aspect, panel_count, margin),
        })
    }

    /// Layout driven by the first asset. Needs at least two assets so the
    /// crossfade has a pair to work with.
    pub fn from_assets(
        assets: &[TextureAsset],
        panel_count: u32,
        margin: f32,
    ) -> Result<Self, LayoutError> {
        match assets {
            [first, _, ..] => Self::new(first.aspect_ratio(), panel_count, margin),
            _ => Err(LayoutError::NotEnoughAssets {
                found: assets.len(),
            }),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn panel_count(&self) -> u32 {
        self.panel_count
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Placement angle of panel `index`, starting at `-pi/2`.
    pub fn angle(&self, index: u32) -> f32 {
        (index as f32 / self.panel_count as f32) * TAU - PI * 0.5
    }

    pub fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.panel_count).map(|index| self.angle(index))
    }

    pub fn panel_position(&self, index: u32) -> Vec3 {
        let angle = self.angle(index);
        Vec3::new(self.radius * angle.cos(), 0.0, self.radius * angle.sin())
    }

    /// Rotation then translation that turns panel `index` to face the centre.
    pub fn panel_transform(&self, index: u32) -> Mat4 {
        let angle = self.angle(index);
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(-angle - PI * 0.5),
            self.panel_position(index),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Subdivided plane in the XY plane, facing +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMesh {
    pub vertices: Vec<PanelVertex>,
    pub indices: Vec<u32>,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl PlaneMesh {
    pub fn new(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let columns = grid_x + 1;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let mut vertices = Vec::with_capacity((columns * (grid_y + 1)) as usize);
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height * 0.5;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width * 0.5;
                vertices.push(PanelVertex {
                    position: [x, -y, 0.0],
                    uv: [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + columns * iy;
                let b = ix + columns * (iy + 1);
                let c = (ix + 1) + columns * (iy + 1);
                let d = (ix + 1) + columns * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            vertices,
            indices,
            width_segments: grid_x,
            height_segments: grid_y,
        }
    }

    pub fn transformed(mut self, matrix: &Mat4) -> Self {
        for vertex in &mut self.vertices {
            vertex.position = matrix
                .transform_point3(Vec3::from(vertex.position))
                .to_array();
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub index: u32,
    pub angle: f32,
    pub transform: Mat4,
    pub mesh: PlaneMesh,
}

/// The group of panels plus the wrapper that offsets and tilts it.
#[derive(Debug, Clone)]
pub struct PanelRig {
    layout: CircleLayout,
    panels: Vec<Panel>,
    group_rotation: f32,
    rotation_speed: f32,
    wrapper_translation: Vec3,
    wrapper_tilt: f32,
}

impl PanelRig {
    /// `tilt` is in radians about Z; the wrapper sits `radius - camera_offset`
    /// along +Z.
    pub fn build(
        layout: CircleLayout,
        segments_per_unit: u32,
        tilt: f32,
        camera_offset: f32,
    ) -> Result<Self, LayoutError> {
        if segments_per_unit == 0 {
            return Err(LayoutError::NoSegments);
        }
        let width_segments = (segments_per_unit as f32 * layout.aspect())
            .round()
            .max(1.0) as u32;

        let panels = (0..layout.panel_count())
            .map(|index| {
                let transform = layout.panel_transform(index);
                let mesh = PlaneMesh::new(layout.aspect(), 1.0, width_segments, segments_per_unit)
                    .transformed(&transform);
                Panel {
                    index,
                    angle: layout.angle(index),
                    transform,
                    mesh,
                }
            })
            .collect();

        Ok(Self {
            layout,
            panels,
            group_rotation: 0.0,
            rotation_speed: 0.0,
            wrapper_translation: Vec3::new(0.0, 0.0, layout.radius() - camera_offset),
            wrapper_tilt: tilt,
        })
    }

    pub fn layout(&self) -> &CircleLayout {
        &self.layout
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn group_rotation(&self) -> f32 {
        self.group_rotation
    }

    pub fn rotate_group(&mut self, delta: f32) {
        self.group_rotation += delta;
    }

    /// Transient spin added on top of the idle rotation during the intro.
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn set_rotation_speed(&mut self, speed: f32) {
        self.rotation_speed = speed;
    }

    pub fn wrapper_translation(&self) -> Vec3 {
        self.wrapper_translation
    }

    pub fn wrapper_tilt(&self) -> f32 {
        self.wrapper_tilt
    }

    /// World matrix of the panel group: wrapper offset, wrapper tilt, spin.
    pub fn group_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.wrapper_translation)
            * Mat4::from_rotation_z(self.wrapper_tilt)
            * Mat4::from_rotation_y(self.group_rotation)
    }

    pub fn vertex_count(&self) -> usize {
        self.panels.iter().map(|panel| panel.mesh.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.panels.iter().map(|panel| panel.mesh.indices.len()).sum()
    }
}
