//! The contract between the carousel and whatever draws it.

use glam::{Mat4, Vec3};
use ringconfig::CameraSettings;

use crate::layout::PanelRig;
use crate::material::CrossfadeUniforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, falling back to 1 for degenerate sizes.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn as_resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Perspective camera looking down -Z. The intro dollies it between
/// `pos_z0` and `pos_z1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub pos_z0: f32,
    pub pos_z1: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            position: Vec3::new(0.0, settings.height, settings.rest_z),
            pos_z0: settings.rest_z,
            pos_z1: settings.intro_z,
            fov_y: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        self.projection_matrix(viewport.aspect()) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub rig: &'a PanelRig,
    pub uniforms: &'a CrossfadeUniforms,
}

/// Render target for the carousel.
pub trait SceneHost {
    type Error;

    fn viewport(&self) -> Viewport;

    fn render(&mut self, frame: FrameView<'_>) -> Result<(), Self::Error>;
}

/// What the headless host saw on its last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    pub group_rotation: f32,
    pub camera_z: f32,
    pub uniforms: CrossfadeUniforms,
}

/// Host that draws nothing and keeps the last frame for inspection.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    viewport: Viewport,
    frames: u64,
    last: Option<FrameRecord>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last.as_ref()
    }
}

impl SceneHost for HeadlessHost {
    type Error = std::convert::Infallible;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, frame: FrameView<'_>) -> Result<(), Self::Error> {
        self.frames += 1;
        self.last = Some(FrameRecord {
            group_rotation: frame.rig.group_rotation(),
            camera_z: frame.camera.position.z,
            uniforms: *frame.uniforms,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_starts_at_rest() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.05, 0.01));
        assert_eq!(camera.pos_z0, 0.01);
        assert_eq!(camera.pos_z1, 0.8);
    }

    #[test]
    fn points_ahead_of_the_camera_project_inside_clip_space() {
        let camera = Camera::default();
        let clip = camera
            .view_projection(Viewport::new(1600, 900))
            .project_point3(Vec3::new(0.0, 0.05, -3.0));
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn degenerate_viewport_has_unit_aspect() {
        assert_eq!(Viewport::new(0, 600).aspect(), 1.0);
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
    }
}
