use ringconfig::MotionSettings;

use crate::layout::PanelRig;
use crate::material::CrossfadeUniforms;

/// Per-frame coupling of elapsed time, ring spin and shader time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameIntegrator {
    base_spin: f32,
    time_rate: f32,
    turbulence: f32,
}

impl FrameIntegrator {
    pub fn new(base_spin: f32, time_rate: f32, turbulence: f32) -> Self {
        Self {
            base_spin,
            time_rate,
            turbulence,
        }
    }

    pub fn from_settings(settings: &MotionSettings) -> Self {
        Self::new(settings.base_spin, settings.time_rate, settings.turbulence)
    }

    /// Radians per second the group turns at the given transient speed.
    pub fn spin_rate(&self, rotation_speed: f32) -> f32 {
        self.base_spin + rotation_speed
    }

    /// Rate at which shader time runs backwards.
    pub fn time_rate(&self, rotation_speed: f32) -> f32 {
        self.time_rate + rotation_speed * self.turbulence
    }

    /// Reads the rig's rotation speed, so the timeline must have run first.
    pub fn step(&self, delta: f32, rig: &mut PanelRig, uniforms: &mut CrossfadeUniforms) {
        let speed = rig.rotation_speed();
        rig.rotate_group(delta * self.spin_rate(speed));
        uniforms.time -= delta * self.time_rate(speed);
    }
}

impl Default for FrameIntegrator {
    fn default() -> Self {
        Self::from_settings(&MotionSettings::default())
    }
}
