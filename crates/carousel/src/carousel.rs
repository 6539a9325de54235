use std::f32::consts::PI;

use ringconfig::{CarouselConfig, ConfigError};

use crate::assets::{TextureAsset, TextureId};
use crate::host::{Camera, FrameView, SceneHost, Viewport};
use crate::integrator::FrameIntegrator;
use crate::layout::{CircleLayout, LayoutError, PanelRig};
use crate::material::{pick_background, CrossfadeMaterial, CrossfadeUniforms, PaletteSource};
use crate::timeline::{AnimationTarget, Phase, TimelineController, TimelineReport, TweenTarget};

#[derive(Debug, thiserror::Error)]
pub enum CarouselError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("background palette is empty")]
    EmptyPalette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub timeline: TimelineReport,
    pub frame_index: u64,
}

/// The running carousel: geometry, material, camera and the animation that
/// drives them.
#[derive(Debug, Clone)]
pub struct Carousel {
    assets: Vec<TextureAsset>,
    rig: PanelRig,
    material: CrossfadeMaterial,
    camera: Camera,
    timeline: TimelineController,
    integrator: FrameIntegrator,
    frames: u64,
}

impl Carousel {
    /// Builds the scene from already loaded assets.
    pub fn build(
        config: &CarouselConfig,
        assets: Vec<TextureAsset>,
        viewport: Viewport,
        palette: &mut dyn PaletteSource,
    ) -> Result<Self, CarouselError> {
        config.validate()?;
        let layout_settings = &config.layout;
        let layout = CircleLayout::from_assets(
            &assets,
            layout_settings.panel_count,
            layout_settings.margin,
        )?;
        let rig = PanelRig::build(
            layout,
            layout_settings.segments_per_unit,
            layout_settings.tilt * PI,
            layout_settings.camera_offset,
        )?;

        let colors = config.palette.rgb()?;
        let (palette_index, background) =
            pick_background(&colors, palette).ok_or(CarouselError::EmptyPalette)?;
        let material = CrossfadeMaterial::new(&assets, &layout, viewport, background)?;

        tracing::info!(
            assets = assets.len(),
            panels = layout.panel_count(),
            radius = layout.radius(),
            aspect = layout.aspect(),
            palette_index,
            "built carousel"
        );

        Ok(Self {
            timeline: TimelineController::from_config(config, assets.len()),
            integrator: FrameIntegrator::from_settings(&config.motion),
            camera: Camera::from_settings(&config.camera),
            assets,
            rig,
            material,
            frames: 0,
        })
    }

    /// Runs one frame: timeline, then integrator, then render.
    pub fn tick<H>(&mut self, delta: f32, host: &mut H) -> Result<TickReport, H::Error>
    where
        H: SceneHost + ?Sized,
    {
        let delta = delta.max(0.0);
        let mut scene = AnimatedScene {
            material: &mut self.material,
            camera: &mut self.camera,
            rig: &mut self.rig,
        };
        let timeline = self.timeline.advance(delta, &mut scene);
        if timeline.entered_loop {
            tracing::info!(frame = self.frames, "intro finished");
        }
        if timeline.repeats > 0 {
            let uniforms = self.material.uniforms();
            tracing::debug!(
                current = %uniforms.current,
                next = %uniforms.next,
                cursor = self.timeline.cursor().value(),
                repeats = timeline.repeats,
                "advanced crossfade pair"
            );
        }

        self.integrator
            .step(delta, &mut self.rig, self.material.uniforms_mut());

        host.render(self.frame_view())?;
        let report = TickReport {
            timeline,
            frame_index: self.frames,
        };
        self.frames += 1;
        Ok(report)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        tracing::debug!(width = viewport.width, height = viewport.height, "resize");
        self.material.resize(viewport.width, viewport.height);
    }

    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            camera: &self.camera,
            rig: &self.rig,
            uniforms: self.material.uniforms(),
        }
    }

    pub fn assets(&self) -> &[TextureAsset] {
        &self.assets
    }

    pub fn asset(&self, id: TextureId) -> Option<&TextureAsset> {
        self.assets.get(id.index())
    }

    pub fn rig(&self) -> &PanelRig {
        &self.rig
    }

    pub fn material(&self) -> &CrossfadeMaterial {
        &self.material
    }

    pub fn uniforms(&self) -> &CrossfadeUniforms {
        self.material.uniforms()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn phase(&self) -> Phase {
        self.timeline.phase()
    }

    pub fn cursor(&self) -> u64 {
        self.timeline.cursor().value()
    }

    pub fn repeats(&self) -> u64 {
        self.timeline.repeats()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Mutable view over the parts of the carousel the timeline writes.
struct AnimatedScene<'a> {
    material: &'a mut CrossfadeMaterial,
    camera: &'a mut Camera,
    rig: &'a mut PanelRig,
}

impl AnimationTarget for AnimatedScene<'_> {
    fn apply(&mut self, target: TweenTarget, value: f32) {
        match target {
            TweenTarget::IntroProgress => self.material.uniforms_mut().intro_progress = value,
            TweenTarget::CameraZ => self.camera.position.z = value,
            TweenTarget::RotationSpeed => self.rig.set_rotation_speed(value),
        }
    }

    fn set_progress(&mut self, progress: f32) {
        self.material.uniforms_mut().progress = progress;
    }

    fn advance_pair(&mut self, next: TextureId) {
        self.material.advance_pair(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::material::FixedPalette;

    const STEP: f32 = 0.0625;

    fn assets(count: usize) -> Vec<TextureAsset> {
        (0..count)
            .map(|i| TextureAsset::solid(format!("asset-{i}"), 3, 2, [i as u8, 0, 0, 255]).unwrap())
            .collect()
    }

    fn build(count: usize) -> (Carousel, HeadlessHost) {
        let viewport = Viewport::new(1280, 720);
        let carousel = Carousel::build(
            &CarouselConfig::default(),
            assets(count),
            viewport,
            &mut FixedPalette(3),
        )
        .unwrap();
        (carousel, HeadlessHost::new(viewport))
    }

    /// Ticks until `predicate` holds, with a generous cap.
    fn run_until(
        carousel: &mut Carousel,
        host: &mut HeadlessHost,
        mut predicate: impl FnMut(&Carousel) -> bool,
    ) {
        for _ in 0..10_000 {
            if predicate(carousel) {
                return;
            }
            carousel.tick(STEP, host).unwrap();
        }
        panic!("condition never reached");
    }

    #[test]
    fn five_asset_scenario() {
        let (mut carousel, mut host) = build(5);
        let expected_radius = 0.5 * 1.5 / (PI / 20.0).tan() + 0.1;
        assert!((carousel.rig().layout().radius() - expected_radius).abs() < 1e-5);
        assert_eq!(carousel.uniforms().current, TextureId(0));
        assert_eq!(carousel.uniforms().next, TextureId(1));
        assert_eq!(carousel.cursor(), 2);

        run_until(&mut carousel, &mut host, |c| c.repeats() == 1);
        assert_eq!(carousel.uniforms().current, TextureId(1));
        assert_eq!(carousel.uniforms().next, TextureId(2));
        assert_eq!(carousel.cursor(), 3);

        run_until(&mut carousel, &mut host, |c| c.repeats() == 5);
        assert_eq!(carousel.cursor(), 7);
        // The pair read the counter before each increment: 2, 3, 4, 5, 6.
        assert_eq!(carousel.uniforms().current, TextureId(0));
        assert_eq!(carousel.uniforms().next, TextureId(1));
        assert_eq!(host.frames(), carousel.frames());
    }

    #[test]
    fn two_assets_alternate() {
        let (mut carousel, mut host) = build(2);
        for repeat in 1..=5u64 {
            run_until(&mut carousel, &mut host, |c| c.repeats() == repeat);
            let uniforms = carousel.uniforms();
            assert_eq!(carousel.cursor(), 2 + repeat);
            assert_eq!(uniforms.current.index(), (repeat % 2) as usize);
            assert_eq!(uniforms.next.index(), ((repeat + 1) % 2) as usize);
        }
    }

    #[test]
    fn progress_is_continuous_across_a_repeat() {
        let (mut carousel, mut host) = build(3);
        run_until(&mut carousel, &mut host, |c| {
            c.phase() == Phase::Loop && c.uniforms().progress == 1.0
        });
        let before = *carousel.uniforms();
        run_until(&mut carousel, &mut host, |c| c.repeats() == 1);
        let after = carousel.uniforms();
        assert_eq!(after.current, before.next);
        assert!(after.progress < 0.1, "{}", after.progress);
    }

    #[test]
    fn intro_reaches_exact_end_values() {
        let (mut carousel, mut host) = build(3);
        run_until(&mut carousel, &mut host, |c| c.phase() == Phase::Loop);
        assert_eq!(carousel.uniforms().intro_progress, 1.0);
        assert_eq!(carousel.camera().position.z, carousel.camera().pos_z1);
        assert_eq!(carousel.rig().rotation_speed(), 0.0);
    }

    #[test]
    fn shader_time_runs_backwards_and_ring_spins() {
        let (mut carousel, mut host) = build(3);
        for _ in 0..64 {
            carousel.tick(STEP, &mut host).unwrap();
        }
        let frame = host.last_frame().unwrap();
        assert!(frame.uniforms.time < 0.0);
        assert!(frame.group_rotation > 0.0);
        assert_eq!(frame.camera_z, carousel.camera().position.z);
    }

    #[test]
    fn resize_is_stored_verbatim() {
        let (mut carousel, _) = build(3);
        carousel.resize(Viewport::new(0, 0));
        assert_eq!(carousel.uniforms().resolution, [0.0, 0.0]);
    }

    #[test]
    fn construction_refuses_a_single_asset() {
        let err = Carousel::build(
            &CarouselConfig::default(),
            assets(1),
            Viewport::new(1, 1),
            &mut FixedPalette(0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CarouselError::Layout(LayoutError::NotEnoughAssets { found: 1 })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = CarouselConfig::default();
        config.layout.panel_count = 2;
        let err = Carousel::build(&config, assets(3), Viewport::new(1, 1), &mut FixedPalette(0))
            .unwrap_err();
        assert!(matches!(err, CarouselError::Config(_)));
    }
}
