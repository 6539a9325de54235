use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::{TextureAsset, TextureId};
use crate::host::Viewport;
use crate::layout::{CircleLayout, LayoutError};

/// Picks the background palette entry once per session.
pub trait PaletteSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform draw backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomPalette {
    rng: StdRng,
}

impl RandomPalette {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PaletteSource for RandomPalette {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always picks the same entry (wrapped to the palette length).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPalette(pub usize);

impl PaletteSource for FixedPalette {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}

/// Colour in linear light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearColor {
    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        let [r, g, b] = rgb.map(|channel| srgb_to_linear(f32::from(channel) / 255.0));
        Self { r, g, b }
    }

    /// Display-space components, as written to the shader.
    pub fn to_srgb(self) -> [f32; 3] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        ]
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}

/// Draws one background colour from `palette`. `None` when it is empty.
pub fn pick_background(
    palette: &[[u8; 3]],
    source: &mut dyn PaletteSource,
) -> Option<(usize, LinearColor)> {
    if palette.is_empty() {
        return None;
    }
    let index = source.pick(palette.len()).min(palette.len() - 1);
    Some((index, LinearColor::from_srgb8(palette[index])))
}

/// Values read by the card shader every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeUniforms {
    pub current: TextureId,
    pub next: TextureId,
    pub aspect: f32,
    pub progress: f32,
    pub time: f32,
    pub position_radius: f32,
    pub bg_color: [f32; 3],
    pub resolution: [f32; 2],
    pub intro_progress: f32,
}

/// The single material shared by every panel.
#[derive(Debug, Clone)]
pub struct CrossfadeMaterial {
    uniforms: CrossfadeUniforms,
    background: LinearColor,
}

impl CrossfadeMaterial {
    pub fn new(
        assets: &[TextureAsset],
        layout: &CircleLayout,
        viewport: Viewport,
        background: LinearColor,
    ) -> Result<Self, LayoutError> {
        if assets.len() < 2 {
            return Err(LayoutError::NotEnoughAssets {
                found: assets.len(),
            });
        }
        Ok(Self {
            uniforms: CrossfadeUniforms {
                current: TextureId(0),
                next: TextureId(1),
                aspect: layout.aspect(),
                progress: 0.0,
                time: 0.0,
                position_radius: layout.radius(),
                bg_color: background.to_srgb(),
                resolution: viewport.as_resolution(),
                intro_progress: 0.0,
            },
            background,
        })
    }

    pub fn uniforms(&self) -> &CrossfadeUniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut CrossfadeUniforms {
        &mut self.uniforms
    }

    pub fn background(&self) -> LinearColor {
        self.background
    }

    /// Only the resolution uniform follows the viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.uniforms.resolution = [width as f32, height as f32];
    }

    /// Swaps in the next pair: the old `next` becomes `current` and progress
    /// starts over.
    pub fn advance_pair(&mut self, next: TextureId) {
        self.uniforms.current = self.uniforms.next;
        self.uniforms.next = next;
        self.uniforms.progress = 0.0;
    }
}
