use std::fmt;
use std::str::FromStr;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl FromStr for Antialiasing {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" | "none" | "0" | "1" => Ok(Self::Off),
            other => match other.parse::<u32>() {
                Ok(samples) if samples.is_power_of_two() && samples <= 16 => {
                    Ok(Self::Samples(samples))
                }
                _ => Err(format!(
                    "invalid antialias mode '{value}'; expected auto, off, or 2/4/8/16"
                )),
            },
        }
    }
}

impl fmt::Display for Antialiasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Off => f.write_str("off"),
            Self::Samples(samples) => write!(f, "{samples}"),
        }
    }
}

/// What we learned about the GPU adapter at start-up.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe or SwiftShader.
    pub fn is_software(&self) -> bool {
        is_software_adapter(&self.name, self.device_type)
    }
}

fn is_software_adapter(name: &str, device_type: wgpu::DeviceType) -> bool {
    if device_type == wgpu::DeviceType::Cpu {
        return true;
    }
    let name = name.to_ascii_lowercase();
    ["llvmpipe", "softpipe", "swiftshader", "lavapipe"]
        .iter()
        .any(|marker| name.contains(marker))
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Optional FPS cap; `None` renders as fast as the surface presents.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    pub title: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1600, 900),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            title: "ringfade".to_string(),
        }
    }
}
