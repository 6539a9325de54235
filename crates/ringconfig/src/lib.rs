//! Configuration model for the ringfade carousel.
//!
//! Every tunable of the carousel (panel layout, palette, intro choreography,
//! crossfade cadence, idle motion) lives here so the runtime receives one
//! immutable value at construction. All fields default to the stock
//! choreography; a TOML file only needs to mention what it overrides.

mod ease;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub use ease::{Ease, EaseDirection};

pub const CONFIG_VERSION: u32 = 1;

/// Stock background palette, as sRGB hex strings.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#eef319", "#baed02", "#76f361", "#ff4444", "#c448ff", "#2fe6c6",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration. `version` is required; every section defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarouselConfig {
    pub version: u32,
    /// Seed for the background color pick; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub assets: AssetSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub palette: PaletteSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub intro: IntroSettings,
    #[serde(default)]
    pub crossfade: CrossfadeSettings,
    #[serde(default)]
    pub motion: MotionSettings,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            seed: None,
            assets: AssetSettings::default(),
            layout: LayoutSettings::default(),
            palette: PaletteSettings::default(),
            camera: CameraSettings::default(),
            intro: IntroSettings::default(),
            crossfade: CrossfadeSettings::default(),
            motion: MotionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory that relative image entries are resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Ordered image list; the first image sets the panel aspect ratio.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub panel_count: u32,
    pub segments_per_unit: u32,
    /// Gap added to the radius so neighbouring panels do not touch.
    pub margin: f32,
    /// Wrapper tilt about the viewing axis, as a fraction of pi.
    pub tilt: f32,
    /// Distance the ring is pulled towards the camera (`radius - offset`).
    pub camera_offset: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            panel_count: 20,
            segments_per_unit: 10,
            margin: 0.1,
            tilt: -0.03,
            camera_offset: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub colors: Vec<String>,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl PaletteSettings {
    /// Decodes the palette into 8-bit sRGB triples.
    pub fn rgb(&self) -> Result<Vec<[u8; 3]>, ConfigError> {
        self.colors
            .iter()
            .map(|raw| parse_hex_color(raw).map_err(ConfigError::Invalid))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSettings {
    pub height: f32,
    /// Camera z before the intro dolly.
    pub rest_z: f32,
    /// Camera z once the intro dolly settles.
    pub intro_z: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            height: 0.05,
            rest_z: 0.01,
            intro_z: 0.8,
            fov_degrees: 50.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

/// Duration plus easing for one intro track.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TrackSettings {
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(default)]
    pub ease: Ease,
}

impl TrackSettings {
    pub fn new(duration: Duration, ease: Ease) -> Self {
        Self { duration, ease }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntroSettings {
    #[serde(deserialize_with = "deserialize_duration")]
    pub delay: Duration,
    /// `intro_progress` 0 -> 1.
    pub reveal: TrackSettings,
    /// Camera `rest_z` -> `intro_z`, started together with `reveal`.
    pub dolly: TrackSettings,
    /// Rotation speed 0 -> `peak_speed`.
    pub spin_up: TrackSettings,
    /// Fraction of the dolly duration after which `spin_up` starts.
    pub spin_up_offset: f32,
    /// Rotation speed `peak_speed` -> 0, started when `spin_up` ends.
    pub spin_down: TrackSettings,
    pub peak_speed: f32,
}

impl Default for IntroSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            reveal: TrackSettings::new(
                Duration::from_millis(800),
                Ease::power(1, EaseDirection::In),
            ),
            dolly: TrackSettings::new(
                Duration::from_millis(2500),
                Ease::power(1, EaseDirection::Out),
            ),
            spin_up: TrackSettings::new(
                Duration::from_secs(1),
                Ease::power(1, EaseDirection::In),
            ),
            spin_up_offset: 0.15,
            spin_down: TrackSettings::new(
                Duration::from_secs(3),
                Ease::power(4, EaseDirection::Out),
            ),
            peak_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrossfadeSettings {
    #[serde(deserialize_with = "deserialize_duration")]
    pub delay: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub repeat_delay: Duration,
    pub ease: Ease,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            duration: Duration::from_millis(1600),
            repeat_delay: Duration::from_secs(2),
            ease: Ease::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Idle ring spin in radians per second.
    pub base_spin: f32,
    /// Rate at which shader time runs backwards.
    pub time_rate: f32,
    /// Shader time multiplier applied to the transient rotation speed.
    pub turbulence: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            base_spin: 0.06,
            time_rate: 0.5,
            turbulence: 40.0,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Parses `#rrggbb` (or `rrggbb`) into an sRGB byte triple.
pub fn parse_hex_color(raw: &str) -> Result<[u8; 3], String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!(
            "invalid color '{trimmed}'; expected #rrggbb"
        ));
    }
    let channel = |index: usize| {
        u8::from_str_radix(&digits[index..index + 2], 16)
            .map_err(|_| format!("invalid color '{trimmed}'"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

impl CarouselConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: CarouselConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        let layout = &self.layout;
        if layout.panel_count < 3 {
            return Err(ConfigError::Invalid(format!(
                "layout.panel_count must be at least 3 (got {})",
                layout.panel_count
            )));
        }
        if layout.segments_per_unit == 0 {
            return Err(ConfigError::Invalid(
                "layout.segments_per_unit must be greater than zero".into(),
            ));
        }
        if !layout.margin.is_finite() || layout.margin < 0.0 {
            return Err(ConfigError::Invalid(
                "layout.margin must be a non-negative number".into(),
            ));
        }
        if !layout.tilt.is_finite() || !layout.camera_offset.is_finite() {
            return Err(ConfigError::Invalid(
                "layout.tilt and layout.camera_offset must be finite".into(),
            ));
        }

        if self.palette.colors.is_empty() {
            return Err(ConfigError::Invalid(
                "palette.colors must contain at least one color".into(),
            ));
        }
        self.palette.rgb()?;

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(
                "camera.fov_degrees must be within (0, 180)".into(),
            ));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(ConfigError::Invalid(
                "camera.near must be positive and smaller than camera.far".into(),
            ));
        }

        let intro = &self.intro;
        for (name, track) in [
            ("reveal", &intro.reveal),
            ("dolly", &intro.dolly),
            ("spin_up", &intro.spin_up),
            ("spin_down", &intro.spin_down),
        ] {
            if track.duration.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "intro.{name}.duration must be greater than zero"
                )));
            }
        }
        if !(0.0..=1.0).contains(&intro.spin_up_offset) {
            return Err(ConfigError::Invalid(
                "intro.spin_up_offset must be within [0, 1]".into(),
            ));
        }
        if !intro.peak_speed.is_finite() {
            return Err(ConfigError::Invalid(
                "intro.peak_speed must be finite".into(),
            ));
        }

        if self.crossfade.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "crossfade.duration must be greater than zero".into(),
            ));
        }

        let motion = &self.motion;
        if !(motion.base_spin.is_finite()
            && motion.time_rate.is_finite()
            && motion.turbulence.is_finite())
        {
            return Err(ConfigError::Invalid(
                "motion values must be finite".into(),
            ));
        }

        for image in &self.assets.images {
            if image.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "assets.images contains an empty entry".into(),
                ));
            }
        }

        Ok(())
    }

    /// Resolves configured image entries against `assets.directory`.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        self.assets
            .images
            .iter()
            .map(|entry| {
                let path = PathBuf::from(entry);
                match &self.assets.directory {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1
seed = 7

[assets]
directory = "/srv/faces"
images = ["face1.webp", "face2.webp", "/abs/face3.png"]

[layout]
panel_count = 12
margin = 0.2

[palette]
colors = ["#ff0000", "00ff00"]

[intro]
delay = "750ms"

[intro.spin_down]
duration = 4
ease = "power3.out"

[crossfade]
duration = 1.25
repeat_delay = "3s"
"##;

    #[test]
    fn defaults_match_stock_choreography() {
        let config = CarouselConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.layout.panel_count, 20);
        assert_eq!(config.layout.segments_per_unit, 10);
        assert!((config.layout.margin - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.palette.colors.len(), 6);
        assert_eq!(config.intro.delay, Duration::from_millis(500));
        assert_eq!(config.intro.spin_down.ease, Ease::power(4, EaseDirection::Out));
        assert_eq!(config.crossfade.duration, Duration::from_millis(1600));
        assert_eq!(config.crossfade.ease, Ease::None);
    }

    #[test]
    fn parses_sample_config() {
        let config = CarouselConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.layout.panel_count, 12);
        assert_eq!(config.layout.segments_per_unit, 10);
        assert_eq!(config.intro.delay, Duration::from_millis(750));
        assert_eq!(config.intro.spin_down.duration, Duration::from_secs(4));
        assert_eq!(config.intro.reveal.duration, Duration::from_millis(800));
        assert_eq!(config.crossfade.duration, Duration::from_secs_f64(1.25));
        assert_eq!(config.crossfade.repeat_delay, Duration::from_secs(3));
        assert_eq!(
            config.palette.rgb().unwrap(),
            vec![[255, 0, 0], [0, 255, 0]]
        );
    }

    #[test]
    fn resolves_relative_image_paths() {
        let config = CarouselConfig::from_toml_str(SAMPLE).unwrap();
        let paths = config.image_paths();
        assert_eq!(paths[0], PathBuf::from("/srv/faces/face1.webp"));
        assert_eq!(paths[2], PathBuf::from("/abs/face3.png"));
    }

    #[test]
    fn rejects_small_panel_count() {
        let err = CarouselConfig::from_toml_str("version = 1\n[layout]\npanel_count = 2\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_palette_and_version() {
        let err = CarouselConfig::from_toml_str("version = 1\n[palette]\ncolors = [\"#12345\"]\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CarouselConfig::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_ease() {
        let err = CarouselConfig::from_toml_str(
            "version = 1\n[crossfade]\nease = \"elastic.out\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_crossfade_duration() {
        let err = CarouselConfig::from_toml_str("version = 1\n[crossfade]\nduration = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn version_is_required() {
        let err = CarouselConfig::from_toml_str("").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = CarouselConfig::from_toml_str("[layout]\npanel_count = 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unrepresentable_durations() {
        for raw in ["inf", "1e300"] {
            let input = format!("version = 1\n[crossfade]\nduration = {raw}\n");
            let err = CarouselConfig::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn hex_colors_accept_optional_hash() {
        assert_eq!(parse_hex_color("#eef319").unwrap(), [0xee, 0xf3, 0x19]);
        assert_eq!(parse_hex_color("2fe6c6").unwrap(), [0x2f, 0xe6, 0xc6]);
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
