use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Direction of a power curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

/// Easing curves addressed by their tween-library names (`none`,
/// `power1.in`, `power4.out`, ...).
///
/// `powerK` raises the normalised time to `K + 1`, so `power0` is linear,
/// `power1` quadratic and `power4` quintic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    None,
    Power { degree: u8, direction: EaseDirection },
}

impl Ease {
    pub const LINEAR: Ease = Ease::None;

    pub const fn power(degree: u8, direction: EaseDirection) -> Self {
        Ease::Power { degree, direction }
    }

    /// Maps normalised time onto eased progress. Input is clamped to `[0, 1]`
    /// and both endpoints are returned exactly.
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Ease::None => clamped,
            Ease::Power { degree, direction } => {
                let exponent = i32::from(degree) + 1;
                match direction {
                    EaseDirection::In => clamped.powi(exponent),
                    EaseDirection::Out => 1.0 - (1.0 - clamped).powi(exponent),
                    EaseDirection::InOut => {
                        if clamped < 0.5 {
                            (2.0 * clamped).powi(exponent) * 0.5
                        } else {
                            1.0 - (2.0 * (1.0 - clamped)).powi(exponent) * 0.5
                        }
                    }
                }
            }
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Ease::None
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::None => f.write_str("none"),
            Ease::Power { degree, direction } => {
                let suffix = match direction {
                    EaseDirection::In => "in",
                    EaseDirection::Out => "out",
                    EaseDirection::InOut => "inOut",
                };
                write!(f, "power{degree}.{suffix}")
            }
        }
    }
}

impl FromStr for Ease {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("ease name must not be empty".to_string());
        }

        let normalized = trimmed.to_ascii_lowercase();
        match normalized.as_str() {
            "none" | "linear" => return Ok(Ease::None),
            _ => {}
        }

        let Some(rest) = normalized.strip_prefix("power") else {
            return Err(format!(
                "unknown ease '{trimmed}'; expected none or powerN.in/out/inOut"
            ));
        };
        let (degree, direction) = match rest.split_once('.') {
            Some((degree, direction)) => (degree, direction),
            // A bare `power2` is an ease-out, like the tween libraries it mirrors.
            None => (rest, "out"),
        };
        let degree: u8 = degree
            .parse()
            .map_err(|_| format!("invalid power degree in ease '{trimmed}'"))?;
        if degree > 4 {
            return Err(format!(
                "unsupported power degree {degree} in ease '{trimmed}'; expected 0-4"
            ));
        }
        if degree == 0 {
            return Ok(Ease::None);
        }
        let direction = match direction {
            "in" => EaseDirection::In,
            "out" => EaseDirection::Out,
            "inout" => EaseDirection::InOut,
            other => {
                return Err(format!(
                    "unknown ease direction '{other}' in '{trimmed}'; expected in, out, or inOut"
                ))
            }
        };
        Ok(Ease::Power { degree, direction })
    }
}

impl<'de> Deserialize<'de> for Ease {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Ease {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tween_library_names() {
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::None);
        assert_eq!(
            "power1.in".parse::<Ease>().unwrap(),
            Ease::power(1, EaseDirection::In)
        );
        assert_eq!(
            "power4.out".parse::<Ease>().unwrap(),
            Ease::power(4, EaseDirection::Out)
        );
        assert_eq!(
            "Power2.InOut".parse::<Ease>().unwrap(),
            Ease::power(2, EaseDirection::InOut)
        );
        assert_eq!(
            "power3".parse::<Ease>().unwrap(),
            Ease::power(3, EaseDirection::Out)
        );
        assert!("power9.in".parse::<Ease>().is_err());
        assert!("bounce".parse::<Ease>().is_err());
        assert!("power1.sideways".parse::<Ease>().is_err());
    }

    #[test]
    fn endpoints_are_exact() {
        let eases = [
            Ease::None,
            Ease::power(1, EaseDirection::In),
            Ease::power(1, EaseDirection::Out),
            Ease::power(4, EaseDirection::Out),
            Ease::power(2, EaseDirection::InOut),
        ];
        for ease in eases {
            assert_eq!(ease.sample(0.0), 0.0, "{ease} at 0");
            assert_eq!(ease.sample(1.0), 1.0, "{ease} at 1");
            assert_eq!(ease.sample(-3.0), 0.0, "{ease} clamps below");
            assert_eq!(ease.sample(7.0), 1.0, "{ease} clamps above");
        }
    }

    #[test]
    fn power_curves_bend_the_right_way() {
        let ease_in = Ease::power(1, EaseDirection::In);
        let ease_out = Ease::power(4, EaseDirection::Out);
        assert!((ease_in.sample(0.5) - 0.25).abs() < 1e-6);
        assert!((ease_out.sample(0.5) - (1.0 - 0.5f32.powi(5))).abs() < 1e-6);
        assert!(ease_out.sample(0.2) > Ease::None.sample(0.2));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let ease = Ease::power(4, EaseDirection::Out);
        assert_eq!(ease.to_string(), "power4.out");
        assert_eq!(ease.to_string().parse::<Ease>().unwrap(), ease);
    }
}
