//! Easing curves
//!
//! Maps linear progress (0.0 to 1.0) to an eased interpolation factor.
//! Every curve starts at 0.0 and ends at 1.0.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// Easing curve applied to every channel of a tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Easing {
    /// Constant rate
    #[default]
    Linear,
    /// Starts slow, speeds up (quadratic)
    Accelerate,
    /// Starts fast, slows down (quadratic)
    Decelerate,
    /// Slow at both ends, fast in the middle (cosine S-curve)
    AccelerateDecelerate,
}

impl Easing {
    pub const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::Accelerate,
        Easing::Decelerate,
        Easing::AccelerateDecelerate,
    ];

    /// Apply the curve to a progress value
    ///
    /// Input is clamped to 0.0..=1.0.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Accelerate => t * t,
            Easing::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() * 0.5 + 0.5,
        }
    }

    /// Look up a curve by its integer code (0 = linear, 1 = accelerate,
    /// 2 = decelerate, 3 = accelerate-decelerate)
    ///
    /// Unknown codes fall back to `Linear`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Easing::Linear,
            1 => Easing::Accelerate,
            2 => Easing::Decelerate,
            3 => Easing::AccelerateDecelerate,
            other => {
                tracing::warn!("Unknown easing code {}, falling back to linear", other);
                Easing::Linear
            }
        }
    }

    /// Look up a curve by name
    ///
    /// Case, `-`, `_` and spaces are ignored, so `accelerate_decelerate`,
    /// `accelerate-decelerate` and `AccelerateDecelerate` all match.
    /// Unknown names fall back to `Linear`.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "linear" => Easing::Linear,
            "accelerate" => Easing::Accelerate,
            "decelerate" => Easing::Decelerate,
            "acceleratedecelerate" => Easing::AccelerateDecelerate,
            _ => {
                tracing::warn!("Unknown easing {:?}, falling back to linear", name);
                Easing::Linear
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Accelerate => "accelerate",
            Easing::Decelerate => "decelerate",
            Easing::AccelerateDecelerate => "accelerate_decelerate",
        }
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name)
    }
}

impl From<&str> for Easing {
    fn from(name: &str) -> Self {
        Easing::from_name(name)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing} at 1");
        }
    }

    #[test]
    fn test_curve_shapes() {
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
        assert!(Easing::Accelerate.apply(0.5) < 0.5);
        assert!(Easing::Decelerate.apply(0.5) > 0.5);
        assert!((Easing::AccelerateDecelerate.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::AccelerateDecelerate.apply(0.1) < 0.1);
        assert!(Easing::AccelerateDecelerate.apply(0.9) > 0.9);
    }

    #[test]
    fn test_monotonic() {
        for easing in Easing::ALL {
            let mut prev = easing.apply(0.0);
            for step in 1..=100 {
                let value = easing.apply(step as f32 / 100.0);
                assert!(value >= prev - 1e-6, "{easing} decreased at step {step}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Accelerate.apply(-2.0), 0.0);
        assert_eq!(Easing::Decelerate.apply(3.0), 1.0);
    }

    #[test]
    fn test_unknown_falls_back_to_linear() {
        assert_eq!(Easing::from_code(3), Easing::AccelerateDecelerate);
        assert_eq!(Easing::from_code(42), Easing::Linear);
        assert_eq!(Easing::from_code(-1), Easing::Linear);
        assert_eq!(Easing::from_name("bounce"), Easing::Linear);
    }

    #[test]
    fn test_name_spellings() {
        assert_eq!(
            Easing::from_name("accelerate-decelerate"),
            Easing::AccelerateDecelerate
        );
        assert_eq!(
            Easing::from_name("AccelerateDecelerate"),
            Easing::AccelerateDecelerate
        );
        for easing in Easing::ALL {
            assert_eq!(Easing::from_name(easing.name()), easing);
        }
    }

    #[derive(Deserialize)]
    struct Holder {
        easing: Easing,
    }

    #[test]
    fn test_deserialize_with_fallback() {
        let h: Holder = toml::from_str("easing = \"decelerate\"").unwrap();
        assert_eq!(h.easing, Easing::Decelerate);

        let h: Holder = toml::from_str("easing = \"wobble\"").unwrap();
        assert_eq!(h.easing, Easing::Linear);
    }
}
