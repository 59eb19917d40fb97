//! Pool configuration
//!
//! `BokehConfig` is a plain struct with defaults matching the classic look:
//! twenty gray discs drifting over 100 second legs. It deserializes from
//! any serde format; missing fields take their defaults.

use crate::error::{BokehError, Result};
use bokeh_animation::Easing;
use bokeh_core::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNT: u32 = 20;
pub const DEFAULT_LEG_DURATION_MS: u64 = 100_000;
pub const DEFAULT_TRAVEL: f32 = 500.0;
pub const DEFAULT_MAX_SCALE: f32 = 0.5;

/// Translucent gray, alpha 150/255
pub fn default_color() -> Color {
    Color::from_argb8(150, 100, 100, 100)
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_leg_duration_ms() -> u64 {
    DEFAULT_LEG_DURATION_MS
}

fn default_travel() -> f32 {
    DEFAULT_TRAVEL
}

fn default_max_scale() -> f32 {
    DEFAULT_MAX_SCALE
}

/// Configuration for a bokeh pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BokehConfig {
    /// Number of particles in the pool
    #[serde(default = "default_count")]
    pub count: u32,
    /// Duration of every leg; also the span of the initial stagger wave
    #[serde(default = "default_leg_duration_ms")]
    pub leg_duration_ms: u64,
    /// Easing applied to every leg
    #[serde(default)]
    pub easing: Easing,
    /// Largest translation offset per axis, in either direction
    #[serde(default = "default_travel")]
    pub travel: f32,
    /// Upper bound of the per-particle scale, drawn once at creation
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    /// Fill color shared by every particle
    #[serde(default = "default_color")]
    pub color: Color,
}

impl Default for BokehConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            leg_duration_ms: DEFAULT_LEG_DURATION_MS,
            color: default_color(),
            easing: Easing::Linear,
            travel: DEFAULT_TRAVEL,
            max_scale: DEFAULT_MAX_SCALE,
        }
    }
}

impl BokehConfig {
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_leg_duration_ms(mut self, duration_ms: u64) -> Self {
        self.leg_duration_ms = duration_ms;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_travel(mut self, travel: f32) -> Self {
        self.travel = travel;
        self
    }

    pub fn with_max_scale(mut self, max_scale: f32) -> Self {
        self.max_scale = max_scale;
        self
    }

    /// Check every invariant the scheduler relies on
    pub fn validate(&self) -> Result<()> {
        if self.count < 1 {
            return Err(BokehError::InvalidCount(self.count));
        }
        if self.leg_duration_ms == 0 {
            return Err(BokehError::InvalidDuration(self.leg_duration_ms));
        }
        if !self.travel.is_finite() || self.travel < 0.0 {
            return Err(BokehError::InvalidTravel(self.travel));
        }
        if !self.max_scale.is_finite() || self.max_scale < 0.0 {
            return Err(BokehError::InvalidScale(self.max_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BokehConfig::default();
        assert_eq!(config.count, 20);
        assert_eq!(config.leg_duration_ms, 100_000);
        assert_eq!(config.easing, Easing::Linear);
        assert!((config.color.a - 150.0 / 255.0).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = BokehConfig::default();
        assert_eq!(
            base.clone().with_count(0).validate(),
            Err(BokehError::InvalidCount(0))
        );
        assert_eq!(
            base.clone().with_leg_duration_ms(0).validate(),
            Err(BokehError::InvalidDuration(0))
        );
        assert!(matches!(
            base.clone().with_travel(-1.0).validate(),
            Err(BokehError::InvalidTravel(_))
        ));
        assert!(matches!(
            base.clone().with_travel(f32::NAN).validate(),
            Err(BokehError::InvalidTravel(_))
        ));
        assert!(matches!(
            base.with_max_scale(f32::INFINITY).validate(),
            Err(BokehError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BokehConfig = toml::from_str(
            r#"
            count = 4
            easing = "accelerate-decelerate"
            "#,
        )
        .unwrap();

        assert_eq!(config.count, 4);
        assert_eq!(config.easing, Easing::AccelerateDecelerate);
        assert_eq!(config.leg_duration_ms, DEFAULT_LEG_DURATION_MS);
        assert_eq!(config.color, default_color());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = BokehConfig::default()
            .with_count(7)
            .with_easing(Easing::Decelerate);
        let text = toml::to_string(&config).unwrap();
        let back: BokehConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
