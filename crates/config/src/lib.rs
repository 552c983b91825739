//! Live-tunable sculpting parameters
//!
//! This crate is the single source of truth for the brush parameters shown
//! on the parameter panel and consumed by the sculpting core, along with
//! their defaults and the clamping applied before every stroke.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default brush radius in mesh units
pub const DEFAULT_RADIUS: f32 = 0.1;

/// Default displacement per unit falloff weight
pub const DEFAULT_INTENSITY: f32 = 0.002;

/// Default depth for the brush indicator (not read by the core)
pub const DEFAULT_DEPTH: u32 = 10;

/// Smallest radius a stroke will ever run with
pub const MIN_BRUSH_RADIUS: f32 = 1e-4;

/// Environment variable overriding the brush radius
pub const ENV_RADIUS: &str = "SCULPT_RADIUS";
/// Environment variable overriding the intensity
pub const ENV_INTENSITY: &str = "SCULPT_INTENSITY";
/// Environment variable overriding the indicator depth
pub const ENV_DEPTH: &str = "SCULPT_DEPTH";
/// Environment variable overriding flat shading (`1`/`0`, `true`/`false`)
pub const ENV_FLAT_SHADING: &str = "SCULPT_FLAT_SHADING";

/// Errors from loading parameters
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse sculpt parameters: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Brush parameters exposed on the parameter panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct SculptParams {
    /// Brush radius in mesh units (> 0 after sanitizing)
    pub radius: f32,
    /// Displacement at the brush center (>= 0 after sanitizing)
    pub intensity: f32,
    /// Depth used by the brush indicator only
    pub depth: u32,
    /// Faceted instead of smooth shading; affects rendering only
    pub flat_shading: bool,
}

impl Default for SculptParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            intensity: DEFAULT_INTENSITY,
            depth: DEFAULT_DEPTH,
            flat_shading: false,
        }
    }
}

impl SculptParams {
    /// Create parameters with the given radius and intensity
    pub fn new(radius: f32, intensity: f32) -> Self {
        Self {
            radius,
            intensity,
            ..Self::default()
        }
    }

    /// Radius clamped to [`MIN_BRUSH_RADIUS`]; non-finite values clamp too
    pub fn clamped_radius(&self) -> f32 {
        if self.radius.is_finite() && self.radius >= MIN_BRUSH_RADIUS {
            self.radius
        } else {
            MIN_BRUSH_RADIUS
        }
    }

    /// Intensity clamped to zero; non-finite values clamp too
    pub fn clamped_intensity(&self) -> f32 {
        if self.intensity.is_finite() && self.intensity >= 0.0 {
            self.intensity
        } else {
            0.0
        }
    }

    /// Copy with radius and intensity clamped to their valid ranges
    pub fn sanitized(&self) -> Self {
        let sanitized = Self {
            radius: self.clamped_radius(),
            intensity: self.clamped_intensity(),
            ..*self
        };
        if sanitized.radius != self.radius || sanitized.intensity != self.intensity {
            warn!(
                "Clamped sculpt parameters: radius {} -> {}, intensity {} -> {}",
                self.radius, sanitized.radius, self.intensity, sanitized.intensity
            );
        }
        sanitized
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Defaults overridden by `SCULPT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup (environment, CLI, tests)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_RADIUS) {
            self.radius = parse_var(ENV_RADIUS, value)?;
        }
        if let Some(value) = lookup(ENV_INTENSITY) {
            self.intensity = parse_var(ENV_INTENSITY, value)?;
        }
        if let Some(value) = lookup(ENV_DEPTH) {
            self.depth = parse_var(ENV_DEPTH, value)?;
        }
        if let Some(value) = lookup(ENV_FLAT_SHADING) {
            self.flat_shading = match value.trim() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_FLAT_SHADING,
                        value,
                    })
                }
            };
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SculptParams::default();
        assert_eq!(params.radius, DEFAULT_RADIUS);
        assert_eq!(params.intensity, DEFAULT_INTENSITY);
        assert_eq!(params.depth, DEFAULT_DEPTH);
        assert!(!params.flat_shading);
    }

    #[test]
    fn test_sanitized_clamps_invalid_values() {
        let params = SculptParams::new(-1.0, -0.5).sanitized();
        assert_eq!(params.radius, MIN_BRUSH_RADIUS);
        assert_eq!(params.intensity, 0.0);

        let params = SculptParams::new(0.0, f32::NAN).sanitized();
        assert_eq!(params.radius, MIN_BRUSH_RADIUS);
        assert_eq!(params.intensity, 0.0);

        let params = SculptParams::new(0.25, 0.01);
        assert_eq!(params.sanitized(), params);
    }

    #[test]
    fn test_json_partial_fields_use_defaults() {
        let params = SculptParams::from_json(r#"{ "radius": 0.3, "flat_shading": true }"#).unwrap();
        assert_eq!(params.radius, 0.3);
        assert_eq!(params.intensity, DEFAULT_INTENSITY);
        assert!(params.flat_shading);

        let json = params.to_json().unwrap();
        assert_eq!(SculptParams::from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_json_parse_error() {
        assert!(matches!(
            SculptParams::from_json("{ radius: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let params = SculptParams::default()
            .with_overrides(|name| match name {
                ENV_RADIUS => Some("0.5".to_string()),
                ENV_FLAT_SHADING => Some("on".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(params.radius, 0.5);
        assert_eq!(params.intensity, DEFAULT_INTENSITY);
        assert!(params.flat_shading);

        let err = SculptParams::default()
            .with_overrides(|name| (name == ENV_DEPTH).then(|| "deep".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_DEPTH, .. }));
    }
}
