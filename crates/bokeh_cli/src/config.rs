//! Demo configuration file handling
//!
//! The demo reads an optional TOML file with two tables:
//!
//! ```toml
//! [bokeh]
//! count = 30
//! leg_duration_ms = 8000
//! easing = "accelerate_decelerate"
//!
//! [surface]
//! columns = 100
//! rows = 30
//! ```
//!
//! Missing tables and keys fall back to defaults.

use anyhow::{Context, Result};
use bokeh::BokehConfig;
use bokeh_core::{Insets, Size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Full demo configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub bokeh: BokehConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

/// Terminal surface the demo renders into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurfaceConfig {
    /// Character columns
    #[serde(default = "default_columns")]
    pub columns: u16,
    /// Character rows
    #[serde(default = "default_rows")]
    pub rows: u16,
    /// Layout units per column
    #[serde(default = "default_cell_width")]
    pub cell_width: f32,
    /// Layout units per row
    #[serde(default = "default_cell_height")]
    pub cell_height: f32,
    /// Padding on every edge, in layout units
    #[serde(default)]
    pub padding: f32,
    /// Frame rate for simulated and real-time runs
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_columns() -> u16 {
    72
}

fn default_rows() -> u16 {
    24
}

fn default_cell_width() -> f32 {
    8.0
}

fn default_cell_height() -> f32 {
    16.0
}

fn default_fps() -> u32 {
    60
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            rows: default_rows(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            padding: 0.0,
            fps: default_fps(),
        }
    }
}

impl SurfaceConfig {
    /// Host bounds reported to the pool
    pub fn size(&self) -> Size {
        Size::new(
            self.columns as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    pub fn insets(&self) -> Insets {
        Insets::uniform(self.padding)
    }
}

impl DemoConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: DemoConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tables_use_defaults() {
        let config: DemoConfig = toml::from_str("[surface]\ncolumns = 40\n").unwrap();
        assert_eq!(config.surface.columns, 40);
        assert_eq!(config.surface.rows, 24);
        assert_eq!(config.bokeh, BokehConfig::default());
    }

    #[test]
    fn test_surface_size() {
        let surface = SurfaceConfig {
            columns: 10,
            rows: 5,
            ..SurfaceConfig::default()
        };
        assert_eq!(surface.size(), Size::new(80.0, 80.0));
    }

    #[test]
    fn test_load_without_path() {
        let config = DemoConfig::load(None).unwrap();
        assert_eq!(config.surface.fps, 60);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = DemoConfig::load(Some(Path::new("/nonexistent/bokeh.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
