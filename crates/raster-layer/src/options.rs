//! Layer options and their JSON configuration form.
//!
//! ```json
//! {
//!   "color": { "scale": ["#2c7bb6", "#ffffbf", "#d7191c"], "domain": [-10, 35] },
//!   "interpolate": false,
//!   "opacity": 0.8
//! }
//! ```
//!
//! `color` may also be a single color string (`"steelblue"`, `"#ff000080"`).
//! A scale without `domain` is stretched over the field's value range.

use field_common::{Color, ColorScale};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ColorFn, RenderError, RenderResult};

/// Runtime options of a scalar field layer.
#[derive(Debug, Clone)]
pub struct LayerOptions {
    /// Value to color mapping; `None` means a white to black scale over the
    /// field range
    pub color: Option<ColorFn>,
    /// Reserved. Cells are drawn as flat pixels regardless.
    pub interpolate: bool,
    pub opacity: f32,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            color: None,
            interpolate: false,
            opacity: 1.0,
        }
    }
}

impl LayerOptions {
    pub fn with_color(mut self, color: impl Into<ColorFn>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Color setting as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Constant(String),
    Scale {
        scale: Vec<String>,
        #[serde(default)]
        domain: Option<(f64, f64)>,
    },
}

impl ColorSpec {
    /// Parse into a color function; scales without a domain use `range`.
    pub fn resolve(&self, range: (f64, f64)) -> RenderResult<ColorFn> {
        match self {
            ColorSpec::Constant(s) => Ok(ColorFn::Constant(Color::parse(s)?)),
            ColorSpec::Scale { scale, domain } => {
                let (min, max) = domain.unwrap_or(range);
                Ok(ColorFn::Scale(ColorScale::from_names(scale.as_slice())?.domain(min, max)))
            }
        }
    }
}

/// Serializable layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(default)]
    pub color: Option<ColorSpec>,

    #[serde(default)]
    pub interpolate: bool,

    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            color: None,
            interpolate: false,
            opacity: default_opacity(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let config: LayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RenderResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(RenderError::ConfigError(format!(
                "opacity must be within 0..1, got {}",
                self.opacity
            )));
        }
        if let Some(ColorSpec::Scale { scale, .. }) = &self.color {
            if scale.is_empty() {
                return Err(RenderError::ConfigError("color scale is empty".to_string()));
            }
        }
        Ok(())
    }

    /// Build runtime options for a field with value range `range`.
    pub fn resolve(&self, range: (f64, f64)) -> RenderResult<LayerOptions> {
        let color = self
            .color
            .as_ref()
            .map(|spec| spec.resolve(range))
            .transpose()?;

        Ok(LayerOptions {
            color,
            interpolate: self.interpolate,
            opacity: self.opacity,
        })
    }
}
