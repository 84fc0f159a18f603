//! Multi-stop color scales over a value domain.

use crate::{Color, ColorError};
use serde::{Deserialize, Serialize};

/// Evenly spaced color stops stretched over a `(min, max)` domain.
///
/// Values are interpolated linearly in RGB between neighbouring stops and
/// clamped to the end colors outside the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    colors: Vec<Color>,
    domain: (f64, f64),
}

impl ColorScale {
    /// Scale over the default domain `(0.0, 1.0)`.
    pub fn new(colors: Vec<Color>) -> Result<Self, ColorError> {
        if colors.is_empty() {
            return Err(ColorError::EmptyScale);
        }
        Ok(Self {
            colors,
            domain: (0.0, 1.0),
        })
    }

    /// Build from color strings, e.g. `["white", "black"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ColorError> {
        let colors = names
            .iter()
            .map(|n| Color::parse(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// The white to black scale used when a layer has no color configured.
    pub fn white_to_black() -> Self {
        Self {
            colors: vec![Color::white(), Color::black()],
            domain: (0.0, 1.0),
        }
    }

    /// Set the value domain.
    pub fn domain(mut self, min: f64, max: f64) -> Self {
        self.domain = (min, max);
        self
    }

    pub fn get_domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Color for a value.
    pub fn at(&self, value: f64) -> Color {
        let (min, max) = self.domain;
        let last = self.colors.len() - 1;
        if last == 0 {
            return self.colors[0];
        }

        let span = max - min;
        let t = if span == 0.0 || !value.is_finite() {
            0.0
        } else {
            ((value - min) / span).clamp(0.0, 1.0)
        };

        let pos = t * last as f64;
        let idx = (pos.floor() as usize).min(last - 1);
        let frac = pos - idx as f64;
        self.colors[idx].mix(&self.colors[idx + 1], frac)
    }
}
