//! Value-to-color mapping held by a layer.

use field_common::{Color, ColorError, ColorScale};
use std::fmt;
use std::sync::Arc;

/// How cell values are turned into colors.
///
/// Strings are parsed once when the variant is built, so pixel filling never
/// re-parses or type-checks per cell.
#[derive(Clone)]
pub enum ColorFn {
    /// Every non-missing cell gets the same color.
    Constant(Color),

    /// Multi-stop scale over a value domain.
    Scale(ColorScale),

    /// Caller-supplied mapping.
    Function(Arc<dyn Fn(f64) -> Color + Send + Sync>),
}

impl ColorFn {
    /// Constant color from a color string.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        Ok(ColorFn::Constant(Color::parse(s)?))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(f64) -> Color + Send + Sync + 'static,
    {
        ColorFn::Function(Arc::new(f))
    }

    /// Two-stop white to black scale over `range`.
    pub fn default_for_range(range: (f64, f64)) -> Self {
        ColorFn::Scale(ColorScale::white_to_black().domain(range.0, range.1))
    }

    /// Color for a non-missing value.
    #[inline]
    pub fn color_for(&self, value: f64) -> Color {
        match self {
            ColorFn::Constant(c) => *c,
            ColorFn::Scale(scale) => scale.at(value),
            ColorFn::Function(f) => f(value),
        }
    }
}

impl From<Color> for ColorFn {
    fn from(c: Color) -> Self {
        ColorFn::Constant(c)
    }
}

impl From<ColorScale> for ColorFn {
    fn from(scale: ColorScale) -> Self {
        ColorFn::Scale(scale)
    }
}

impl fmt::Debug for ColorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorFn::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            ColorFn::Scale(s) => f.debug_tuple("Scale").field(s).finish(),
            ColorFn::Function(_) => f.write_str("Function(..)"),
        }
    }
}
