//! Color values and parsing.
//!
//! Colors hold 8-bit RGB channels and a fractional alpha in `0.0..=1.0`.
//! Strings are accepted in the usual map-styling forms:
//! - Hex: `#rgb`, `#rrggbb`, `#rrggbbaa`
//! - Functional: `rgb(r, g, b)`, `rgba(r, g, b, a)`
//! - Named: `white`, `steelblue`, `transparent`, ...

use crate::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGBA color with fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity from 0.0 (transparent) to 1.0 (opaque)
    pub a: f64,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Parse a hex, functional or named color string.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(s.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return parse_functional(&lower).ok_or_else(|| ColorError::InvalidFunction(s.to_string()));
        }

        named_color(&lower).ok_or_else(|| ColorError::Unknown(s.to_string()))
    }

    /// Decompose into `(r, g, b, a)` with alpha as a 0-1 fraction.
    pub fn rgba(&self) -> (u8, u8, u8, f64) {
        (self.r, self.g, self.b, self.a)
    }

    /// Linear interpolation in RGB space; `t` is clamped to `0..=1`.
    pub fn mix(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp_u8 = |a: u8, b: u8| -> u8 { ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8 };

        Color::new(
            lerp_u8(self.r, other.r),
            lerp_u8(self.g, other.g),
            lerp_u8(self.b, other.b),
            self.a * (1.0 - t) + other.a * t,
        )
    }

    /// CSS hex form, alpha included only when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.a * 255.0).round() as u8;
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a)
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    // Short form: each digit doubled
    let short = |s: &str| channel(s).map(|v| v * 17);

    match hex.len() {
        3 => Some(Color::rgb(short(&hex[0..1])?, short(&hex[1..2])?, short(&hex[2..3])?)),
        6 => Some(Color::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])? as f64 / 255.0,
        )),
        _ => None,
    }
}

fn parse_functional(s: &str) -> Option<Color> {
    let (name, rest) = s.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();

    let channel = |p: &str| -> Option<u8> {
        let v: f64 = p.parse().ok()?;
        if !(0.0..=255.0).contains(&v) {
            return None;
        }
        Some(v.round() as u8)
    };

    match (name.trim(), parts.len()) {
        ("rgb", 3) => Some(Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?)),
        ("rgba", 4) => {
            let a: f64 = parts[3].parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            Some(Color::new(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                a,
            ))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "transparent" => return Some(Color::transparent()),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "steelblue" => (70, 130, 180),
        "skyblue" => (135, 206, 235),
        "darkred" => (139, 0, 0),
        _ => return None,
    };
    Some(Color::rgb(r, g, b))
}
