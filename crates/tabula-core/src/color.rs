//! Typed colors and palettes
//!
//! External color strings (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`,
//! `rgba(..)`, a few CSS names) are parsed once into [`Color`]; contrast and
//! blending only ever operate on the typed value.

use crate::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any supported external color string
    pub fn parse(input: &str) -> ChartResult<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex).ok_or_else(|| invalid(input));
        }
        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::from_functional(body).ok_or_else(|| invalid(input));
        }
        Self::named(&lower).ok_or_else(|| invalid(input))
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// `r, g, b` or `r, g, b, a` with alpha in [0, 1]
    fn from_functional(body: &str) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let channel = |s: &str| -> Option<u8> {
            let v: f64 = s.parse().ok()?;
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        match parts.as_slice() {
            [r, g, b] => Some(Self::rgb(channel(r)?, channel(g)?, channel(b)?)),
            [r, g, b, a] => {
                let alpha: f64 = a.parse().ok()?;
                Some(Self::rgba(
                    channel(r)?,
                    channel(g)?,
                    channel(b)?,
                    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
                ))
            }
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Self> {
        let c = match name {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "transparent" => Self::TRANSPARENT,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "yellow" => Self::rgb(255, 255, 0),
            "teal" => Self::rgb(0, 128, 128),
            "navy" => Self::rgb(0, 0, 128),
            _ => return None,
        };
        Some(c)
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Perceived luminance in [0, 1] (Rec. 601 weights); the measure
    /// behind the text contrast threshold
    pub fn luminance(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    pub fn is_light(&self) -> bool {
        self.luminance() > 0.6
    }

    /// Dark text on light backgrounds, light text on dark ones
    pub fn contrast_text(&self) -> Color {
        if self.is_light() {
            crate::colors::TEXT_DARK
        } else {
            crate::colors::TEXT_LIGHT
        }
    }

    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..*self
        }
    }

    /// Linear interpolation toward `other`; `t = 0` is `self`
    pub fn blend(&self, other: Color, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn lighten(&self, amount: f64) -> Self {
        let mut c = self.blend(Self::WHITE, amount);
        c.a = self.a;
        c
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(..)` otherwise
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.alpha())
        }
    }
}

fn invalid(input: &str) -> ChartError {
    ChartError::configuration(format!("unrecognized color '{input}'"))
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_css()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

// ============================================================================
// PALETTE
// ============================================================================

/// Built-in categorical palette
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::rgb(66, 133, 244),
    Color::rgb(52, 168, 83),
    Color::rgb(251, 140, 0),
    Color::rgb(142, 68, 173),
    Color::rgb(234, 67, 53),
    Color::rgb(0, 172, 193),
    Color::rgb(251, 188, 5),
    Color::rgb(216, 27, 96),
];

/// Ordered colors indexed with wraparound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette(Vec<Color>);

impl Palette {
    /// An empty list falls back to [`DEFAULT_PALETTE`]
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            tracing::debug!("Empty palette, using default palette");
            Self::default()
        } else {
            Self(colors)
        }
    }

    /// Parse color strings; fails on the first unrecognized entry
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> ChartResult<Self> {
        colors
            .iter()
            .map(|c| Color::parse(c.as_ref()))
            .collect::<ChartResult<Vec<_>>>()
            .map(Self::new)
    }

    /// Color at `index`, wrapping around the palette length
    pub fn color(&self, index: usize) -> Color {
        self.0[index % self.0.len()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.to_vec())
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(p: Palette) -> Self {
        p.0
    }
}
