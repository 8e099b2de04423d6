use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

static RGB_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^rgba?\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*(?:,\s*\d*(?:\.\d+)?\s*)?\)$",
    )
    .expect("rgb() pattern compiles")
});

const NAMED_COLORS: [(&str, (u8, u8, u8)); 24] = [
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("lightgray", (211, 211, 211)),
    ("lightgrey", (211, 211, 211)),
    ("silver", (192, 192, 192)),
    ("red", (255, 0, 0)),
    ("maroon", (128, 0, 0)),
    ("tomato", (255, 99, 71)),
    ("orange", (255, 165, 0)),
    ("gold", (255, 215, 0)),
    ("yellow", (255, 255, 0)),
    ("olive", (128, 128, 0)),
    ("green", (0, 128, 0)),
    ("darkgreen", (0, 100, 0)),
    ("lime", (0, 255, 0)),
    ("teal", (0, 128, 128)),
    ("cyan", (0, 255, 255)),
    ("steelblue", (70, 130, 180)),
    ("blue", (0, 0, 255)),
    ("navy", (0, 0, 128)),
    ("purple", (128, 0, 128)),
    ("magenta", (255, 0, 255)),
];

/// Multiplier applied per unit of `brighter(k)`.
const BRIGHTER: f64 = 1.0 / 0.7;

/// An sRGB color with unclamped `0..=255` channels.
///
/// Channels stay unclamped while a color is brightened or interpolated and are
/// only rounded and clamped when formatted, so `c.brighter(2.0)` of a mid-tone
/// keeps its hue instead of saturating one channel early.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn parse(input: &str) -> Result<Self, LayoutError> {
        let raw = input.trim();
        if let Some(hex) = raw.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| LayoutError::InvalidColor(input.to_string()));
        }
        if let Some(caps) = RGB_FUNCTION.captures(raw) {
            let channel = |idx: usize| -> Result<f64, LayoutError> {
                caps[idx]
                    .parse::<f64>()
                    .map_err(|_| LayoutError::InvalidColor(input.to_string()))
            };
            return Ok(Self::rgb(channel(1)?, channel(2)?, channel(3)?));
        }
        let lowered = raw.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, (r, g, b))| Self::rgb(*r as f64, *g as f64, *b as f64))
            .ok_or_else(|| LayoutError::InvalidColor(input.to_string()))
    }

    /// Brighten by `k` steps, each scaling every channel by `1 / 0.7`.
    pub fn brighter(self, k: f64) -> Self {
        let factor = BRIGHTER.powf(k);
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::rgb(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (channel_u8(self.r), channel_u8(self.g), channel_u8(self.b))
    }

    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

fn channel_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            (r, g, b)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            (r, g, b)
        }
        _ => return None,
    };
    Some(Color::rgb(r as f64, g as f64, b as f64))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Opaque `t in [0, 1] -> color` interpolation.
pub type Interpolator = Arc<dyn Fn(f64) -> Color + Send + Sync>;

/// The color range a [`ColorScale`] interpolates across.
#[derive(Clone)]
pub enum ColorRamp {
    /// Piecewise-linear RGB interpolation through the stops, first to last.
    Stops(Vec<Color>),
    Interpolator(Interpolator),
}

impl ColorRamp {
    pub fn stops(colors: Vec<Color>) -> Result<Self, LayoutError> {
        if colors.is_empty() {
            return Err(LayoutError::EmptyColorRamp);
        }
        Ok(Self::Stops(colors))
    }

    /// Two-stop gradient from `seed` to `seed.brighter(brightness)`.
    pub fn from_seed(seed: Color, brightness: f64) -> Self {
        Self::Stops(vec![seed, seed.brighter(brightness)])
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(f64) -> Color + Send + Sync + 'static,
    {
        Self::Interpolator(Arc::new(f))
    }

    pub fn sample(&self, t: f64) -> Color {
        match self {
            Self::Interpolator(f) => f(t),
            Self::Stops(colors) => match colors.as_slice() {
                [] => Color::rgb(0.0, 0.0, 0.0),
                [only] => *only,
                _ => {
                    let segments = (colors.len() - 1) as f64;
                    let position = t * segments;
                    let idx = (position.floor().max(0.0) as usize).min(colors.len() - 2);
                    colors[idx].lerp(colors[idx + 1], position - idx as f64)
                }
            },
        }
    }
}

impl fmt::Debug for ColorRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stops(colors) => {
                let hex: Vec<String> = colors.iter().map(|c| c.to_hex()).collect();
                f.debug_tuple("Stops").field(&hex).finish()
            }
            Self::Interpolator(_) => f.write_str("Interpolator(..)"),
        }
    }
}

/// Continuous mapping from a two-element domain onto a [`ColorRamp`].
///
/// Values outside the domain clamp to the nearest end. A degenerate domain
/// (`d0 == d1`) maps every value to the middle of the ramp.
#[derive(Debug, Clone)]
pub struct ColorScale {
    ramp: ColorRamp,
    domain: [f64; 2],
}

impl ColorScale {
    pub fn new(ramp: ColorRamp, domain: [f64; 2]) -> Self {
        Self { ramp, domain }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn apply(&self, value: f64) -> Color {
        let [d0, d1] = self.domain;
        let span = d1 - d0;
        let t = if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            ((value - d0) / span).clamp(0.0, 1.0)
        };
        self.ramp.sample(t)
    }
}
