//! Ordered color ramps for continuous layers.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use geoscope_core::{Error, Result};

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, color: Rgb) -> Self {
        Self { t, color }
    }
}

/// An ordered multi-stop color ramp.
///
/// The wire format is the ordered color list alone; stops built from a
/// list are evenly spaced, which is also how the service interprets a
/// palette string like `"lightblue,orange,yellow,red,purple"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Build from an ordered color list, stops evenly spaced over [0, 1].
    pub fn from_colors(colors: &[Rgb]) -> Result<Self> {
        if colors.len() < 2 {
            return Err(Error::InvalidParameter {
                name: "colors",
                value: colors.len().to_string(),
                reason: "a ramp needs at least two colors".into(),
            });
        }
        let last = (colors.len() - 1) as f64;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ColorStop::new(i as f64 / last, color))
            .collect();
        Ok(Self { stops })
    }

    /// Parse a comma-separated list of color names / hex values.
    pub fn parse(csv: &str) -> Result<Self> {
        let colors: Result<Vec<Rgb>> = csv.split(',').map(Rgb::parse).collect();
        Self::from_colors(&colors?)
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The ordered colors, as sent on the wire.
    pub fn colors(&self) -> Vec<Rgb> {
        self.stops.iter().map(|s| s.color).collect()
    }

    /// Evaluate at normalized position `t`, clamped to [0, 1], with
    /// linear interpolation between stops.
    pub fn evaluate(&self, t: f64) -> Rgb {
        if t <= 0.0 {
            return self.stops[0].color;
        }
        if t >= 1.0 {
            return self.stops[self.stops.len() - 1].color;
        }
        for i in 1..self.stops.len() {
            if t <= self.stops[i].t {
                let ratio = (t - self.stops[i - 1].t) / (self.stops[i].t - self.stops[i - 1].t);
                return lerp_color(self.stops[i - 1].color, self.stops[i].color, ratio);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

impl Serialize for ColorRamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.colors().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColorRamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let colors = Vec::<Rgb>::deserialize(deserializer)?;
        ColorRamp::from_colors(&colors).map_err(serde::de::Error::custom)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}
