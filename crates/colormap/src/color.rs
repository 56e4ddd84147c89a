//! RGB colors and the two spellings the service accepts: CSS-style
//! names and bare 6-digit hex.

use geoscope_core::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Named colors understood in visualization parameters.
const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("gray", Rgb::new(128, 128, 128)),
    ("lightblue", Rgb::new(173, 216, 230)),
    ("lightgreen", Rgb::new(144, 238, 144)),
    ("brown", Rgb::new(165, 42, 42)),
];

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color name or a hex triplet (`"aec3d4"`, `"#aec3d4"`).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if let Some((_, rgb)) = NAMED.iter().find(|(name, _)| *name == lower) {
            return Ok(*rgb);
        }
        Self::parse_hex(s)
    }

    fn parse_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::UnknownColor(s.to_string()));
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| Error::UnknownColor(s.into()))?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| Error::UnknownColor(s.into()))?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| Error::UnknownColor(s.into()))?;
        Ok(Self::new(r, g, b))
    }

    /// Bare lowercase hex, the canonical wire spelling.
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::parse(&s).map_err(serde::de::Error::custom)
    }
}
