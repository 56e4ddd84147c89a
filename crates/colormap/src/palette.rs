//! Categorical palettes for classified layers.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use geoscope_core::{Error, Result};

/// IGBP land-cover palette: 18 classes, index 0 = water .. 17 = tundra.
const IGBP_HEX: [&str; 18] = [
    "aec3d4", // water
    "152106", "225129", "369b47", "30eb5b", "387242", // forest
    "6a2325", "c3aa69", "b76031", "d9903d", "91af40", // shrub, grass
    "111149", // wetlands
    "cdb33b", // croplands
    "cc0013", // urban
    "33280d", // crop mosaic
    "d7cdcc", // snow and ice
    "f7e084", // barren
    "6f6f6f", // tundra
];

/// IGBP class names, indexed by class code.
pub const IGBP_CLASS_NAMES: [&str; 18] = [
    "water",
    "evergreen needleleaf forest",
    "evergreen broadleaf forest",
    "deciduous needleleaf forest",
    "deciduous broadleaf forest",
    "mixed forest",
    "closed shrublands",
    "open shrublands",
    "woody savannas",
    "savannas",
    "grasslands",
    "permanent wetlands",
    "croplands",
    "urban and built-up",
    "cropland/natural mosaic",
    "snow and ice",
    "barren or sparsely vegetated",
    "tundra",
];

/// An ordered categorical palette: entry `i` colors class code `min + i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Build from an ordered list of colors, one per class code.
    pub fn new(entries: Vec<Rgb>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidParameter {
                name: "entries",
                value: "0".into(),
                reason: "a palette needs at least one entry".into(),
            });
        }
        Ok(Self { entries })
    }

    /// Parse a comma-separated list of color names / hex values.
    pub fn parse(csv: &str) -> Result<Self> {
        let entries: Result<Vec<Rgb>> = csv.split(',').map(Rgb::parse).collect();
        Self::new(entries?)
    }

    /// The 18-entry IGBP land-cover palette.
    pub fn igbp() -> Self {
        let entries = IGBP_HEX
            .iter()
            .map(|hex| Rgb::parse(hex).expect("static palette entry"))
            .collect();
        Self { entries }
    }

    /// Number of class entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Color of the class at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.entries.get(index).copied()
    }

    /// The ordered entries.
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }
}
