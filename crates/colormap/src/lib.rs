//! # geoscope Colormap
//!
//! Color parsing, ordered ramps and categorical palettes for geoscope
//! map layers.
//!
//! The service receives palettes as ordered color lists; this crate owns
//! the client-side spellings (names, hex) and the interpolation used for
//! legend previews.

mod color;
mod palette;
mod ramp;

pub use color::Rgb;
pub use palette::{Palette, IGBP_CLASS_NAMES};
pub use ramp::{ColorRamp, ColorStop};
