//! # geoscope Map
//!
//! Client-side map composition. A [`MapView`] collects image layers with
//! their visualization parameters plus an optional title label, and
//! serializes to the map document the service renders. No tiling or
//! pixel work happens locally.

mod document;

pub use document::{Label, LabelPosition, Layer, LonLat, MapView, VisParams};
