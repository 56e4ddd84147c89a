//! Backend response models.
//!
//! Lightweight serde types for what terminal actions return: sampled
//! tables, selected-scene metadata, and rendered-map handles.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One sampled pixel: column name to value, null when the pixel had no
/// data in that band.
pub type Row = BTreeMap<String, Option<f64>>;

/// A materialized table of sampled pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, null where absent.
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(name).copied().flatten())
            .collect()
    }

    /// Whether any row has a null (or missing) value in `name`.
    pub fn has_nulls_in(&self, name: &str) -> bool {
        self.rows
            .iter()
            .any(|row| row.get(name).copied().flatten().is_none())
    }
}

/// Metadata of a scene selected from a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// One rendered overlay: the service returns a tile/image URL per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedLayer {
    pub name: String,
    pub url: String,
}

/// The result of rendering a map document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedMap {
    pub layers: Vec<RenderedLayer>,
}

impl RenderedMap {
    /// Find a rendered layer by name.
    pub fn layer(&self, name: &str) -> Option<&RenderedLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}
