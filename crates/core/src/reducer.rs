//! Temporal reducers
//!
//! A reducer collapses an image collection's time dimension into one
//! composite raster, one output pixel per input pixel column.

use serde::{Deserialize, Serialize};

/// Per-pixel aggregation across a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Max,
    Min,
    Mean,
    Median,
    Count,
}

impl Reducer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Count => "count",
        }
    }
}
