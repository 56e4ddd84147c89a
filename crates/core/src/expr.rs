//! The serializable expression graph.
//!
//! Every descriptor the client builds is a node in this tree. Nothing is
//! evaluated locally: a terminal action serializes the graph to JSON and
//! submits it to a backend. Nodes are shared via `Arc`, so wrapper clones
//! and diamond-shaped graphs (one masked scene feeding two sample draws)
//! are cheap.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::date::DateRange;
use crate::filter::PropertyFilter;
use crate::geometry::Geometry;
use crate::reducer::Reducer;

/// One node of the query graph sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Expr {
    /// Load an image collection by product id.
    LoadCollection { id: String },
    /// Load a single image asset by id.
    LoadImage { id: String },
    /// Load a feature collection (vector table) by id.
    LoadTable { id: String },

    /// Keep observations whose date falls inside the range.
    FilterDate { input: Arc<Expr>, range: DateRange },
    /// Keep observations intersecting the geometry.
    FilterBounds { input: Arc<Expr>, geometry: Geometry },
    /// Keep features/rows matching a property filter.
    FilterProperty {
        input: Arc<Expr>,
        filter: PropertyFilter,
    },

    /// Order a collection by a metadata property.
    Sort {
        input: Arc<Expr>,
        property: String,
        ascending: bool,
    },
    /// Take the first element of a collection.
    First { input: Arc<Expr> },
    /// Collapse the time dimension per pixel.
    Reduce { input: Arc<Expr>, reducer: Reducer },

    /// Keep only the named bands.
    Select { input: Arc<Expr>, bands: Vec<String> },
    /// Restrict an image to a vector region.
    Clip { input: Arc<Expr>, region: Arc<Expr> },

    /// Per-pixel cloud contamination likelihood band (0..100).
    CloudScore { input: Arc<Expr> },
    /// 1 where every band of the input is unmasked, 0 elsewhere.
    ValidMask { input: Arc<Expr> },
    /// The input image's own mask band.
    MaskOf { input: Arc<Expr> },
    /// 1 where the input is <= the threshold.
    Lte { input: Arc<Expr>, value: f64 },
    /// Logical AND of two mask images.
    And { left: Arc<Expr>, right: Arc<Expr> },
    /// Exclude pixels where the mask is 0.
    UpdateMask { input: Arc<Expr>, mask: Arc<Expr> },

    /// Append the bands of another image.
    AddBands { input: Arc<Expr>, bands: Arc<Expr> },
    /// (a - b) / (a + b) over two named bands.
    NormalizedDifference {
        input: Arc<Expr>,
        bands: [String; 2],
    },
    /// Per-pixel difference of two images.
    Subtract { left: Arc<Expr>, right: Arc<Expr> },

    /// Random per-pixel sample of fixed size with a fixed seed.
    Sample {
        input: Arc<Expr>,
        num_pixels: u32,
        seed: u64,
    },

    /// Fit a random forest on a sampled table.
    TrainClassifier {
        features: Arc<Expr>,
        trees: u32,
        class_property: String,
        input_properties: Vec<String>,
    },
    /// Apply a trained classifier to every pixel of an image.
    ClassifyImage {
        input: Arc<Expr>,
        classifier: Arc<Expr>,
    },
    /// Apply a trained classifier to every row of a table.
    ClassifyTable {
        input: Arc<Expr>,
        classifier: Arc<Expr>,
    },

    /// Resubstitution error matrix of a trained classifier.
    ConfusionMatrix { classifier: Arc<Expr> },
    /// Cross-tabulate a truth column against a prediction column.
    ErrorMatrix {
        table: Arc<Expr>,
        truth: String,
        predicted: String,
    },
}

impl Expr {
    /// Wire name of this operation, as it appears in the `op` tag.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::LoadCollection { .. } => "loadCollection",
            Self::LoadImage { .. } => "loadImage",
            Self::LoadTable { .. } => "loadTable",
            Self::FilterDate { .. } => "filterDate",
            Self::FilterBounds { .. } => "filterBounds",
            Self::FilterProperty { .. } => "filterProperty",
            Self::Sort { .. } => "sort",
            Self::First { .. } => "first",
            Self::Reduce { .. } => "reduce",
            Self::Select { .. } => "select",
            Self::Clip { .. } => "clip",
            Self::CloudScore { .. } => "cloudScore",
            Self::ValidMask { .. } => "validMask",
            Self::MaskOf { .. } => "maskOf",
            Self::Lte { .. } => "lte",
            Self::And { .. } => "and",
            Self::UpdateMask { .. } => "updateMask",
            Self::AddBands { .. } => "addBands",
            Self::NormalizedDifference { .. } => "normalizedDifference",
            Self::Subtract { .. } => "subtract",
            Self::Sample { .. } => "sample",
            Self::TrainClassifier { .. } => "trainClassifier",
            Self::ClassifyImage { .. } => "classifyImage",
            Self::ClassifyTable { .. } => "classifyTable",
            Self::ConfusionMatrix { .. } => "confusionMatrix",
            Self::ErrorMatrix { .. } => "errorMatrix",
        }
    }
}
