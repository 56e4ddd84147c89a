//! Vector tables: boundary feature collections and sampled pixel tables.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::confusion::ErrorMatrix;
use crate::expr::Expr;
use crate::filter::{FilterValue, PropertyFilter};

/// Parameters of a random per-pixel sample draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleParams {
    /// Number of pixels to draw.
    pub num_pixels: u32,
    /// RNG seed for the draw. Two draws from the same image with
    /// different seeds are independent.
    pub seed: u64,
}

impl SampleParams {
    pub fn new(num_pixels: u32, seed: u64) -> Self {
        Self { num_pixels, seed }
    }
}

/// A lazy handle to a named vector dataset (e.g. administrative
/// boundaries), filterable by feature attributes.
#[derive(Debug, Clone)]
pub struct FeatureCollection(Arc<Expr>);

impl FeatureCollection {
    /// Reference a vector dataset by id.
    pub fn load(id: &str) -> Self {
        Self(Arc::new(Expr::LoadTable { id: id.to_string() }))
    }

    /// Keep features whose `property` equals `value` exactly. A value
    /// matching nothing yields an empty collection on the service side.
    pub fn filter_eq(&self, property: &str, value: impl Into<FilterValue>) -> Self {
        Self(Arc::new(Expr::FilterProperty {
            input: Arc::clone(&self.0),
            filter: PropertyFilter::eq(property, value),
        }))
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}

/// A lazy handle to a sampled table of per-pixel band values.
///
/// Produced by [`Image::sample`](crate::image::Image::sample); consumed by
/// classifier training, table classification and accuracy assessment.
#[derive(Debug, Clone)]
pub struct FeatureSet(Arc<Expr>);

impl FeatureSet {
    pub(crate) fn from_expr(expr: Arc<Expr>) -> Self {
        Self(expr)
    }

    /// Drop rows whose `property` is null. Validation samples are
    /// null-filtered on their first feature band before classification.
    pub fn filter_not_null(&self, property: &str) -> Self {
        Self(Arc::new(Expr::FilterProperty {
            input: Arc::clone(&self.0),
            filter: PropertyFilter::not_null(property),
        }))
    }

    /// Classify every row, appending a `classification` column.
    pub fn classify(&self, classifier: &Classifier) -> Self {
        Self(Arc::new(Expr::ClassifyTable {
            input: Arc::clone(&self.0),
            classifier: Arc::clone(classifier.expr()),
        }))
    }

    /// Cross-tabulate a truth column against a prediction column.
    pub fn error_matrix(&self, truth: &str, predicted: &str) -> ErrorMatrix {
        ErrorMatrix::from_expr(Arc::new(Expr::ErrorMatrix {
            table: Arc::clone(&self.0),
            truth: truth.to_string(),
            predicted: predicted.to_string(),
        }))
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}
