//! Confusion matrices and the descriptors that request them.

use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::Expr;

/// A lazy handle to an accuracy assessment on the service.
///
/// Obtained from [`Classifier::confusion_matrix`](crate::classifier::Classifier::confusion_matrix)
/// (resubstitution) or [`FeatureSet::error_matrix`](crate::table::FeatureSet::error_matrix)
/// (held-out validation). A backend evaluates it into a [`ConfusionMatrix`].
#[derive(Debug, Clone)]
pub struct ErrorMatrix(Arc<Expr>);

impl ErrorMatrix {
    pub(crate) fn from_expr(expr: Arc<Expr>) -> Self {
        Self(expr)
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}

/// A materialized cross-tabulation of truth vs predicted class labels.
///
/// Rows are truth classes, columns are predicted classes, both ordered by
/// ascending class code.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<u32>,
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    /// Build from explicit labels and a square count grid.
    pub fn from_counts(labels: Vec<u32>, counts: Array2<u64>) -> Result<Self> {
        let n = labels.len();
        if counts.shape() != [n, n] {
            return Err(Error::InvalidParameter {
                name: "counts",
                value: format!("{:?}", counts.shape()),
                reason: format!("expected a {n}x{n} grid for {n} labels"),
            });
        }
        Ok(Self { labels, counts })
    }

    /// Cross-tabulate (truth, predicted) label pairs. The label axis is
    /// the ascending union of all codes seen on either side.
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        let mut labels: Vec<u32> = pairs
            .iter()
            .flat_map(|&(t, p)| [t, p])
            .collect();
        labels.sort_unstable();
        labels.dedup();

        let n = labels.len();
        let mut counts = Array2::<u64>::zeros((n, n));
        for &(truth, predicted) in pairs {
            let r = labels.binary_search(&truth).expect("label in axis");
            let c = labels.binary_search(&predicted).expect("label in axis");
            counts[(r, c)] += 1;
        }
        Self { labels, counts }
    }

    /// Class codes on both axes.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// The raw count grid (rows = truth, cols = predicted).
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Total number of labeled observations.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Overall accuracy: the fraction of observations on the diagonal.
    /// An empty matrix has accuracy 0.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = self.counts.diag().iter().sum();
        correct as f64 / total as f64
    }
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "truth\\pred")?;
        for label in &self.labels {
            write!(f, " {label:>6}")?;
        }
        writeln!(f)?;
        for (r, label) in self.labels.iter().enumerate() {
            write!(f, "{label:>10}")?;
            for c in 0..self.labels.len() {
                write!(f, " {:>6}", self.counts[(r, c)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// Wire format: {"labels": [...], "counts": [[...], ...]}
#[derive(Serialize, Deserialize)]
struct RawMatrix {
    labels: Vec<u32>,
    counts: Vec<Vec<u64>>,
}

impl Serialize for ConfusionMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let raw = RawMatrix {
            labels: self.labels.clone(),
            counts: self
                .counts
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfusionMatrix {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawMatrix::deserialize(deserializer)?;
        let n = raw.labels.len();
        let flat: Vec<u64> = raw.counts.into_iter().flatten().collect();
        let counts = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| serde::de::Error::custom(e.to_string()))?;
        ConfusionMatrix::from_counts(raw.labels, counts)
            .map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
