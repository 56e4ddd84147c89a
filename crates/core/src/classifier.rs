//! Classifier descriptors.

use std::sync::Arc;

use crate::confusion::ErrorMatrix;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::table::FeatureSet;

/// Configuration for a random-forest classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomForest {
    trees: u32,
}

impl RandomForest {
    /// A forest with the given tree count.
    pub fn new(trees: u32) -> Self {
        Self { trees }
    }

    pub fn trees(&self) -> u32 {
        self.trees
    }

    /// Train on a sampled table.
    ///
    /// `class_property` is the label column; `input_properties` are the
    /// feature columns, and must be non-empty. Training happens on the
    /// service; the returned [`Classifier`] is a descriptor.
    pub fn train(
        &self,
        features: &FeatureSet,
        class_property: &str,
        input_properties: &[&str],
    ) -> Result<Classifier> {
        if input_properties.is_empty() {
            return Err(Error::EmptyInputProperties);
        }
        if self.trees == 0 {
            return Err(Error::InvalidParameter {
                name: "trees",
                value: "0".into(),
                reason: "a forest needs at least one tree".into(),
            });
        }
        Ok(Classifier(Arc::new(Expr::TrainClassifier {
            features: Arc::clone(features.expr()),
            trees: self.trees,
            class_property: class_property.to_string(),
            input_properties: input_properties.iter().map(|p| p.to_string()).collect(),
        })))
    }
}

/// A trained classifier handle.
#[derive(Debug, Clone)]
pub struct Classifier(Arc<Expr>);

impl Classifier {
    /// Resubstitution error matrix: accuracy measured on the training
    /// data itself, an optimistic bound.
    pub fn confusion_matrix(&self) -> ErrorMatrix {
        ErrorMatrix::from_expr(Arc::new(Expr::ConfusionMatrix {
            classifier: Arc::clone(&self.0),
        }))
    }

    /// The underlying expression node.
    pub fn expr(&self) -> &Arc<Expr> {
        &self.0
    }
}
