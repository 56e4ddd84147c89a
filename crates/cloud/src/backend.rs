//! The backend contract.
//!
//! Descriptors are lazy; a [`Backend`] owns the terminal actions that
//! force evaluation. Everything heavy (filtering, reduction, masking,
//! sampling, training, classification, rendering) runs behind this trait.

use async_trait::async_trait;

use geoscope_core::{ConfusionMatrix, ErrorMatrix, FeatureSet, Image};
use geoscope_map::MapView;

use crate::error::Result;
use crate::models::{RenderedMap, SceneMetadata, Table};

/// A service capable of evaluating geoscope expression graphs.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Materialize a sampled table.
    async fn fetch_table(&self, set: &FeatureSet) -> Result<Table>;

    /// Evaluate an accuracy assessment into a confusion matrix.
    async fn confusion_matrix(&self, matrix: &ErrorMatrix) -> Result<ConfusionMatrix>;

    /// Resolve the metadata of a selected scene.
    async fn scene_metadata(&self, image: &Image) -> Result<SceneMetadata>;

    /// Render a map document; returns one URL handle per layer.
    async fn render(&self, map: &MapView) -> Result<RenderedMap>;
}
