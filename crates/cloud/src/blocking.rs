//! Blocking (synchronous) API for native callers.
//!
//! Wraps any [`Backend`] with a current-thread Tokio runtime so the CLI
//! and other synchronous callers don't manage their own async runtime.

use geoscope_core::{ConfusionMatrix, ErrorMatrix, FeatureSet, Image};
use geoscope_map::MapView;

use crate::backend::Backend;
use crate::error::{CloudError, Result};
use crate::models::{RenderedMap, SceneMetadata, Table};

/// Blocking wrapper around a [`Backend`].
pub struct BackendBlocking<B: Backend> {
    rt: tokio::runtime::Runtime,
    inner: B,
}

impl<B: Backend> BackendBlocking<B> {
    /// Wrap a backend (blocking).
    pub fn new(inner: B) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CloudError::Network(e.to_string()))?;
        Ok(Self { rt, inner })
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Materialize a sampled table (blocking).
    pub fn fetch_table(&self, set: &FeatureSet) -> Result<Table> {
        self.rt.block_on(self.inner.fetch_table(set))
    }

    /// Evaluate an accuracy assessment (blocking).
    pub fn confusion_matrix(&self, matrix: &ErrorMatrix) -> Result<ConfusionMatrix> {
        self.rt.block_on(self.inner.confusion_matrix(matrix))
    }

    /// Resolve selected-scene metadata (blocking).
    pub fn scene_metadata(&self, image: &Image) -> Result<SceneMetadata> {
        self.rt.block_on(self.inner.scene_metadata(image))
    }

    /// Render a map document (blocking).
    pub fn render(&self, map: &MapView) -> Result<RenderedMap> {
        self.rt.block_on(self.inner.render(map))
    }
}
