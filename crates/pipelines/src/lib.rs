//! # geoscope Pipelines
//!
//! Ready-made analyses over any [`Backend`](geoscope_cloud::Backend).
//!
//! Each pipeline is a config struct whose `Default` carries the stock
//! parameters, a pure `build()` producing the descriptors and map
//! document, and a `run()` performing the terminal actions:
//!
//! - [`No2Comparison`]: side-by-side monthly NO₂ composites over a
//!   country boundary
//! - [`SupervisedClassification`]: least-cloudy scene, cloud masking,
//!   random-forest land cover with train/validation accuracy
//! - [`NdviChange`]: NDVI difference between two years over a point

pub mod classify;
pub mod ndvi;
pub mod no2;

pub use classify::{ClassificationArtifacts, ClassificationReport, SupervisedClassification};
pub use ndvi::{NdviArtifacts, NdviChange};
pub use no2::{No2Artifacts, No2Comparison};
