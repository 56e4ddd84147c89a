//! # geoscope Cloud
//!
//! Backends that evaluate geoscope expression graphs.
//!
//! This crate provides:
//! - [`Backend`]: the terminal-action contract that forces evaluation
//! - [`HttpBackend`]: async client for the hosted analysis service
//! - [`MockBackend`]: in-memory service double for offline runs and tests
//! - [`BackendBlocking`]: current-thread runtime wrapper for sync callers

pub mod backend;
pub mod blocking;
pub mod error;
pub mod http;
pub mod mock;
pub mod models;

pub use backend::Backend;
pub use blocking::BackendBlocking;
pub use error::{CloudError, Result};
pub use http::{HttpBackend, HttpBackendOptions};
pub use mock::{MockBackend, SceneFixture};
pub use models::{RenderedLayer, RenderedMap, Row, SceneMetadata, Table};
