//! HTTP backend for the hosted analysis service.
//!
//! Terminal actions POST a JSON body (`{"expression": ...}` to
//! `/v1/evaluate`, `{"map": ...}` to `/v1/map`) and parse the typed
//! result. Transient failures are retried with exponential backoff;
//! client errors (4xx) are surfaced immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use geoscope_core::{ConfusionMatrix, ErrorMatrix, FeatureSet, Image};
use geoscope_map::MapView;

use crate::backend::Backend;
use crate::error::{CloudError, Result};
use crate::models::{RenderedMap, SceneMetadata, Table};

/// Configuration for [`HttpBackend`].
pub struct HttpBackendOptions {
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
}

impl Default for HttpBackendOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Async client for the analysis service's evaluation endpoints.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    options: HttpBackendOptions,
}

#[derive(Deserialize)]
struct EvalResponse<T> {
    result: T,
}

impl HttpBackend {
    /// Create a backend for a service root URL (e.g.
    /// `"https://analysis.example.com"`).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, HttpBackendOptions::default())
    }

    pub fn with_options(base_url: &str, options: HttpBackendOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            options,
        })
    }

    /// The service root this backend talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_err = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s, 2s, ...
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                tokio::time::sleep(delay).await;
            }
            debug!(url = %url, attempt, "submitting evaluation request");

            let resp = self
                .client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            match resp {
                Ok(r) if r.status().is_success() => {
                    let body = r
                        .text()
                        .await
                        .map_err(|e| CloudError::Network(format!("reading response body: {e}")))?;
                    let parsed: T = serde_json::from_str(&body).map_err(|e| {
                        CloudError::Network(format!("parsing service response: {e}"))
                    })?;
                    return Ok(parsed);
                }
                Ok(r) => {
                    let status = r.status();
                    let body = r.text().await.unwrap_or_default();
                    last_err = Some(CloudError::Service {
                        status: status.as_u16(),
                        body: body.chars().take(500).collect(),
                    });
                    // Don't retry client errors (4xx)
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_err = Some(CloudError::Network(format!("request failed: {e}")));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CloudError::Network("evaluation failed".into())))
    }

    async fn evaluate<T: DeserializeOwned>(&self, expression: &geoscope_core::Expr) -> Result<T> {
        let body = serde_json::json!({ "expression": expression });
        let resp: EvalResponse<T> = self.post_json("/v1/evaluate", &body).await?;
        Ok(resp.result)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_table(&self, set: &FeatureSet) -> Result<Table> {
        self.evaluate(set.expr()).await
    }

    async fn confusion_matrix(&self, matrix: &ErrorMatrix) -> Result<ConfusionMatrix> {
        self.evaluate(matrix.expr()).await
    }

    async fn scene_metadata(&self, image: &Image) -> Result<SceneMetadata> {
        self.evaluate(image.expr()).await
    }

    async fn render(&self, map: &MapView) -> Result<RenderedMap> {
        let body = serde_json::json!({ "map": map });
        self.post_json("/v1/map", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let b = HttpBackend::new("https://analysis.example.com/").unwrap();
        assert_eq!(b.base_url(), "https://analysis.example.com");
    }

    #[test]
    fn default_options() {
        let o = HttpBackendOptions::default();
        assert_eq!(o.max_retries, 3);
        assert_eq!(o.request_timeout, Duration::from_secs(30));
    }
}
