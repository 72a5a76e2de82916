//! HTTP model-serving backend
//!
//! Sends the whole batch in one POST:
//!
//! ```json
//! {"columns": ["course_type", ...], "instances": [{"course_type": "Development", ...}]}
//! ```
//!
//! and expects `{"predictions": [6.1, 6.0, ...]}` back.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{InferenceError, ModelLoadError, RevenueModel};
use crate::types::{model_column_names, PriceSweepRow};

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    columns: Vec<&'static str>,
    instances: &'a [PriceSweepRow],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<f64>,
}

/// Client for a remote model endpoint.
#[derive(Debug, Clone)]
pub struct RemoteModel {
    http: reqwest::Client,
    url: String,
}

impl RemoteModel {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ModelLoadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelLoadError::Client {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RevenueModel for RemoteModel {
    async fn predict(&self, rows: &[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> {
        let body = PredictRequest {
            columns: model_column_names(),
            instances: rows,
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "{} returned {status}: {}",
                self.url,
                text.trim()
            )));
        }

        let parsed: PredictResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;
        debug!(url = %self.url, rows = rows.len(), "Remote batch prediction complete");
        Ok(parsed.predictions)
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
