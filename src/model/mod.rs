//! Revenue model backends
//!
//! Provides a unified interface over the pre-trained regression pipeline.
//! A model maps a batch of [`PriceSweepRow`]s to one prediction per row in
//! log1p revenue space; the simulator owns the inverse transform.
//!
//! ## Backends
//!
//! - **ArtifactModel**: gradient-boosted tree pipeline loaded from a JSON
//!   artifact on disk and evaluated in-process
//! - **RemoteModel**: HTTP model-serving endpoint
//! - **FnModel**: wraps a plain closure (stub models, embedding)

use async_trait::async_trait;
use thiserror::Error;

use crate::types::PriceSweepRow;

pub mod artifact;
pub mod features;
pub mod remote;

pub use artifact::ArtifactModel;
pub use remote::RemoteModel;

// ============================================================================
// Error Types
// ============================================================================

/// Failure of a single batch prediction. Propagated unchanged to callers.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The backend could not be reached or answered with a failure
    #[error("Model backend unavailable: {0}")]
    Unavailable(String),

    /// A row could not be encoded against the model's schema
    #[error("Malformed input row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    /// The backend returned something other than one number per row
    #[error("Model returned {got} predictions for {expected} rows")]
    OutputLength { expected: usize, got: usize },

    /// The backend returned NaN or infinity
    #[error("Model returned non-finite prediction {value} for row {row}")]
    NonFinite { row: usize, value: f64 },

    /// A finite log-scale prediction too large to invert into a revenue
    #[error("Model prediction {value} for row {row} overflows when converted to revenue")]
    RevenueOverflow { row: usize, value: f64 },

    /// The backend response could not be decoded
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Startup failure to load a model. Fatal.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Incompatible model artifact: {0}")]
    Incompatible(String),

    #[error("Failed to build HTTP client for {url}: {message}")]
    Client { url: String, message: String },
}

// ============================================================================
// Backend Trait
// ============================================================================

/// A regression model predicting log1p revenue for a batch of rows.
#[async_trait]
pub trait RevenueModel: Send + Sync {
    /// Predict one log-scale value per row, in row order.
    async fn predict(&self, rows: &[PriceSweepRow]) -> Result<Vec<f64>, InferenceError>;

    /// Backend name for logging and health reporting
    fn backend_name(&self) -> &'static str;
}

/// Adapter turning a synchronous closure into a [`RevenueModel`].
pub struct FnModel<F> {
    predict: F,
}

impl<F> FnModel<F>
where
    F: Fn(&[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> + Send + Sync,
{
    pub const fn new(predict: F) -> Self {
        Self { predict }
    }
}

#[async_trait]
impl<F> RevenueModel for FnModel<F>
where
    F: Fn(&[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> + Send + Sync,
{
    async fn predict(&self, rows: &[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> {
        (self.predict)(rows)
    }

    fn backend_name(&self) -> &'static str {
        "function"
    }
}
