//! API route handlers
//!
//! - Health of the loaded model and catalog
//! - Catalog options for the form's select boxes
//! - Price-sweep simulation as JSON or as an SVG chart
//!
//! The router state is the immutable [`SimulatorContext`]; handlers never
//! mutate it.

mod catalog;
mod simulate;
mod status;

pub use catalog::*;
pub use simulate::*;
pub use status::*;

use axum::response::Response;
use tracing::warn;

use super::envelope::ApiErrorResponse;
use crate::context::RunError;
use crate::simulator::SimulationError;

pub use crate::context::SimulatorContext;

/// Map a failed run onto the error envelope.
///
/// `SelectionIncomplete` is handled by the callers before this point and
/// only lands here if a caller forgets to.
fn run_error_response(err: RunError) -> Response {
    match err {
        RunError::Form(e) => ApiErrorResponse::bad_request(e.to_string()),
        RunError::Simulation(e @ SimulationError::SelectionIncomplete { .. }) => {
            ApiErrorResponse::bad_request(e.to_string())
        }
        RunError::Simulation(SimulationError::Inference(e)) => {
            warn!(error = %e, "Simulation failed: model inference error");
            ApiErrorResponse::bad_gateway(e.to_string())
        }
        RunError::Simulation(e @ SimulationError::Timeout(_)) => {
            warn!(error = %e, "Simulation failed: model timed out");
            ApiErrorResponse::gateway_timeout(e.to_string())
        }
        RunError::Simulation(e @ SimulationError::EmptyCurve) => {
            warn!(error = %e, "Simulation failed: empty curve");
            ApiErrorResponse::internal(e.to_string())
        }
    }
}
