//! Service health endpoint

use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use super::SimulatorContext;
use crate::api::envelope::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Which model backend answers predictions
    pub model_backend: &'static str,
    pub catalog_categories: usize,
    pub sweep_points: usize,
}

/// GET /api/v1/health
pub async fn get_health(State(ctx): State<SimulatorContext>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        model_backend: ctx.model.backend_name(),
        catalog_categories: ctx.catalog.len(),
        sweep_points: ctx.simulator.sweep().num_points(),
    })
}
