//! API route definitions
//!
//! - /api/v1/health - model backend and catalog status
//! - /api/v1/catalog - select-box options and form defaults
//! - /api/v1/catalog/:category/subcategories - subcategories of one type
//! - /api/v1/simulate - run the price sweep (JSON)
//! - /api/v1/simulate/chart.svg - run the price sweep (SVG chart)

use axum::{routing::{get, post}, Router};

use super::handlers::{self, SimulatorContext};

/// Create all API routes
pub fn api_routes(ctx: SimulatorContext) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/catalog", get(handlers::get_catalog))
        .route("/catalog/:category/subcategories", get(handlers::get_subcategories))
        .route("/simulate", post(handlers::post_simulate))
        .route("/simulate/chart.svg", get(handlers::get_chart_svg))
        .with_state(ctx)
}
