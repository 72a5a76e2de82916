//! Simulation endpoints: JSON curve and SVG chart

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::{run_error_response, SimulatorContext};
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::context::RunError;
use crate::render;
use crate::simulator::SimulationError;
use crate::types::{CourseForm, CurvePoint, OptimalPoint, Simulation};

/// Result of a form submission. An incomplete selection is guidance for the
/// user, not an error, so it is reported with a 200.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulateResponse {
    Complete {
        curve: Vec<CurvePoint>,
        optimum: OptimalPoint,
        summary: String,
    },
    SelectionIncomplete {
        missing: Vec<&'static str>,
        message: &'static str,
    },
}

impl SimulateResponse {
    fn complete(sim: &Simulation, currency: &str) -> Self {
        Self::Complete {
            curve: sim.curve.points().to_vec(),
            optimum: sim.optimum,
            summary: render::optimum_summary(&sim.optimum, currency),
        }
    }
}

enum FormOutcome {
    Simulated(Simulation),
    Incomplete(Vec<&'static str>),
}

/// Resolve the form and run it; failures come back as ready error responses.
async fn run_form(ctx: &SimulatorContext, form: &CourseForm) -> Result<FormOutcome, Response> {
    let course = form
        .resolve()
        .map_err(|e| ApiErrorResponse::bad_request(e.to_string()))?;

    match ctx.run(&course).await {
        Ok(sim) => Ok(FormOutcome::Simulated(sim)),
        Err(RunError::Simulation(SimulationError::SelectionIncomplete { missing })) => {
            info!(missing = ?missing, "Simulation skipped: selection incomplete");
            Ok(FormOutcome::Incomplete(missing))
        }
        Err(e) => Err(run_error_response(e)),
    }
}

/// POST /api/v1/simulate
pub async fn post_simulate(
    State(ctx): State<SimulatorContext>,
    payload: Result<Json<CourseForm>, JsonRejection>,
) -> Response {
    let Json(form) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    match run_form(&ctx, &form).await {
        Ok(FormOutcome::Simulated(sim)) => {
            ApiResponse::ok(SimulateResponse::complete(&sim, &ctx.display.currency))
        }
        Ok(FormOutcome::Incomplete(missing)) => ApiResponse::ok(SimulateResponse::SelectionIncomplete {
            missing,
            message: render::INCOMPLETE_NOTICE,
        }),
        Err(resp) => resp,
    }
}

/// GET /api/v1/simulate/chart.svg
///
/// The form travels in the query string. An incomplete selection renders
/// the notice graphic instead of a chart.
pub async fn get_chart_svg(
    State(ctx): State<SimulatorContext>,
    query: Result<Query<CourseForm>, QueryRejection>,
) -> Response {
    let Query(form) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    let svg = match run_form(&ctx, &form).await {
        Ok(FormOutcome::Simulated(sim)) => render::revenue_chart_svg(&sim.curve, &sim.optimum, &ctx.display.currency),
        Ok(FormOutcome::Incomplete(_)) => render::incomplete_notice_svg(),
        Err(resp) => return resp,
    };
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}
