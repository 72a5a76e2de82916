//! REST API module using Axum
//!
//! Serves the simulator form page (embedded via `rust-embed`) and the JSON
//! API it talks to under `/api/v1`.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::SimulatorContext;

use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use rust_embed::Embed;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::defaults::CORS_ORIGINS_ENV_VAR;

/// Form page and its assets, compiled in from `web/`.
#[derive(Embed)]
#[folder = "web/"]
struct WebAssets;

/// Serve a static asset or fall back to `index.html`.
async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(content) = WebAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    match WebAssets::get("index.html") {
        Some(index) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            index.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Form page not embedded").into_response(),
    }
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `REVSIM_CORS_ORIGINS` to a comma-separated list of allowed origins
/// when the form is served from elsewhere during development.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ORIGINS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router with API and page serving.
pub fn create_app(ctx: SimulatorContext) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(ctx))
        .fallback(serve_asset)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
