//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! all /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port, no model file on disk.

use course_revenue_sim::api::create_app;
use course_revenue_sim::catalog::Catalog;
use course_revenue_sim::config::DisplayConfig;
use course_revenue_sim::{
    FnModel, InferenceError, PriceSweep, PriceSweepRow, RevenueModel, RevenueSimulator,
    SimulatorContext,
};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn catalog() -> Catalog {
    let mut map = BTreeMap::new();
    map.insert(
        "Development".to_string(),
        vec!["Web Development".to_string(), "Data Science".to_string()],
    );
    map.insert("Business".to_string(), vec!["Finance".to_string()]);
    Catalog::from_mapping(map)
}

fn context_with(model: Arc<dyn RevenueModel>, simulator: RevenueSimulator) -> SimulatorContext {
    SimulatorContext::new(model, catalog(), simulator, DisplayConfig::default())
}

/// Revenue falls with price: log1p(1000 - 2p).
fn create_test_context() -> SimulatorContext {
    let model = FnModel::new(|rows: &[PriceSweepRow]| {
        Ok(rows.iter().map(|r| (1000.0 - 2.0 * r.price).ln_1p()).collect())
    });
    context_with(Arc::new(model), RevenueSimulator::default())
}

fn complete_form() -> serde_json::Value {
    serde_json::json!({
        "category": "Development",
        "subcategory": "Web Development",
        "level": "Beginner",
        "total_hours": 10.0,
        "lecture_count": 20,
        "title": "Master Python Fast",
        "headline": "Build real-world apps with Python",
        "rating": 4.0,
        "review_count": 100
    })
}

async fn get(ctx: SimulatorContext, uri: &str) -> Response {
    create_app(ctx)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_simulate(ctx: SimulatorContext, body: String) -> Response {
    create_app(ctx)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/simulate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

/// All v1 GET endpoints should return 200.
#[tokio::test]
async fn test_v1_get_endpoints_return_200() {
    let endpoints = [
        "/api/v1/health",
        "/api/v1/catalog",
        "/api/v1/catalog/Development/subcategories",
        "/api/v1/catalog/Please%20select/subcategories",
        "/api/v1/simulate/chart.svg",
    ];

    for endpoint in &endpoints {
        let resp = get(create_test_context(), endpoint).await;
        assert!(
            resp.status().is_success(),
            "GET {endpoint} returned status {}",
            resp.status()
        );
    }
}

/// JSON endpoints wrap their payload in the `{data, meta}` envelope.
#[tokio::test]
async fn test_v1_json_endpoints_use_envelope() {
    for endpoint in ["/api/v1/health", "/api/v1/catalog"] {
        let json = body_json(get(create_test_context(), endpoint).await).await;
        assert!(json["data"].is_object(), "{endpoint} should have data");
        assert!(json["meta"]["timestamp"].is_string(), "{endpoint} should have meta");
    }
}

#[tokio::test]
async fn test_simulate_complete_course() {
    let resp = post_simulate(create_test_context(), complete_form().to_string()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let data = &json["data"];
    assert_eq!(data["status"], "complete");
    assert_eq!(data["curve"].as_array().unwrap().len(), 50);
    assert_eq!(data["optimum"]["price"], 10.0);
    assert_eq!(data["optimum"]["index"], 0);
    assert_eq!(
        data["summary"],
        "Optimal Price Suggestion: RM 10.00, expected revenue: RM 980.00"
    );
}

#[tokio::test]
async fn test_simulate_placeholder_category_is_incomplete() {
    let mut form = complete_form();
    form["category"] = serde_json::json!("Please select");

    let resp = post_simulate(create_test_context(), form.to_string()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["data"]["status"], "selection_incomplete");
    assert_eq!(json["data"]["missing"], serde_json::json!(["category"]));
    assert!(json["data"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Please select values for Course Type"));
    assert!(json["data"].get("curve").is_none());
}

#[tokio::test]
async fn test_simulate_empty_body_fields_are_incomplete() {
    let resp = post_simulate(create_test_context(), "{}".to_string()).await;
    let json = body_json(resp).await;
    assert_eq!(
        json["data"]["missing"],
        serde_json::json!(["category", "subcategory", "level"])
    );
}

#[tokio::test]
async fn test_simulate_out_of_range_rating_is_400() {
    let mut form = complete_form();
    form["rating"] = serde_json::json!(7.5);

    let resp = post_simulate(create_test_context(), form.to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], "INVALID_INPUT");
    assert!(json["error"]["message"].as_str().unwrap().contains("rating"));
}

#[tokio::test]
async fn test_simulate_unknown_category_is_400() {
    let mut form = complete_form();
    form["category"] = serde_json::json!("Cooking");
    let resp = post_simulate(create_test_context(), form.to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simulate_subcategory_outside_catalog_is_400() {
    let mut form = complete_form();
    form["subcategory"] = serde_json::json!("Finance");
    let resp = post_simulate(create_test_context(), form.to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simulate_malformed_json_is_400_envelope() {
    let resp = post_simulate(create_test_context(), "{not json".to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_simulate_model_failure_is_502() {
    let model = FnModel::new(|_: &[PriceSweepRow]| {
        Err(InferenceError::Unavailable("connection refused".to_string()))
    });
    let ctx = context_with(Arc::new(model), RevenueSimulator::default());

    let resp = post_simulate(ctx, complete_form().to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], "INFERENCE_FAILED");
    assert!(json["error"]["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_simulate_overflowing_prediction_is_502_not_null() {
    let model = FnModel::new(|rows: &[PriceSweepRow]| {
        Ok(rows.iter().map(|r| 700.0 + r.price / 10.0).collect())
    });
    let ctx = context_with(Arc::new(model), RevenueSimulator::default());

    let resp = post_simulate(ctx, complete_form().to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let text = body_text(resp).await;
    assert!(!text.contains("null"));
    assert!(text.contains("INFERENCE_FAILED"));
}

struct StalledModel;

#[async_trait]
impl RevenueModel for StalledModel {
    async fn predict(&self, rows: &[PriceSweepRow]) -> Result<Vec<f64>, InferenceError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec![0.0; rows.len()])
    }

    fn backend_name(&self) -> &'static str {
        "stalled"
    }
}

#[tokio::test]
async fn test_simulate_model_timeout_is_504() {
    let simulator = RevenueSimulator::new(PriceSweep::default(), Duration::from_millis(50));
    let ctx = context_with(Arc::new(StalledModel), simulator);

    let resp = post_simulate(ctx, complete_form().to_string()).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], "MODEL_TIMEOUT");
}

#[tokio::test]
async fn test_chart_svg_for_complete_course() {
    let uri = "/api/v1/simulate/chart.svg?category=Development&subcategory=Web%20Development&level=Expert&rating=4.5";
    let resp = get(create_test_context(), uri).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/svg+xml");

    let svg = body_text(resp).await;
    assert!(svg.contains("Revenue Simulation"));
    assert!(svg.contains("Course Price (RM)"));
    assert!(svg.contains(r#"class="optimum""#));
}

#[tokio::test]
async fn test_chart_svg_shows_notice_when_incomplete() {
    let uri = "/api/v1/simulate/chart.svg?category=Please%20select&subcategory=Web%20Development&level=Expert";
    let svg = body_text(get(create_test_context(), uri).await).await;
    assert!(svg.contains("Please select values for Course Type"));
    assert!(!svg.contains("polyline"));
}

#[tokio::test]
async fn test_chart_svg_bad_number_is_400() {
    let uri = "/api/v1/simulate/chart.svg?category=Development&rating=lots";
    let resp = get(create_test_context(), uri).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

/// Unmatched paths fall through to the embedded form page.
#[tokio::test]
async fn test_fallback_serves_form_page() {
    for path in ["/", "/some/client/route"] {
        let resp = get(create_test_context(), path).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("course-form"), "{path} should serve the form page");
    }
}
