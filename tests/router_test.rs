//! Dashboard HTTP surface, driven through the router.
//!
//! Run with: cargo test --test router_test

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{config_for, sensor, spawn_server, state_for, unreachable_url};
use moisture_dashboard::backend::BackendClient;
use moisture_dashboard::common::AppState;
use moisture_dashboard::config::Config;
use moisture_dashboard::dashboard::render::{NO_SENSOR_DATA, SENSORS_LOADING};
use moisture_dashboard::routes::build_router;

async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    build_router(state.clone())
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn loaded_state() -> AppState {
    let state = state_for(&unreachable_url().await);
    state
        .snapshot
        .update(|prev| {
            prev.apply_status(
                1,
                Ok(vec![
                    sensor("Basil", 420, Some(450), &[("2025-06-01T10:00:00Z", 420)]),
                    sensor("Fern", 710, None, &[("2025-06-01T10:05:00Z", 710)]),
                ]),
                Utc::now(),
            )
        })
        .await;
    state
}

#[tokio::test]
async fn healthz_is_ok() {
    let state = state_for(&unreachable_url().await);
    let response = send(&state, Method::GET, "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn page_carries_configured_intervals() {
    let state = state_for(&unreachable_url().await);
    let response = send(&state, Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text(response).await;
    assert!(html.contains("const REFRESH_MS = 5000;"));
    assert!(html.contains("const HIDE_MS = 3000;"));
    assert!(!html.contains("__REFRESH_MS__"));
}

#[tokio::test]
async fn page_reports_rejected_watering_requests() {
    let state = state_for(&unreachable_url().await);
    let html = text(send(&state, Method::GET, "/", None).await).await;

    // The POST outcome drives the indicator, including non-2xx and transport failures
    assert!(html.contains("if (r.ok) {"));
    assert!(html.contains("const outcome = await r.json();"));
    assert!(html.contains("r.status === 409"));
    assert_eq!(html.matches("`Network error watering ${name}.`").count(), 2);

    // In-flight state is owned by the page until the request settles, so a
    // cards refresh cannot wipe it
    assert!(html.contains("`Watering ${name}...`"));
    assert!(html.contains("cardsEl.innerHTML = await fragment('/dashboard/cards');\n        applyLocalIndicators();"));
}

#[tokio::test]
async fn page_formats_chart_times_in_browser_locale() {
    let state = state_for(&unreachable_url().await);
    let html = text(send(&state, Method::GET, "/", None).await).await;

    assert!(html.contains("data.timestamps.map((ts, i) => timeLabel(ts, data.labels[i]))"));
    assert!(html.contains("toLocaleTimeString([], { hour: '2-digit', minute: '2-digit' })"));
    assert!(!html.contains("chart.data.labels = data.labels;"));

    // Raw stamps travel alongside the server-side labels
    let state = loaded_state().await;
    let chart: Value =
        serde_json::from_str(&text(send(&state, Method::GET, "/dashboard/chart", None).await).await)
            .unwrap();
    assert_eq!(chart["timestamps"][0], "2025-06-01T10:00:00Z");
    assert_eq!(chart["labels"][0], "10:00");
}

#[tokio::test]
async fn cards_before_and_after_first_poll() {
    let state = state_for(&unreachable_url().await);

    let html = text(send(&state, Method::GET, "/dashboard/cards", None).await).await;
    assert!(html.contains(SENSORS_LOADING));

    state
        .snapshot
        .update(|prev| prev.apply_status(1, Ok(vec![]), Utc::now()))
        .await;
    let html = text(send(&state, Method::GET, "/dashboard/cards", None).await).await;
    assert!(html.contains(NO_SENSOR_DATA));
}

#[tokio::test]
async fn cards_and_sensor_list() {
    let state = loaded_state().await;

    let response = send(&state, Method::GET, "/dashboard/cards", None).await;
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let html = text(response).await;
    assert_eq!(html.matches("sensor-card").count(), 2);

    let body = text(send(&state, Method::GET, "/dashboard/sensors", None).await).await;
    let sensors: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sensors[0]["name"], "Basil");
    assert_eq!(sensors[0]["status"], "DRY");
    assert_eq!(sensors[0]["moisture_threshold"], 450);
    assert_eq!(sensors[1]["status"], "Optimal");
    assert_eq!(sensors[1]["moisture_threshold"], 500);
    assert_eq!(sensors[1]["watering"], false);
}

#[tokio::test]
async fn chart_with_no_sensors_has_no_datasets() {
    let state = state_for(&unreachable_url().await);

    let body = text(send(&state, Method::GET, "/dashboard/chart", None).await).await;
    let chart: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(chart["title"], "All Plants (Combined)");
    assert_eq!(chart["labels"], json!([]));
    assert_eq!(chart["datasets"], json!([]));
}

#[tokio::test]
async fn selection_changes_the_default_chart() {
    let state = loaded_state().await;

    let chart: Value = serde_json::from_str(
        &text(send(&state, Method::GET, "/dashboard/chart", None).await).await,
    )
    .unwrap();
    assert_eq!(chart["labels"], json!(["10:00", "10:05"]));

    let response = send(
        &state,
        Method::PUT,
        "/dashboard/selection",
        Some(json!({ "sensor": "Basil" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let chart: Value = serde_json::from_str(
        &text(send(&state, Method::GET, "/dashboard/chart", None).await).await,
    )
    .unwrap();
    assert_eq!(chart["title"], "Basil");
    assert_eq!(chart["datasets"][0]["label"], "Moisture Level");
    assert_eq!(chart["datasets"][1]["borderDash"], json!([5, 5]));

    // Explicit query wins over the stored selection
    let chart: Value = serde_json::from_str(
        &text(send(&state, Method::GET, "/dashboard/chart?sensor=all", None).await).await,
    )
    .unwrap();
    assert_eq!(chart["title"], "All Plants (Combined)");

    let options = text(send(&state, Method::GET, "/dashboard/sensor-options", None).await).await;
    assert!(options.contains(r#"<option value="Basil" selected>"#));
}

#[tokio::test]
async fn chart_csv_download() {
    let state = loaded_state().await;

    let response = send(&state, Method::GET, "/dashboard/chart.csv", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");

    let csv = text(response).await;
    assert!(csv.starts_with("timestamp,Basil,Basil Threshold,Fern"));
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn water_route_reports_outcome() {
    let backend = Router::new().route(
        "/api/water",
        post(|| async {
            Json(json!({ "results": { "Basil": { "status": "error", "message": "Reservoir empty" } } }))
        }),
    );
    let state = state_for(&spawn_server(backend).await);

    let response = send(&state, Method::POST, "/dashboard/water/Basil", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome: Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(outcome["outcome"], "failure");
    assert_eq!(outcome["message"], "Watering Basil failed: Reservoir empty");
}

#[tokio::test]
async fn water_route_conflicts_while_in_flight() {
    let state = state_for(&unreachable_url().await);
    let _guard = state.watering.begin("Basil").unwrap();

    let response = send(&state, Method::POST, "/dashboard/water/Basil", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = serde_json::from_str(&text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("already in progress"));
}

#[tokio::test]
async fn water_route_is_rate_limited_per_client() {
    let config = Config {
        disable_rate_limiting: false,
        rate_limit_water_per_second: 1,
        rate_limit_water_burst: 1,
        ..config_for(&unreachable_url().await)
    };
    let backend = BackendClient::new(&config).unwrap();
    // One router so every request shares the limiter's buckets
    let app = build_router(AppState::new(config, backend));

    let water = |sensor: &str, client: Option<&str>| {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(format!("/dashboard/water/{sensor}"));
        if let Some(ip) = client {
            request = request.header("x-forwarded-for", ip);
        }
        request.body(Body::empty()).unwrap()
    };

    let first = app.clone().oneshot(water("Basil", None)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let outcome: Value = serde_json::from_str(&text(first).await).unwrap();
    assert_eq!(outcome["outcome"], "network_error");

    // Burst spent; another sensor from the same client is still refused
    let second = app.clone().oneshot(water("Fern", None)).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // A forwarded client address gets its own bucket
    let other_client = app
        .clone()
        .oneshot(water("Fern", Some("10.0.0.2, 172.16.0.1")))
        .await
        .unwrap();
    assert_eq!(other_client.status(), StatusCode::OK);
}
