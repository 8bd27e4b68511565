use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::render::{render_cards, render_logs, render_sensor_options};
use crate::dashboard::MoistureStatus;

const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

/// Card list fragment, with any live watering indicators merged in.
pub async fn cards(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    let indicators = state.watering.snapshot();
    (NO_STORE, Html(render_cards(&snapshot, &indicators)))
}

pub async fn logs(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    (NO_STORE, Html(render_logs(&snapshot)))
}

pub async fn sensor_options(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot.current().await;
    (NO_STORE, Html(render_sensor_options(&snapshot)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SensorSummary {
    pub name: String,
    pub ip_address: Option<String>,
    pub moisture: i64,
    /// Threshold in effect (500 when the backend reports none)
    pub moisture_threshold: i64,
    pub status: MoistureStatus,
    pub last_updated: Option<String>,
    pub history_points: usize,
    /// A watering request for this sensor is in flight
    pub watering: bool,
}

/// List sensors with their classified status
#[utoipa::path(
    get,
    path = "/dashboard/sensors",
    responses(
        (status = 200, description = "Sensors from the latest status poll", body = Vec<SensorSummary>),
    ),
    tag = "sensors"
)]
pub async fn list_sensors(State(state): State<AppState>) -> Json<Vec<SensorSummary>> {
    let snapshot = state.snapshot.current().await;

    let response = snapshot
        .sensors
        .iter()
        .map(|s| SensorSummary {
            name: s.name.clone(),
            ip_address: s.ip_address.clone(),
            moisture: s.moisture,
            moisture_threshold: s.effective_threshold(),
            status: s.status(),
            last_updated: s.last_updated.clone(),
            history_points: s.history.len(),
            watering: state.watering.is_in_progress(&s.name),
        })
        .collect();

    Json(response)
}
