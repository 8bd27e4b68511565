use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::dashboard::chart::build_chart;
use crate::dashboard::{ChartData, ChartSelection};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChartQuery {
    /// Sensor name, or `all` for the combined chart. Defaults to the stored
    /// selection.
    pub sensor: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    /// Sensor name, or `all` for the combined chart
    pub sensor: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionResponse {
    pub sensor: String,
}

async fn resolve_chart(state: &AppState, query: ChartQuery) -> ChartData {
    let snapshot = state.snapshot.current().await;
    let selection = query
        .sensor
        .map(ChartSelection::from)
        .unwrap_or_else(|| snapshot.selection.clone());

    build_chart(&snapshot.sensors, &selection)
}

/// Get the moisture chart dataset
///
/// Single-sensor mode returns that sensor's readings plus its threshold line.
/// Combined mode aligns every sensor on the sorted union of timestamps, with
/// `null` where a sensor has no reading.
#[utoipa::path(
    get,
    path = "/dashboard/chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Chart dataset", body = ChartData),
    ),
    tag = "chart"
)]
pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Json<ChartData> {
    Json(resolve_chart(&state, query).await)
}

/// Export the chart dataset as CSV
#[utoipa::path(
    get,
    path = "/dashboard/chart.csv",
    params(ChartQuery),
    responses(
        (status = 200, description = "Aligned chart dataset", content_type = "text/csv"),
    ),
    tag = "chart"
)]
pub async fn get_chart_csv(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Response> {
    let body = resolve_chart(&state, query).await.to_csv()?;

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"moisture.csv\""),
        )
        .body(axum::body::Body::from(body))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Store the chart selection
///
/// The selection is kept across poll ticks and used whenever the chart is
/// requested without a `sensor` parameter.
#[utoipa::path(
    put,
    path = "/dashboard/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection stored", body = SelectionResponse),
    ),
    tag = "chart"
)]
pub async fn set_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Json<SelectionResponse> {
    let selection = ChartSelection::from(request.sensor.trim().to_string());
    tracing::debug!(selection = %selection.as_value(), "Chart selection changed");

    let response = SelectionResponse {
        sensor: selection.as_value().to_string(),
    };
    state
        .snapshot
        .update(|prev| Some(prev.with_selection(selection)))
        .await;

    Json(response)
}
