use axum::{
    extract::{Path, State},
    Json,
};

use crate::common::AppState;
use crate::dashboard::watering::dispatch_watering;
use crate::dashboard::WateringOutcome;
use crate::error::AppResult;

/// Water one sensor's plant
///
/// Backend failures come back as a `failure` or `network_error` outcome with
/// a 200 status; the message is also shown on the sensor's card until it
/// auto-hides.
#[utoipa::path(
    post,
    path = "/dashboard/water/{sensor_name}",
    params(
        ("sensor_name" = String, Path, description = "Sensor name"),
    ),
    responses(
        (status = 200, description = "Watering finished", body = WateringOutcome),
        (status = 400, description = "Empty sensor name"),
        (status = 409, description = "A watering request for this sensor is already in flight"),
        (status = 429, description = "Rate limited"),
    ),
    tag = "watering"
)]
pub async fn water_sensor(
    State(state): State<AppState>,
    Path(sensor_name): Path<String>,
) -> AppResult<Json<WateringOutcome>> {
    let outcome = dispatch_watering(&state.backend, &state.watering, &sensor_name).await?;
    Ok(Json(outcome))
}
