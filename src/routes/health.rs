use axum::http::StatusCode;

/// Health check endpoint
///
/// Returns 200 OK while the dashboard is serving. Backend reachability is
/// reported on the page, not here.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
