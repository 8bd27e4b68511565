pub mod chart;
pub mod dashboard;
pub mod fragments;
pub mod health;
mod rate_limit;
pub mod water;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::FallbackIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        fragments::list_sensors,
        chart::get_chart,
        chart::get_chart_csv,
        chart::set_selection,
        water::water_sensor,
    ),
    components(
        schemas(
            fragments::SensorSummary,
            crate::dashboard::MoistureStatus,
            crate::dashboard::ChartData,
            crate::dashboard::ChartDataset,
            chart::SelectionRequest,
            chart::SelectionResponse,
            crate::dashboard::WateringOutcome,
            crate::dashboard::watering::OutcomeKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sensors", description = "Classified sensor state"),
        (name = "chart", description = "Moisture history chart"),
        (name = "watering", description = "Manual watering"),
    ),
    info(
        title = "Moisture Dashboard API",
        description = "Soil-moisture dashboard for the plant-monitor watering backend",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let water_routes_base = Router::new()
        .route("/water/{sensor_name}", post(water::water_sensor))
        .layer(ConcurrencyLimitLayer::new(config.water_concurrent_limit.max(1)));

    let water_limiter = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        None
    } else {
        let limiter = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(config.rate_limit_water_per_second)
            .burst_size(config.rate_limit_water_burst)
            .finish();
        if limiter.is_none() {
            tracing::warn!(
                per_second = config.rate_limit_water_per_second,
                burst = config.rate_limit_water_burst,
                "Invalid water rate limit, running without one"
            );
        }
        limiter
    };

    let water_routes = match water_limiter {
        Some(limiter) => {
            tracing::info!(
                water_rate = %format!("{}/s burst {}", config.rate_limit_water_per_second, config.rate_limit_water_burst),
                water_concurrent = config.water_concurrent_limit,
                "Rate limiting configured"
            );
            water_routes_base.layer(GovernorLayer {
                config: Arc::new(limiter),
            })
        }
        None => water_routes_base,
    };

    let dashboard_routes = Router::new()
        .route("/cards", get(fragments::cards))
        .route("/logs", get(fragments::logs))
        .route("/sensor-options", get(fragments::sensor_options))
        .route("/sensors", get(fragments::list_sensors))
        .route("/chart", get(chart::get_chart))
        .route("/chart.csv", get(chart::get_chart_csv))
        .route("/selection", put(chart::set_selection))
        .merge(water_routes)
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/dashboard", dashboard_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
