use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use moisture_dashboard::backend::BackendClient;
use moisture_dashboard::common::AppState;
use moisture_dashboard::config::Config;
use moisture_dashboard::notify::{DryPlantMonitor, TelegramNotifier};
use moisture_dashboard::routes;
use moisture_dashboard::sync;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (LOG_FORMAT=json for structured output)
    let fmt_layer = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,moisture_dashboard=debug".into()),
        )
        .with(fmt_layer)
        .init();

    tracing::info!("Starting moisture-dashboard...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        deployment = ?config.deployment,
        backend = %config.backend_base_url,
        refresh_interval_ms = config.refresh_interval_ms,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    let backend = BackendClient::new(&config)?;
    tracing::info!(base_url = %backend.base_url(), "Backend client initialized");

    let monitor = match &config.telegram {
        Some(telegram) => Some(DryPlantMonitor::new(
            TelegramNotifier::new(telegram)?,
            telegram.cooldown_hours,
        )),
        None => {
            tracing::info!("Telegram not configured, dry-plant alerts disabled");
            None
        }
    };

    let state = AppState::new(config.clone(), backend);

    // Background pollers (fire-and-forget, non-blocking)
    tracing::info!("Spawning background pollers...");
    tokio::spawn(sync::scheduler::run_status_poll(state.clone()));
    tokio::spawn(sync::scheduler::run_logs_poll(state.clone()));
    if let Some(monitor) = monitor {
        tokio::spawn(sync::scheduler::run_dry_alerts(state.clone(), monitor));
    }

    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
