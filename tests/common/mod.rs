//! Shared helpers for integration tests.
#![allow(dead_code)]

use axum::Router;
use tokio::net::TcpListener;

use moisture_dashboard::backend::BackendClient;
use moisture_dashboard::common::AppState;
use moisture_dashboard::config::Config;
use moisture_dashboard::dashboard::{HistoryEntry, Sensor};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn config_for(base_url: &str) -> Config {
    Config {
        backend_base_url: base_url.to_string(),
        backend_timeout_seconds: 2,
        disable_rate_limiting: true,
        ..Config::default()
    }
}

pub fn state_for(base_url: &str) -> AppState {
    let config = config_for(base_url);
    let backend = BackendClient::new(&config).unwrap();
    AppState::new(config, backend)
}

pub fn sensor(name: &str, moisture: i64, threshold: Option<i64>, history: &[(&str, i64)]) -> Sensor {
    Sensor {
        name: name.to_string(),
        ip_address: Some("192.168.1.101".to_string()),
        moisture,
        moisture_threshold: threshold,
        last_updated: Some("2025-06-01T10:05:00Z".to_string()),
        history: history
            .iter()
            .map(|(ts, m)| HistoryEntry {
                timestamp: (*ts).to_string(),
                moisture: *m,
            })
            .collect(),
    }
}
