use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::backend::models::{LogsResponse, StatusResponse, WaterRequest, WaterResponse};
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// HTTP client for the plant-monitor backend.
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client against `config.backend_base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the TLS backend cannot be initialized.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the latest status of every sensor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails, returns an error status,
    /// or the body is not a sensor-name keyed object.
    pub async fn get_status(&self) -> AppResult<StatusResponse> {
        let url = format!("{}/api/status", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        parse_json(check_status(response).await?, "status").await
    }

    /// Get the most recent `limit` log entries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails, returns an error status,
    /// or the body is not a list of log entries.
    pub async fn get_logs(&self, limit: usize) -> AppResult<LogsResponse> {
        let url = format!("{}/api/logs", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        parse_json(check_status(response).await?, "logs").await
    }

    /// Ask the backend to water the named sensors' plants.
    ///
    /// Per-sensor failures are reported inside the response, not as an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails, returns an error status,
    /// or the body cannot be parsed.
    pub async fn water(&self, sensor_names: &[String]) -> AppResult<WaterResponse> {
        let url = format!("{}/api/water", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&WaterRequest { sensor_names })
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        parse_json(check_status(response).await?, "water").await
    }
}

async fn check_status(response: Response) -> AppResult<Response> {
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::Backend("Rate limited (429)".to_string()));
    }

    if !response.status().is_success() {
        return Err(AppError::Backend(format!(
            "HTTP {}: {}",
            response.status(),
            response.text().await.unwrap_or_default()
        )));
    }

    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> AppResult<T> {
    let text = response
        .text()
        .await
        .map_err(|e| AppError::Backend(format!("Failed to get response text: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            endpoint,
            body_preview = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        AppError::Backend(format!("Failed to parse response: {e}"))
    })
}
