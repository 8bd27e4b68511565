//! Per-sensor watering dispatch.
//!
//! Indicators are keyed by sensor name and live outside the poll snapshot, so
//! a refresh does not wipe an in-flight "Watering..." message. In-progress
//! entries never expire; finished ones disappear after the hide delay.

use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use moka::Expiry;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use utoipa::ToSchema;

use crate::backend::models::WaterResponse;
use crate::backend::BackendClient;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure,
    NetworkError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WateringOutcome {
    pub sensor: String,
    pub outcome: OutcomeKind,
    /// Text shown under the sensor's card
    pub message: String,
}

impl WateringOutcome {
    #[must_use]
    pub fn success(sensor: &str) -> Self {
        Self {
            sensor: sensor.to_string(),
            outcome: OutcomeKind::Success,
            message: format!("Watering {sensor} successful!"),
        }
    }

    #[must_use]
    pub fn failure(sensor: &str, reason: &str) -> Self {
        Self {
            sensor: sensor.to_string(),
            outcome: OutcomeKind::Failure,
            message: format!("Watering {sensor} failed: {reason}"),
        }
    }

    #[must_use]
    pub fn network_error(sensor: &str) -> Self {
        Self {
            sensor: sensor.to_string(),
            outcome: OutcomeKind::NetworkError,
            message: format!("Network error watering {sensor}."),
        }
    }

    /// Read this sensor's entry out of a `/api/water` response.
    #[must_use]
    pub fn from_response(sensor: &str, response: &WaterResponse) -> Self {
        match response.results.get(sensor) {
            Some(result) if result.is_success() => Self::success(sensor),
            Some(result) => Self::failure(sensor, result.message.as_deref().unwrap_or("Unknown error")),
            None => Self::failure(sensor, "Unknown error"),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == OutcomeKind::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WateringIndicator {
    InProgress,
    Done(WateringOutcome),
}

impl WateringIndicator {
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    #[must_use]
    pub fn message(&self, sensor: &str) -> String {
        match self {
            Self::InProgress => format!("Watering {sensor}..."),
            Self::Done(outcome) => outcome.message.clone(),
        }
    }
}

struct IndicatorExpiry {
    hide_after: Duration,
}

impl IndicatorExpiry {
    fn ttl(&self, indicator: &WateringIndicator) -> Option<Duration> {
        match indicator {
            WateringIndicator::InProgress => None,
            WateringIndicator::Done(_) => Some(self.hide_after),
        }
    }
}

impl Expiry<String, WateringIndicator> for IndicatorExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &WateringIndicator,
        _created_at: Instant,
    ) -> Option<Duration> {
        self.ttl(value)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &WateringIndicator,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        self.ttl(value)
    }
}

/// Watering indicators for every sensor, keyed by sensor name.
#[derive(Clone)]
pub struct WateringTracker {
    indicators: Cache<String, WateringIndicator>,
}

impl WateringTracker {
    #[must_use]
    pub fn new(hide_after: Duration) -> Self {
        // Unbounded: an in-progress entry must never be evicted. In-flight
        // entries are capped by the water route's concurrency limit, finished
        // ones by the hide delay.
        let indicators = Cache::builder()
            .expire_after(IndicatorExpiry { hide_after })
            .build();

        Self { indicators }
    }

    /// Mark `sensor` as being watered.
    ///
    /// Returns `None` if a request for it is already in flight. The returned
    /// guard clears the in-progress state when dropped, whatever happens.
    #[must_use]
    pub fn begin(&self, sensor: &str) -> Option<WateringGuard> {
        let result = self
            .indicators
            .entry(sensor.to_string())
            .and_compute_with(|existing| match existing {
                Some(entry) if entry.value().is_in_progress() => Op::Nop,
                _ => Op::Put(WateringIndicator::InProgress),
            });

        match result {
            CompResult::Inserted(_) | CompResult::ReplacedWith(_) => Some(WateringGuard {
                tracker: self.clone(),
                sensor: sensor.to_string(),
                finished: false,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, sensor: &str) -> Option<WateringIndicator> {
        self.indicators.get(sensor)
    }

    #[must_use]
    pub fn is_in_progress(&self, sensor: &str) -> bool {
        self.get(sensor).is_some_and(|i| i.is_in_progress())
    }

    /// Current indicators, for rendering.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, WateringIndicator> {
        self.indicators
            .iter()
            .map(|(name, indicator)| (name.as_ref().clone(), indicator))
            .collect()
    }
}

/// Holds a sensor's in-progress state for the duration of one request.
pub struct WateringGuard {
    tracker: WateringTracker,
    sensor: String,
    finished: bool,
}

impl WateringGuard {
    pub fn finish(mut self, outcome: WateringOutcome) {
        self.tracker
            .indicators
            .insert(self.sensor.clone(), WateringIndicator::Done(outcome));
        self.finished = true;
    }
}

impl Drop for WateringGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(sensor = %self.sensor, "Watering request interrupted");
            self.tracker.indicators.insert(
                self.sensor.clone(),
                WateringIndicator::Done(WateringOutcome::failure(&self.sensor, "request interrupted")),
            );
        }
    }
}

/// Send a watering command for one sensor and record the outcome.
///
/// Transport failures, error statuses and unparseable bodies all end up as
/// a `NetworkError` outcome rather than an error.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty name and `AppError::Conflict`
/// if a request for this sensor is already in flight.
pub async fn dispatch_watering(
    backend: &BackendClient,
    tracker: &WateringTracker,
    sensor: &str,
) -> AppResult<WateringOutcome> {
    if sensor.trim().is_empty() {
        return Err(AppError::BadRequest("sensor name must not be empty".to_string()));
    }

    let Some(guard) = tracker.begin(sensor) else {
        return Err(AppError::Conflict(format!(
            "Watering {sensor} is already in progress"
        )));
    };

    tracing::info!(sensor = %sensor, "Watering requested");

    let names = [sensor.to_string()];
    let outcome = match backend.water(&names).await {
        Ok(response) => WateringOutcome::from_response(sensor, &response),
        Err(e) => {
            tracing::error!(sensor = %sensor, error = %e, "Watering request failed");
            WateringOutcome::network_error(sensor)
        }
    };

    if outcome.is_success() {
        tracing::info!(sensor = %sensor, "Watering succeeded");
    } else {
        tracing::warn!(sensor = %sensor, message = %outcome.message, "Watering did not succeed");
    }

    guard.finish(outcome.clone());
    Ok(outcome)
}
