use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Response from `GET /api/status`: sensor name -> latest status.
///
/// Kept in document order so cards and chart series follow the backend's
/// ordering.
pub type StatusResponse = IndexMap<String, SensorStatus>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorStatus {
    #[serde(default)]
    pub ip: Option<String>,
    /// Latest raw reading (0-1023 on the stock sensors)
    #[serde(default)]
    pub moisture: Option<i64>,
    #[serde(default)]
    pub moisture_threshold: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<HistoryPoint>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// ISO-8601 timestamp as written by the backend
    pub timestamp: String,
    /// Older backends write the reading under `value`
    #[serde(alias = "value")]
    pub moisture: i64,
}

/// Body of `POST /api/water`
#[derive(Debug, Clone, Serialize)]
pub struct WaterRequest<'a> {
    pub sensor_names: &'a [String],
}

/// Response from `POST /api/water`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterResponse {
    #[serde(default)]
    pub results: IndexMap<String, WaterResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterResult {
    /// `"success"` or anything else for a failure
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl WaterResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One entry of `GET /api/logs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

pub type LogsResponse = Vec<LogRecord>;
