use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::models::{LogRecord, SensorStatus, StatusResponse};
use crate::dashboard::status::{classify, MoistureStatus, DEFAULT_MOISTURE_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HistoryEntry {
    /// ISO-8601 timestamp, as reported by the backend
    pub timestamp: String,
    pub moisture: i64,
}

/// One soil-moisture sensor as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Sensor {
    /// Unique key across cards, chart options and watering requests
    pub name: String,
    pub ip_address: Option<String>,
    pub moisture: i64,
    /// Threshold reported by the backend, if any
    pub moisture_threshold: Option<i64>,
    pub last_updated: Option<String>,
    /// Chronological readings for this sensor only
    pub history: Vec<HistoryEntry>,
}

impl Sensor {
    #[must_use]
    pub fn from_status(name: String, status: SensorStatus) -> Self {
        let moisture = status.moisture.unwrap_or_else(|| {
            tracing::warn!(sensor = %name, "Sensor reported no moisture value, using 0");
            0
        });

        Self {
            name,
            moisture,
            ip_address: status.ip.filter(|ip| !ip.is_empty()),
            moisture_threshold: status.moisture_threshold,
            last_updated: status.last_updated,
            history: status
                .history
                .unwrap_or_default()
                .into_iter()
                .map(|p| HistoryEntry {
                    timestamp: p.timestamp,
                    moisture: p.moisture,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn effective_threshold(&self) -> i64 {
        self.moisture_threshold.unwrap_or(DEFAULT_MOISTURE_THRESHOLD)
    }

    #[must_use]
    pub fn status(&self) -> MoistureStatus {
        classify(self.moisture, self.moisture_threshold)
    }
}

/// Convert a `/api/status` body into sensors, keeping the backend's order.
#[must_use]
pub fn sensors_from_status(response: StatusResponse) -> Vec<Sensor> {
    response
        .into_iter()
        .filter_map(|(name, status)| {
            if name.trim().is_empty() {
                tracing::warn!("Dropping sensor with empty name");
                return None;
            }
            Some(Sensor::from_status(name, status))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Other(String),
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        match raw.to_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARNING" | "WARN" => Self::Warning,
            "ERROR" => Self::Error,
            "CRITICAL" | "FATAL" => Self::Critical,
            _ => Self::Other(raw),
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl LogLevel {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LogEntry {
    pub timestamp: String,
    #[schema(value_type = String)]
    pub level: LogLevel,
    pub message: String,
}

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            level: LogLevel::from(record.level),
            message: record.message,
        }
    }
}
