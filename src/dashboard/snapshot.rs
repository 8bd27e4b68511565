//! Immutable dashboard state.
//!
//! A `Snapshot` is never mutated in place. Each poll result produces the next
//! snapshot from the previous one. Responses carry the sequence number of the
//! request that produced them, and anything older than what is already applied
//! is rejected, so a slow response cannot overwrite a newer one.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::dashboard::chart::{build_chart, ChartData, ChartSelection};
use crate::dashboard::model::{LogEntry, Sensor};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Sensors from the last successful status poll
    pub sensors: Arc<Vec<Sensor>>,
    /// Set when the most recent applied status poll failed
    pub status_error: Option<String>,
    pub status_seq: u64,
    pub status_updated_at: Option<DateTime<Utc>>,

    pub logs: Arc<Vec<LogEntry>>,
    pub logs_error: Option<String>,
    pub logs_seq: u64,
    pub logs_updated_at: Option<DateTime<Utc>>,

    pub selection: ChartSelection,
}

impl Snapshot {
    /// Apply the outcome of status request `seq`.
    ///
    /// Success replaces the sensor list wholesale. Failure keeps the previous
    /// sensors (the chart keeps drawing them) and records the error for the
    /// card list. Returns `None` if a newer status response is already applied.
    #[must_use]
    pub fn apply_status(
        &self,
        seq: u64,
        result: Result<Vec<Sensor>, String>,
        at: DateTime<Utc>,
    ) -> Option<Self> {
        if seq <= self.status_seq {
            return None;
        }

        let mut next = self.clone();
        next.status_seq = seq;
        match result {
            Ok(sensors) => {
                next.sensors = Arc::new(sensors);
                next.status_error = None;
                next.status_updated_at = Some(at);
            }
            Err(reason) => {
                next.status_error = Some(reason);
            }
        }
        Some(next)
    }

    /// Apply the outcome of log request `seq`. Same ordering rules as
    /// [`Snapshot::apply_status`]; a failure keeps the previous entries.
    #[must_use]
    pub fn apply_logs(
        &self,
        seq: u64,
        result: Result<Vec<LogEntry>, String>,
        at: DateTime<Utc>,
    ) -> Option<Self> {
        if seq <= self.logs_seq {
            return None;
        }

        let mut next = self.clone();
        next.logs_seq = seq;
        match result {
            Ok(logs) => {
                next.logs = Arc::new(logs);
                next.logs_error = None;
                next.logs_updated_at = Some(at);
            }
            Err(reason) => {
                next.logs_error = Some(reason);
            }
        }
        Some(next)
    }

    #[must_use]
    pub fn with_selection(&self, selection: ChartSelection) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }

    /// No status poll has completed yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status_seq == 0
    }

    #[must_use]
    pub fn sensor(&self, name: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// Chart for the stored selection.
    #[must_use]
    pub fn chart(&self) -> ChartData {
        build_chart(&self.sensors, &self.selection)
    }
}
