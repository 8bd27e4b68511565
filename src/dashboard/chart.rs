//! Chart dataset synchronization.
//!
//! Turns per-sensor histories into the line datasets the dashboard's chart
//! widget draws. Two modes:
//!
//! - **Single sensor**: the sensor's readings in their original order, plus a
//!   constant "Dry Threshold" reference line over the same points.
//! - **Combined**: every sensor on one shared x-axis, built from the sorted
//!   union of all timestamps. Series are reprojected onto that axis with `null`
//!   wherever a sensor has no reading (no interpolation).
//!
//! ISO-8601 timestamps sort chronologically as plain strings, so the shared
//! axis is ordered by the raw timestamp text.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;

use crate::dashboard::model::Sensor;
use crate::dashboard::status::MOISTURE_FULL_SCALE;
use crate::error::{AppError, AppResult};

pub const COMBINED_TITLE: &str = "All Plants (Combined)";
pub const MISSING_SENSOR_TITLE: &str = "N/A";

/// Series colours for combined mode, reused cyclically.
const SERIES_PALETTE: [(u8, u8, u8); 10] = [
    (75, 192, 192),
    (255, 159, 64),
    (255, 99, 132),
    (54, 162, 235),
    (153, 102, 255),
    (201, 203, 207),
    (255, 205, 86),
    (75, 192, 1),
    (192, 75, 75),
    (86, 205, 255),
];

const SINGLE_SERIES_COLOR: &str = "rgb(75, 192, 192)";
const SINGLE_THRESHOLD_COLOR: &str = "rgb(255, 99, 132)";
const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Which chart the dashboard shows. Retained across poll ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartSelection {
    #[default]
    All,
    Sensor(String),
}

impl From<String> for ChartSelection {
    fn from(value: String) -> Self {
        if value.is_empty() || value == "all" {
            Self::All
        } else {
            Self::Sensor(value)
        }
    }
}

impl From<ChartSelection> for String {
    fn from(selection: ChartSelection) -> Self {
        selection.as_value().to_string()
    }
}

impl ChartSelection {
    /// Value used in the `<select>` element and query strings.
    #[must_use]
    pub fn as_value(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Sensor(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    /// One value per label; `null` where the sensor has no reading
    pub data: Vec<Option<i64>>,
    pub border_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_dash: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    pub fill: bool,
    pub point_radius: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartData {
    /// Heading shown above the chart
    pub title: String,
    /// Formatted x-axis labels (`HH:MM`)
    pub labels: Vec<String>,
    /// Raw timestamps behind each label
    pub timestamps: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub y_min: i64,
    pub y_max: i64,
}

impl ChartData {
    fn new(title: String, timestamps: Vec<String>, datasets: Vec<ChartDataset>) -> Self {
        Self {
            title,
            labels: timestamps.iter().map(|ts| format_label(ts)).collect(),
            timestamps,
            datasets,
            y_min: 0,
            y_max: MOISTURE_FULL_SCALE,
        }
    }

    /// Export the aligned dataset: one row per x-axis point, one column per
    /// series, empty cells for gaps.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the CSV writer fails.
    pub fn to_csv(&self) -> AppResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let header =
            std::iter::once("timestamp").chain(self.datasets.iter().map(|d| d.label.as_str()));
        writer
            .write_record(header)
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

        for (i, timestamp) in self.timestamps.iter().enumerate() {
            let mut row = Vec::with_capacity(self.datasets.len() + 1);
            row.push(timestamp.clone());
            for dataset in &self.datasets {
                row.push(
                    dataset
                        .data
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                );
            }
            writer
                .write_record(&row)
                .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))
    }
}

/// Format a timestamp as an `HH:MM` axis label.
///
/// Offset-aware timestamps keep their own offset; naive ones are read as-is.
/// Anything unparseable is passed through unchanged.
#[must_use]
pub fn format_label(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format("%H:%M").to_string();
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, fmt) {
            return dt.format("%H:%M").to_string();
        }
    }

    timestamp.to_string()
}

/// Build the chart for the current selection.
#[must_use]
pub fn build_chart(sensors: &[Sensor], selection: &ChartSelection) -> ChartData {
    match selection {
        ChartSelection::All => build_combined(sensors),
        ChartSelection::Sensor(name) => build_single(sensors, name),
    }
}

/// One sensor's readings in original order with its threshold line.
#[must_use]
pub fn build_single(sensors: &[Sensor], name: &str) -> ChartData {
    let Some(sensor) = sensors.iter().find(|s| s.name == name) else {
        return ChartData::new(
            MISSING_SENSOR_TITLE.to_string(),
            Vec::new(),
            vec![single_moisture_series(Vec::new()), single_threshold_series(None, 0)],
        );
    };

    let timestamps: Vec<String> = sensor.history.iter().map(|e| e.timestamp.clone()).collect();
    let data: Vec<Option<i64>> = sensor.history.iter().map(|e| Some(e.moisture)).collect();
    let points = data.len();

    ChartData::new(
        sensor.name.clone(),
        timestamps,
        vec![
            single_moisture_series(data),
            single_threshold_series(sensor.moisture_threshold, points),
        ],
    )
}

/// Every sensor on the sorted union of all timestamps, gaps as `null`.
#[must_use]
pub fn build_combined(sensors: &[Sensor]) -> ChartData {
    // 1. Shared axis: sorted union of raw timestamps
    let axis: Vec<&str> = sensors
        .iter()
        .flat_map(|s| s.history.iter().map(|e| e.timestamp.as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut datasets = Vec::with_capacity(sensors.len() * 2);

    for (index, sensor) in sensors.iter().enumerate() {
        let (r, g, b) = SERIES_PALETTE[index % SERIES_PALETTE.len()];
        let color = format!("rgb({r}, {g}, {b})");

        // 2. timestamp -> reading, first occurrence wins
        let mut readings: HashMap<&str, i64> = HashMap::with_capacity(sensor.history.len());
        for entry in &sensor.history {
            readings.entry(entry.timestamp.as_str()).or_insert(entry.moisture);
        }

        // 3. Reproject onto the shared axis
        datasets.push(ChartDataset {
            label: sensor.name.clone(),
            data: axis.iter().map(|ts| readings.get(ts).copied()).collect(),
            border_color: color.clone(),
            border_width: None,
            border_dash: Vec::new(),
            tension: Some(0.1),
            fill: false,
            point_radius: 3,
            point_background_color: Some(color),
        });

        if let Some(threshold) = sensor.moisture_threshold {
            datasets.push(ChartDataset {
                label: format!("{} Threshold", sensor.name),
                data: axis
                    .iter()
                    .map(|ts| readings.contains_key(ts).then_some(threshold))
                    .collect(),
                border_color: format!("rgba({r}, {g}, {b}, 0.5)"),
                border_width: Some(1),
                border_dash: vec![2, 2],
                tension: None,
                fill: false,
                point_radius: 0,
                point_background_color: None,
            });
        }
    }

    ChartData::new(
        COMBINED_TITLE.to_string(),
        axis.into_iter().map(str::to_string).collect(),
        datasets,
    )
}

fn single_moisture_series(data: Vec<Option<i64>>) -> ChartDataset {
    ChartDataset {
        label: "Moisture Level".to_string(),
        data,
        border_color: SINGLE_SERIES_COLOR.to_string(),
        border_width: None,
        border_dash: Vec::new(),
        tension: Some(0.1),
        fill: false,
        point_radius: 4,
        point_background_color: Some(SINGLE_SERIES_COLOR.to_string()),
    }
}

fn single_threshold_series(threshold: Option<i64>, points: usize) -> ChartDataset {
    let (data, color) = match threshold {
        Some(t) => (vec![Some(t); points], SINGLE_THRESHOLD_COLOR),
        None => (Vec::new(), TRANSPARENT),
    };

    ChartDataset {
        label: "Dry Threshold".to_string(),
        data,
        border_color: color.to_string(),
        border_width: Some(2),
        border_dash: vec![5, 5],
        tension: None,
        fill: false,
        point_radius: 0,
        point_background_color: None,
    }
}
