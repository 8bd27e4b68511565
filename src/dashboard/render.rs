//! HTML fragments for the dashboard page.
//!
//! Every function here is pure: the same snapshot and indicators always give
//! the same markup. Strings coming from the backend are escaped before they
//! reach the page.

use std::collections::HashMap;
use std::fmt::Write;

use crate::dashboard::chart::{ChartSelection, COMBINED_TITLE};
use crate::dashboard::model::{LogEntry, LogLevel, Sensor};
use crate::dashboard::snapshot::Snapshot;
use crate::dashboard::watering::{OutcomeKind, WateringIndicator};

pub const NO_SENSOR_DATA: &str = "No sensor data available. Please check backend configuration.";
pub const SENSOR_LOAD_ERROR: &str = "Error loading sensor data. Check server connection.";
pub const SENSORS_LOADING: &str = "Loading sensor data...";
pub const NO_LOG_ENTRIES: &str = "No log entries yet.";
pub const LOG_LOAD_ERROR: &str = "Failed to load logs.";

#[derive(Debug, Clone, Copy)]
enum Icon {
    Water,
    CheckCircle,
    CircleX,
    Spinner,
}

fn icon_svg(icon: Icon, class: &str) -> String {
    let body = match icon {
        Icon::Water => {
            r#"<path d="M12 2.69l5.66 5.66a8 8 0 1 1-11.31 0z"></path>"#
        }
        Icon::CheckCircle => {
            r#"<path d="M22 11.08V12a10 10 0 1 1-5.93-9.14"></path><polyline points="22 4 12 14.01 9 11.01"></polyline>"#
        }
        Icon::CircleX => {
            r#"<circle cx="12" cy="12" r="10"></circle><path d="m15 9-6 6"></path><path d="m9 9 6 6"></path>"#
        }
        Icon::Spinner => {
            return format!(
                r#"<svg class="animate-spin -ml-1 mr-3 h-5 w-5 {class}" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24"><circle class="opacity-25" cx="12" cy="12" r="10" stroke="currentColor" stroke-width="4"></circle><path class="opacity-75" fill="currentColor" d="M4 12a8 8 0 018-8V0C5.373 0 0 5.373 0 12h4z"></path></svg>"#
            );
        }
    };

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="w-4 h-4 mr-1 {class}">{body}</svg>"#
    )
}

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_paragraph(class: &str, text: &str) -> String {
    format!(r#"<p class="col-span-full text-center {class}">{}</p>"#, escape_html(text))
}

fn render_indicator(sensor: &str, indicator: Option<&WateringIndicator>) -> String {
    let Some(indicator) = indicator else {
        return format!(
            r#"<div id="wateringMessage-{}" class="text-center mt-1 text-sm font-medium text-gray-600 hidden flex items-center justify-center"></div>"#,
            escape_html(sensor)
        );
    };

    let (color, icon) = match indicator {
        WateringIndicator::InProgress => ("text-blue-600", icon_svg(Icon::Spinner, "text-blue-600")),
        WateringIndicator::Done(outcome) if outcome.outcome == OutcomeKind::Success => {
            ("text-green-600", icon_svg(Icon::CheckCircle, "text-green-600"))
        }
        WateringIndicator::Done(_) => ("text-red-600", icon_svg(Icon::CircleX, "text-red-600")),
    };

    format!(
        r#"<div id="wateringMessage-{}" class="text-center mt-1 text-sm font-medium {color} flex items-center justify-center">{icon}{}</div>"#,
        escape_html(sensor),
        escape_html(&indicator.message(sensor))
    )
}

/// One sensor card. The water trigger is disabled while a request for this
/// sensor is in flight.
#[must_use]
pub fn render_card(sensor: &Sensor, indicator: Option<&WateringIndicator>) -> String {
    let status = sensor.status();
    let palette = status.palette();
    let name = escape_html(&sensor.name);

    let (ip_class, ip_text) = match &sensor.ip_address {
        Some(ip) => ("text-gray-800", escape_html(ip)),
        None => ("text-red-600", "N/A".to_string()),
    };
    let last_updated = sensor
        .last_updated
        .as_deref()
        .map_or_else(|| "--".to_string(), escape_html);
    let disabled = if indicator.is_some_and(WateringIndicator::is_in_progress) {
        " disabled"
    } else {
        ""
    };

    format!(
        r#"<div class="sensor-card bg-white p-6 rounded-xl shadow-lg border {card} flex flex-col space-y-3" data-sensor-name="{name}">
    <h3 class="text-2xl font-bold text-gray-800 mb-2">{name}</h3>
    <div class="flex justify-between items-center text-lg">
        <span class="font-medium">Moisture:</span>
        <span class="text-3xl font-extrabold {value_text}">{moisture}</span>
    </div>
    <div class="flex justify-between items-center text-lg">
        <span class="font-medium">Status:</span>
        <span class="text-xl font-semibold {status_text}">{status}</span>
    </div>
    <div class="flex justify-between items-center text-lg">
        <span class="font-medium">IP:</span>
        <span class="text-xl font-semibold {ip_class}">{ip_text}</span>
    </div>
    <p class="text-xs text-gray-500">Last updated: {last_updated}</p>
    <button data-sensor-name="{name}" class="water-single-btn {button} text-white font-bold py-2 px-4 rounded-lg shadow flex items-center justify-center space-x-2"{disabled}>{icon} <span>Water {name}</span></button>
    {indicator}
</div>
"#,
        card = palette.card,
        value_text = palette.value_text,
        status_text = palette.status_text,
        button = palette.button,
        moisture = sensor.moisture,
        status = status.label(),
        icon = icon_svg(Icon::Water, "w-4 h-4 mr-2"),
        indicator = render_indicator(&sensor.name, indicator),
    )
}

/// The whole card list, or the message that replaces it.
#[must_use]
pub fn render_cards(snapshot: &Snapshot, indicators: &HashMap<String, WateringIndicator>) -> String {
    if snapshot.status_error.is_some() {
        return message_paragraph("text-red-500", SENSOR_LOAD_ERROR);
    }
    if snapshot.is_loading() {
        return message_paragraph("text-gray-500", SENSORS_LOADING);
    }
    if snapshot.sensors.is_empty() {
        return message_paragraph("text-gray-500", NO_SENSOR_DATA);
    }

    snapshot
        .sensors
        .iter()
        .map(|sensor| render_card(sensor, indicators.get(&sensor.name)))
        .collect()
}

fn render_log_line(out: &mut String, entry: &LogEntry) {
    let (icon, text_color) = match entry.level {
        LogLevel::Error | LogLevel::Critical => (icon_svg(Icon::CircleX, "text-red-600"), "text-red-700"),
        LogLevel::Warning => (String::new(), "text-yellow-700"),
        _ => (String::new(), "text-gray-800"),
    };

    let _ = writeln!(
        out,
        r#"<p class="text-sm font-mono flex items-center {text_color}">{icon}<span>{} - {} - {}</span></p>"#,
        escape_html(&entry.timestamp),
        escape_html(entry.level.as_str()),
        escape_html(&entry.message)
    );
}

/// The log pane.
#[must_use]
pub fn render_logs(snapshot: &Snapshot) -> String {
    if snapshot.logs_error.is_some() {
        return format!(r#"<p class="text-red-500 text-sm">{LOG_LOAD_ERROR}</p>"#);
    }
    if snapshot.logs.is_empty() {
        return format!(r#"<p class="text-gray-500 text-sm">{NO_LOG_ENTRIES}</p>"#);
    }

    let mut out = String::new();
    for entry in snapshot.logs.iter() {
        render_log_line(&mut out, entry);
    }
    out
}

/// `<option>` list for the chart selector; the stored selection is marked.
#[must_use]
pub fn render_sensor_options(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let selected = |is: bool| if is { " selected" } else { "" };

    let _ = writeln!(
        out,
        r#"<option value="all"{}>{COMBINED_TITLE}</option>"#,
        selected(snapshot.selection == ChartSelection::All)
    );

    for sensor in snapshot.sensors.iter() {
        let is_selected =
            matches!(&snapshot.selection, ChartSelection::Sensor(name) if *name == sensor.name);
        let name = escape_html(&sensor.name);
        let _ = writeln!(out, r#"<option value="{name}"{}>{name}</option>"#, selected(is_selected));
    }
    out
}
