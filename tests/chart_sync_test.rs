//! Chart synchronization in single and combined modes.
//!
//! Run with: cargo test --test chart_sync_test

mod common;

use common::sensor;
use moisture_dashboard::dashboard::chart::{
    build_chart, build_combined, build_single, format_label, ChartSelection, COMBINED_TITLE,
};

#[test]
fn single_mode_keeps_history_order_and_length() {
    let sensors = vec![sensor(
        "Basil",
        610,
        Some(450),
        &[
            ("2025-06-01T10:00:00Z", 600),
            ("2025-06-01T10:05:00Z", 605),
            ("2025-06-01T09:55:00Z", 590),
        ],
    )];

    let chart = build_single(&sensors, "Basil");

    assert_eq!(chart.title, "Basil");
    assert_eq!(chart.labels, vec!["10:00", "10:05", "09:55"]);
    assert_eq!(chart.datasets.len(), 2);

    let moisture = &chart.datasets[0];
    assert_eq!(moisture.label, "Moisture Level");
    assert_eq!(moisture.data, vec![Some(600), Some(605), Some(590)]);

    let threshold = &chart.datasets[1];
    assert_eq!(threshold.label, "Dry Threshold");
    assert_eq!(threshold.data, vec![Some(450); 3]);
    assert_eq!(threshold.border_dash, vec![5, 5]);
}

#[test]
fn single_mode_without_threshold_has_empty_reference_line() {
    let sensors = vec![sensor("Mint", 500, None, &[("2025-06-01T10:00:00Z", 500)])];

    let chart = build_single(&sensors, "Mint");

    assert_eq!(chart.datasets[0].data.len(), 1);
    assert!(chart.datasets[1].data.is_empty());
    assert_eq!(chart.datasets[1].border_color, "rgba(0,0,0,0)");
}

#[test]
fn single_mode_unknown_sensor_is_empty() {
    let sensors = vec![sensor("Basil", 600, Some(500), &[("2025-06-01T10:00:00Z", 600)])];

    let chart = build_chart(&sensors, &ChartSelection::Sensor("Fern".to_string()));

    assert_eq!(chart.title, "N/A");
    assert!(chart.labels.is_empty());
    assert!(chart.datasets.iter().all(|d| d.data.is_empty()));
}

#[test]
fn combined_mode_uses_sorted_union_and_fills_gaps_with_null() {
    let sensors = vec![
        sensor(
            "Basil",
            600,
            Some(500),
            &[("2025-06-01T10:10:00Z", 610), ("2025-06-01T10:00:00Z", 600)],
        ),
        sensor(
            "Fern",
            300,
            None,
            &[("2025-06-01T10:05:00Z", 300), ("2025-06-01T10:10:00Z", 310)],
        ),
    ];

    let chart = build_combined(&sensors);

    assert_eq!(chart.title, COMBINED_TITLE);
    assert_eq!(
        chart.timestamps,
        vec![
            "2025-06-01T10:00:00Z",
            "2025-06-01T10:05:00Z",
            "2025-06-01T10:10:00Z"
        ]
    );
    assert_eq!(chart.labels, vec!["10:00", "10:05", "10:10"]);

    // Basil, Basil Threshold, Fern (Fern defines no threshold)
    let labels: Vec<&str> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Basil", "Basil Threshold", "Fern"]);

    assert_eq!(chart.datasets[0].data, vec![Some(600), None, Some(610)]);
    assert_eq!(chart.datasets[1].data, vec![Some(500), None, Some(500)]);
    assert_eq!(chart.datasets[2].data, vec![None, Some(300), Some(310)]);

    for dataset in &chart.datasets {
        assert_eq!(dataset.data.len(), chart.labels.len());
    }
}

#[test]
fn combined_mode_colours_cycle_and_thresholds_are_translucent() {
    let sensors: Vec<_> = (0..11)
        .map(|i| sensor(&format!("S{i}"), 600, None, &[]))
        .collect();

    let chart = build_combined(&sensors);

    assert_eq!(chart.datasets[0].border_color, "rgb(75, 192, 192)");
    assert_eq!(chart.datasets[10].border_color, chart.datasets[0].border_color);

    let with_threshold = vec![sensor("Basil", 600, Some(500), &[("2025-06-01T10:00:00Z", 600)])];
    let chart = build_combined(&with_threshold);
    assert_eq!(chart.datasets[1].border_color, "rgba(75, 192, 192, 0.5)");
}

#[test]
fn combined_mode_first_duplicate_timestamp_wins() {
    let sensors = vec![sensor(
        "Basil",
        600,
        None,
        &[("2025-06-01T10:00:00Z", 600), ("2025-06-01T10:00:00Z", 999)],
    )];

    let chart = build_combined(&sensors);

    assert_eq!(chart.labels.len(), 1);
    assert_eq!(chart.datasets[0].data, vec![Some(600)]);
}

#[test]
fn empty_inputs_render_without_points() {
    let chart = build_combined(&[]);
    assert!(chart.labels.is_empty());
    assert!(chart.datasets.is_empty());

    let sensors = vec![sensor("Basil", 600, Some(500), &[])];
    let chart = build_combined(&sensors);
    assert!(chart.labels.is_empty());
    assert!(chart.datasets.iter().all(|d| d.data.is_empty()));

    let chart = build_single(&sensors, "Basil");
    assert!(chart.labels.is_empty());
    assert!(chart.datasets.iter().all(|d| d.data.is_empty()));
}

#[test]
fn synchronizer_is_idempotent_and_leaves_input_alone() {
    let sensors = vec![
        sensor("Basil", 600, Some(500), &[("2025-06-01T10:00:00Z", 600)]),
        sensor("Fern", 300, Some(400), &[("2025-06-01T10:05:00Z", 300)]),
    ];
    let before = sensors.clone();

    assert_eq!(build_combined(&sensors), build_combined(&sensors));
    assert_eq!(build_single(&sensors, "Fern"), build_single(&sensors, "Fern"));
    assert_eq!(sensors, before);
}

#[test]
fn label_formats() {
    assert_eq!(format_label("2025-06-01T10:05:00Z"), "10:05");
    assert_eq!(format_label("2025-06-01T22:45:30+02:00"), "22:45");
    assert_eq!(format_label("2025-06-01T08:15:00.123456"), "08:15");
    assert_eq!(format_label("2025-06-01 07:30:00"), "07:30");
    assert_eq!(format_label("yesterday"), "yesterday");
}

#[test]
fn csv_export_has_one_row_per_label() {
    let sensors = vec![
        sensor("Basil", 600, None, &[("2025-06-01T10:00:00Z", 600)]),
        sensor("Fern", 300, None, &[("2025-06-01T10:05:00Z", 300)]),
    ];

    let csv = String::from_utf8(build_combined(&sensors).to_csv().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "timestamp,Basil,Fern");
    assert_eq!(lines[1], "2025-06-01T10:00:00Z,600,");
    assert_eq!(lines[2], "2025-06-01T10:05:00Z,,300");
    assert_eq!(lines.len(), 3);
}

#[test]
fn selection_round_trips_through_its_value() {
    assert_eq!(ChartSelection::from("all".to_string()), ChartSelection::All);
    assert_eq!(ChartSelection::from(String::new()), ChartSelection::All);
    assert_eq!(
        ChartSelection::from("Basil".to_string()),
        ChartSelection::Sensor("Basil".to_string())
    );
    assert_eq!(ChartSelection::Sensor("Basil".to_string()).as_value(), "Basil");
    assert_eq!(ChartSelection::default().as_value(), "all");
}
