use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::common::AppState;
use crate::dashboard::model::{sensors_from_status, LogEntry};
use crate::notify::DryPlantMonitor;

/// Fetch `/api/status` once and apply it to the snapshot.
///
/// Returns whether the snapshot changed (a stale response leaves it alone).
pub async fn poll_status_once(state: &AppState) -> bool {
    let seq = state.status_seq.next();

    let result = state
        .backend
        .get_status()
        .await
        .map(sensors_from_status)
        .map_err(|e| {
            tracing::error!(seq, error = %e, "Status poll failed");
            e.to_string()
        });

    if let Ok(sensors) = &result {
        tracing::debug!(seq, sensors = sensors.len(), "Status poll completed");
    }

    let applied = state
        .snapshot
        .update(|prev| prev.apply_status(seq, result, Utc::now()))
        .await;

    if !applied {
        tracing::debug!(seq, "Discarding stale status response");
    }
    applied
}

/// Fetch `/api/logs` once and apply it to the snapshot.
pub async fn poll_logs_once(state: &AppState) -> bool {
    let seq = state.logs_seq.next();

    let result = state
        .backend
        .get_logs(state.config.log_display_limit)
        .await
        .map(|records| records.into_iter().map(LogEntry::from).collect::<Vec<_>>())
        .map_err(|e| {
            tracing::error!(seq, error = %e, "Log poll failed");
            e.to_string()
        });

    let applied = state
        .snapshot
        .update(|prev| prev.apply_logs(seq, result, Utc::now()))
        .await;

    if !applied {
        tracing::debug!(seq, "Discarding stale log response");
    }
    applied
}

/// Run `task` every `period`, starting immediately.
///
/// Each tick's work runs as its own task, so a slow tick never delays the
/// timer. Missed ticks are skipped, not queued.
pub async fn run_every<F, Fut>(period: Duration, mut task: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // First tick fires immediately
        ticker.tick().await;
        tokio::spawn(task());
    }
}

/// Poll sensor status every T.
///
/// Overlapping responses are ordered by sequence number, and a failed tick
/// just waits for the next.
pub async fn run_status_poll(state: AppState) {
    let period = state.config.status_interval();
    tracing::info!(interval_ms = period.as_millis() as u64, "Starting status poller");

    run_every(period, move || {
        let state = state.clone();
        async move {
            poll_status_once(&state).await;
        }
    })
    .await;
}

/// Poll backend logs every 2T.
pub async fn run_logs_poll(state: AppState) {
    let period = state.config.logs_interval();
    tracing::info!(interval_ms = period.as_millis() as u64, "Starting log poller");

    run_every(period, move || {
        let state = state.clone();
        async move {
            poll_logs_once(&state).await;
        }
    })
    .await;
}

/// Check the latest sensors for dry plants every T and send alerts.
pub async fn run_dry_alerts(state: AppState, mut monitor: DryPlantMonitor) {
    let period = state.config.status_interval();
    tracing::info!(
        interval_ms = period.as_millis() as u64,
        cooldown_hours = monitor.cooldown().num_hours(),
        "Starting dry-plant alerts"
    );

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let snapshot = state.snapshot.current().await;
        if snapshot.is_loading() {
            continue;
        }
        monitor.check(&snapshot.sensors, Utc::now()).await;
    }
}
