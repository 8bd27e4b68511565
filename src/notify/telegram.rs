use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::TelegramConfig;
use crate::dashboard::model::Sensor;
use crate::dashboard::status::moisture_percent;
use crate::error::{AppError, AppResult};

/// Cooldown used when the configured one cannot be represented.
pub const DEFAULT_COOLDOWN_HOURS: i64 = 8;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Client for the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    http_client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Send a Markdown message to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Notify` if the request fails or Telegram rejects it.
    pub async fn send_message(&self, text: &str) -> AppResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let response = self
            .http_client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                parse_mode: "Markdown",
            })
            .send()
            .await
            .map_err(|e| AppError::Notify(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notify(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        tracing::debug!(status = status.as_u16(), "Telegram message delivered");
        Ok(())
    }
}

/// Alert text for one dry sensor.
#[must_use]
pub fn dry_plant_message(sensor: &Sensor) -> String {
    format!(
        "Dry plant detected: {} with moisture level {}, {}%",
        sensor.name,
        sensor.moisture,
        moisture_percent(sensor.moisture)
    )
}

/// Sends an alert for each dry sensor, at most one per cooldown window.
///
/// The cooldown is shared by all sensors: once any alert goes out, the rest
/// wait for the window to pass.
pub struct DryPlantMonitor {
    notifier: TelegramNotifier,
    cooldown: TimeDelta,
    last_sent: Option<DateTime<Utc>>,
}

impl DryPlantMonitor {
    #[must_use]
    pub fn new(notifier: TelegramNotifier, cooldown_hours: i64) -> Self {
        Self {
            notifier,
            cooldown: TimeDelta::try_hours(cooldown_hours.max(0)).unwrap_or_else(|| {
                tracing::warn!(
                    cooldown_hours,
                    default_hours = DEFAULT_COOLDOWN_HOURS,
                    "Dry-alert cooldown out of range, using default"
                );
                TimeDelta::hours(DEFAULT_COOLDOWN_HOURS)
            }),
            last_sent: None,
        }
    }

    #[must_use]
    pub fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }

    #[must_use]
    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }

    /// Whether an alert may be sent at `now`.
    #[must_use]
    pub fn can_send(&self, now: DateTime<Utc>) -> bool {
        self.last_sent.is_none_or(|last| now - last > self.cooldown)
    }

    /// Alert on every dry sensor the cooldown allows. Returns how many alerts
    /// were delivered.
    pub async fn check(&mut self, sensors: &[Sensor], now: DateTime<Utc>) -> usize {
        let mut delivered = 0;

        for sensor in sensors.iter().filter(|s| s.status().is_dry()) {
            if !self.can_send(now) {
                tracing::debug!(
                    sensor = %sensor.name,
                    last_sent = ?self.last_sent,
                    "Skipping dry-plant alert, sent recently"
                );
                continue;
            }

            tracing::info!(sensor = %sensor.name, moisture = sensor.moisture, "Dry plant detected");
            match self.notifier.send_message(&dry_plant_message(sensor)).await {
                Ok(()) => {
                    self.last_sent = Some(now);
                    delivered += 1;
                }
                Err(e) => {
                    tracing::error!(sensor = %sensor.name, error = %e, "Failed to send dry-plant alert");
                }
            }
        }

        delivered
    }
}
