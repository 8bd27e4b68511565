use serde::Serialize;
use utoipa::ToSchema;

/// Threshold used when the backend does not report one for a sensor.
pub const DEFAULT_MOISTURE_THRESHOLD: i64 = 500;

/// Readings at or above this are `Optimal` whatever the sensor's threshold.
///
/// Fixed independently of the threshold, so a threshold above 700 leaves no
/// reachable `Optimal` band below it.
pub const OPTIMAL_MOISTURE: i64 = 700;

/// Full-scale value of the sensors' ADC.
pub const MOISTURE_FULL_SCALE: i64 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum MoistureStatus {
    #[serde(rename = "DRY")]
    Dry,
    Moderate,
    Optimal,
}

/// CSS classes a card uses for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPalette {
    pub card: &'static str,
    pub value_text: &'static str,
    pub status_text: &'static str,
    pub button: &'static str,
}

impl MoistureStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dry => "DRY",
            Self::Moderate => "Moderate",
            Self::Optimal => "Optimal",
        }
    }

    #[must_use]
    pub fn is_dry(self) -> bool {
        self == Self::Dry
    }

    #[must_use]
    pub fn palette(self) -> StatusPalette {
        match self {
            Self::Dry => StatusPalette {
                card: "bg-red-100 border-red-400 text-red-700",
                value_text: "text-red-600",
                status_text: "text-red-500 font-bold",
                button: "bg-red-500 hover:bg-red-600",
            },
            Self::Optimal => StatusPalette {
                card: "bg-green-100 border-green-400 text-green-700",
                value_text: "text-green-600",
                status_text: "text-green-500",
                button: "bg-blue-500 hover:bg-blue-600",
            },
            Self::Moderate => StatusPalette {
                card: "bg-blue-100 border-blue-400 text-blue-700",
                value_text: "text-green-600",
                status_text: "text-green-500",
                button: "bg-blue-500 hover:bg-blue-600",
            },
        }
    }
}

impl std::fmt::Display for MoistureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a reading against a threshold (500 when absent).
#[must_use]
pub fn classify(reading: i64, threshold: Option<i64>) -> MoistureStatus {
    let threshold = threshold.unwrap_or(DEFAULT_MOISTURE_THRESHOLD);

    if reading < threshold {
        MoistureStatus::Dry
    } else if reading >= OPTIMAL_MOISTURE {
        MoistureStatus::Optimal
    } else {
        MoistureStatus::Moderate
    }
}

/// Reading as a truncated percentage of full scale, clamped to `0..=100`.
#[must_use]
pub fn moisture_percent(reading: i64) -> i64 {
    reading.clamp(0, MOISTURE_FULL_SCALE) * 100 / MOISTURE_FULL_SCALE
}
