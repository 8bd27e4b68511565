//! Dashboard core: classification, chart alignment, rendering and watering.

pub mod chart;
pub mod model;
pub mod render;
pub mod snapshot;
pub mod status;
pub mod watering;

pub use chart::{ChartData, ChartDataset, ChartSelection};
pub use model::{HistoryEntry, LogEntry, LogLevel, Sensor};
pub use snapshot::Snapshot;
pub use status::{classify, MoistureStatus};
pub use watering::{WateringIndicator, WateringOutcome, WateringTracker};
