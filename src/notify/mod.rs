//! Outbound alerts for dry plants.

pub mod telegram;

pub use telegram::{dry_plant_message, DryPlantMonitor, TelegramNotifier, DEFAULT_COOLDOWN_HOURS};
