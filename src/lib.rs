//! Moisture Dashboard - web dashboard for the plant-monitor watering backend
//!
//! This library exposes the core modules for testing and reuse.

pub mod backend;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod routes;
pub mod sync;
