//! Configuration defaults and validation.
//!
//! Run with: cargo test --test config_test

use std::time::Duration;

use moisture_dashboard::config::{Config, ConfigError, Deployment};

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();

    assert_eq!(config.refresh_interval_ms, 5000);
    assert_eq!(config.log_display_limit, 50);
    assert_eq!(config.watering_message_hide_ms, 3000);
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert!(config.telegram.is_none());
    tokio_test::assert_ok!(config.validate());
}

#[test]
fn logs_poll_at_twice_the_status_interval() {
    let config = Config {
        refresh_interval_ms: 1500,
        ..Config::default()
    };

    assert_eq!(config.status_interval(), Duration::from_millis(1500));
    assert_eq!(config.logs_interval(), Duration::from_millis(3000));
    assert_eq!(config.watering_message_hide(), Duration::from_secs(3));
}

#[test]
fn rejects_empty_backend_url() {
    let config = Config {
        backend_base_url: "  ".to_string(),
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid("BACKEND_BASE_URL", _))
    ));
}

#[test]
fn rejects_zero_refresh_interval() {
    let config = Config {
        refresh_interval_ms: 0,
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid("REFRESH_INTERVAL_MS", _))
    ));
}

#[test]
fn deployment_names() {
    assert_eq!(Deployment::from_str("PROD"), Deployment::Prod);
    assert_eq!(Deployment::from_str("staging"), Deployment::Stage);
    assert_eq!(Deployment::from_str("development"), Deployment::Dev);
    assert_eq!(Deployment::from_str("anything"), Deployment::Local);
}
