use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
    pub cooldown_hours: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Plant-monitor backend
    pub backend_base_url: String,
    pub backend_timeout_seconds: u64,

    // Polling
    pub refresh_interval_ms: u64,
    pub log_display_limit: usize,

    // Watering
    pub watering_message_hide_ms: u64,
    pub water_concurrent_limit: usize,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_water_per_second: u64,
    pub rate_limit_water_burst: u32,

    // Dry-plant alerts (disabled unless token and chat id are both set)
    pub telegram: Option<TelegramConfig>,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://127.0.0.1:5000".to_string(),
            backend_timeout_seconds: 10,
            refresh_interval_ms: 5000,
            log_display_limit: 50,
            watering_message_hide_ms: 3000,
            water_concurrent_limit: 4,
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            disable_rate_limiting: false,
            rate_limit_water_per_second: 1,
            rate_limit_water_burst: 10,
            telegram: None,
            deployment: Deployment::Local,
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the backend URL is empty or the
    /// refresh interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramConfig {
                    bot_token,
                    chat_id,
                    api_base: env::var("TELEGRAM_API_BASE")
                        .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
                    cooldown_hours: env_or("DRY_ALERT_COOLDOWN_HOURS", 8),
                })
            }
            _ => None,
        };

        let config = Self {
            // Plant-monitor backend
            backend_base_url: env::var("BACKEND_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_base_url),
            backend_timeout_seconds: env_or(
                "BACKEND_TIMEOUT_SECONDS",
                defaults.backend_timeout_seconds,
            ),

            // Polling
            refresh_interval_ms: env_or("REFRESH_INTERVAL_MS", defaults.refresh_interval_ms),
            log_display_limit: env_or("LOG_DISPLAY_LIMIT", defaults.log_display_limit),

            // Watering
            watering_message_hide_ms: env_or(
                "WATERING_MESSAGE_HIDE_MS",
                defaults.watering_message_hide_ms,
            ),
            water_concurrent_limit: env_or(
                "WATER_CONCURRENT_LIMIT",
                defaults.water_concurrent_limit,
            ),

            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env_or("API_PORT", defaults.api_port),

            // Rate limiting
            disable_rate_limiting: env_or("DISABLE_RATE_LIMITING", false),
            rate_limit_water_per_second: env_or(
                "RATE_LIMIT_WATER_PER_SECOND",
                defaults.rate_limit_water_per_second,
            ),
            rate_limit_water_burst: env_or(
                "RATE_LIMIT_WATER_BURST",
                defaults.rate_limit_water_burst,
            ),

            telegram,

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the values the poller and client cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "BACKEND_BASE_URL",
                "must not be empty".to_string(),
            ));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "REFRESH_INTERVAL_MS",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Interval T between status polls.
    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Logs refresh at twice the status interval.
    #[must_use]
    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.saturating_mul(2))
    }

    #[must_use]
    pub fn watering_message_hide(&self) -> Duration {
        Duration::from_millis(self.watering_message_hide_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
