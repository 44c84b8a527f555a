//! Application configuration loaded from environment variables.
//!
//! Credentials are read once at startup; the rotating refresh token is only
//! the *seed* — after the first renewal the live value is owned by the
//! token manager and may differ from the environment.

use std::env;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Sensor API (OAuth2) ---
    /// Sensor API OAuth client ID
    pub sensor_client_id: String,
    /// Sensor API OAuth client secret
    pub sensor_client_secret: String,
    /// Seed refresh token (obtained out-of-band via the auth flow)
    pub sensor_refresh_token: String,

    // --- Forecast API (plain key) ---
    /// Forecast API key
    pub forecast_api_key: String,

    // --- Cadences ---
    /// Minimum seconds between sensor data fetches
    pub sensor_interval: Duration,
    /// Minimum seconds between forecast fetches
    pub forecast_interval: Duration,
    /// Scheduler tick period for the host loop
    pub tick_period: Duration,

    // --- Presentation passthrough ---
    /// Unit system passed to the forecast API ("metric" or "imperial")
    pub units: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            sensor_client_id: "test_client_id".to_string(),
            sensor_client_secret: "test_client_secret".to_string(),
            sensor_refresh_token: "test_refresh_token".to_string(),
            forecast_api_key: "test_api_key".to_string(),
            sensor_interval: Duration::from_secs(300),
            forecast_interval: Duration::from_secs(7200),
            tick_period: Duration::from_secs(5),
            units: "metric".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Intervals default to the production cadences: sensor every 5 minutes,
    /// forecast every 2 hours.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            sensor_client_id: env::var("SENSOR_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("SENSOR_CLIENT_ID"))?,
            sensor_client_secret: env::var("SENSOR_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SENSOR_CLIENT_SECRET"))?,
            sensor_refresh_token: env::var("SENSOR_REFRESH_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SENSOR_REFRESH_TOKEN"))?,
            forecast_api_key: env::var("FORECAST_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FORECAST_API_KEY"))?,
            sensor_interval: duration_var("SENSOR_INTERVAL_SECS", 300),
            forecast_interval: duration_var("FORECAST_INTERVAL_SECS", 7200),
            tick_period: duration_var("TICK_PERIOD_SECS", 5),
            units: env::var("UNITS").unwrap_or_else(|_| "metric".to_string()),
        })
    }
}

/// Read a seconds-valued env var, falling back to a default.
fn duration_var(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("SENSOR_CLIENT_ID", "test_id");
        env::set_var("SENSOR_CLIENT_SECRET", "test_secret");
        env::set_var("SENSOR_REFRESH_TOKEN", "test_refresh");
        env::set_var("FORECAST_API_KEY", "test_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.sensor_client_id, "test_id");
        assert_eq!(config.sensor_refresh_token, "test_refresh");
        assert_eq!(config.forecast_api_key, "test_key");
    }

    #[test]
    fn test_interval_override() {
        env::set_var("SENSOR_INTERVAL_SECS", "60");
        assert_eq!(duration_var("SENSOR_INTERVAL_SECS", 300), Duration::from_secs(60));
        env::remove_var("SENSOR_INTERVAL_SECS");
        assert_eq!(duration_var("SENSOR_INTERVAL_SECS", 300), Duration::from_secs(300));
    }
}
