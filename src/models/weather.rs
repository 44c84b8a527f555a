// SPDX-License-Identifier: MIT

//! Typed weather payloads from the two upstream sources.
//!
//! `SensorReading` mirrors what a station's base module plus its optional
//! outdoor, wind, and rain modules report. `Forecast` carries the subset of
//! the one-call response the display consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A real-time reading from the selected sensor station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub station_name: String,
    /// Indoor (base module) temperature in °C
    pub temperature: f64,
    /// Indoor relative humidity in %
    pub humidity: i32,
    /// Surface pressure in hPa
    pub pressure: f64,
    pub co2: Option<i32>,
    /// Noise level in dB
    pub noise: Option<i32>,
    /// Measurement time reported by the station
    pub measured_at: DateTime<Utc>,

    // Outdoor module, when paired and reachable
    pub outdoor_temp: Option<f64>,
    pub outdoor_humidity: Option<i32>,

    // Wind gauge
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub gust_speed: Option<f64>,

    // Rain gauge
    pub rain_1h: Option<f64>,
    pub rain_24h: Option<f64>,
}

impl SensorReading {
    /// Outdoor temperature when the outdoor module reported one, otherwise
    /// the indoor reading. The display leads with this value.
    pub fn headline_temp(&self) -> f64 {
        self.outdoor_temp.unwrap_or(self.temperature)
    }
}

/// Forecast payload for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current: ForecastConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

/// Current conditions block of the forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConditions {
    pub temp: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: DateTime<Utc>,
    pub temp: f64,
    pub icon: String,
    /// Probability of precipitation, 0.0 to 1.0
    pub pop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub time: DateTime<Utc>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon: String,
    pub pop: f64,
    /// Expected rain volume in mm
    pub rain: Option<f64>,
}
