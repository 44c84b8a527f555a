// SPDX-License-Identifier: MIT

//! Forecast API client (OpenWeatherMap-style one-call endpoint).
//!
//! Location-scoped and rate-limited upstream; the coordinator fetches it on
//! the slow cadence and on station switches only.

use crate::error::{FetchError, FetchResult};
use crate::models::{
    DailyForecast, Forecast, ForecastConditions, HourlyForecast, Location,
};
use crate::services::coordinator::ForecastFetch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// How far ahead the display looks; anything beyond is dropped at parse time.
const MAX_HOURLY_ENTRIES: usize = 24;
const MAX_DAILY_ENTRIES: usize = 7;

/// Client for the one-call forecast API.
#[derive(Clone)]
pub struct ForecastApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl ForecastApiClient {
    pub fn new(api_key: String, units: String) -> Self {
        Self::with_base_url(
            "https://api.openweathermap.org/data/3.0/onecall".to_string(),
            api_key,
            units,
        )
    }

    /// Override the upstream base URL (tests point this at a mock server).
    pub fn with_base_url(base_url: String, api_key: String, units: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            units,
        }
    }
}

#[async_trait]
impl ForecastFetch for ForecastApiClient {
    async fn fetch_forecast(&self, location: Location) -> FetchResult<Forecast> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
                // Minute-by-minute data is useless on a display this slow
                ("exclude", "minutely".to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            if status == 429 {
                tracing::warn!("forecast API rate limit hit (429)");
            }
            return Err(FetchError::from_status(status, body));
        }

        let raw: OneCallResponse = response
            .json()
            .await
            .map_err(|e| FetchError::UpstreamRejected(format!("JSON parse error: {}", e)))?;

        Ok(raw.into_forecast())
    }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: RawConditions,
    #[serde(default)]
    hourly: Vec<RawHourly>,
    #[serde(default)]
    daily: Vec<RawDaily>,
}

impl OneCallResponse {
    fn into_forecast(self) -> Forecast {
        Forecast {
            current: ForecastConditions {
                temp: self.current.temp,
                feels_like: self.current.feels_like,
                description: self.current.weather.first().map(|w| w.description.clone()).unwrap_or_default(),
                icon: self.current.weather.first().map(|w| w.icon.clone()).unwrap_or_default(),
            },
            hourly: self
                .hourly
                .into_iter()
                .take(MAX_HOURLY_ENTRIES)
                .map(|h| HourlyForecast {
                    time: from_unix(h.dt),
                    temp: h.temp,
                    icon: h.weather.first().map(|w| w.icon.clone()).unwrap_or_default(),
                    pop: h.pop,
                })
                .collect(),
            daily: self
                .daily
                .into_iter()
                .take(MAX_DAILY_ENTRIES)
                .map(|d| DailyForecast {
                    time: from_unix(d.dt),
                    temp_min: d.temp.min,
                    temp_max: d.temp.max,
                    icon: d.weather.first().map(|w| w.icon.clone()).unwrap_or_default(),
                    pop: d.pop,
                    rain: d.rain,
                })
                .collect(),
        }
    }
}

fn from_unix(dt: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(dt, 0).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct RawConditions {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    weather: Vec<RawWeather>,
}

#[derive(Debug, Deserialize)]
struct RawWeather {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    dt: i64,
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    weather: Vec<RawWeather>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    dt: i64,
    temp: RawDailyTemp,
    #[serde(default)]
    pop: f64,
    rain: Option<f64>,
    #[serde(default)]
    weather: Vec<RawWeather>,
}

#[derive(Debug, Deserialize)]
struct RawDailyTemp {
    #[serde(default)]
    min: f64,
    #[serde(default)]
    max: f64,
}
