// SPDX-License-Identifier: MIT

//! Sensor API client (Netatmo-style station API).
//!
//! Handles:
//! - OAuth2 token renewal via refresh token (rotated on every renewal)
//! - Station directory listing
//! - Station data fetching, including outdoor/wind/rain modules
//! - Rate limit detection

use crate::error::{AuthError, FetchError, FetchResult};
use crate::models::{SensorReading, Station};
use crate::services::coordinator::SensorFetch;
use crate::services::token::{RenewedToken, TokenRenew};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Client for the sensor station API.
#[derive(Clone)]
pub struct SensorApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SensorApiClient {
    pub fn new() -> Self {
        Self::with_base_url("https://api.netatmo.com".to_string())
    }

    /// Override the upstream base URL (tests point this at a mock server).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    async fn get_stations_data(
        &self,
        access_token: &str,
        device_id: Option<&str>,
    ) -> FetchResult<StationsDataResponse> {
        let url = format!("{}/api/getstationsdata", self.base_url);

        let mut request = self.http.post(&url).bearer_auth(access_token);
        if let Some(id) = device_id {
            request = request.form(&[("device_id", id)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_response_json(response).await
    }
}

impl Default for SensorApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRenew for SensorApiClient {
    async fn renew_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<RenewedToken, AuthError> {
        let url = format!("{}/oauth2/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "token renewal request failed");
                AuthError::ExpiredOrRevoked
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "token renewal rejected");
            return Err(AuthError::ExpiredOrRevoked);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "token response parse error");
            AuthError::ExpiredOrRevoked
        })?;

        Ok(RenewedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
            refresh_token: token.refresh_token,
        })
    }
}

#[async_trait]
impl SensorFetch for SensorApiClient {
    async fn fetch_sensor_data(
        &self,
        access_token: &str,
        station: &Station,
    ) -> FetchResult<SensorReading> {
        let data = self.get_stations_data(access_token, Some(&station.id)).await?;

        let device = data
            .body
            .devices
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::UpstreamRejected("no devices in response".to_string()))?;

        device.into_reading()
    }

    async fn list_stations(&self, access_token: &str) -> FetchResult<Vec<Station>> {
        let data = self.get_stations_data(access_token, None).await?;

        Ok(data
            .body
            .devices
            .into_iter()
            .map(|d| Station {
                display_name: d.name(),
                location: d.place.location(),
                id: d.id,
            })
            .collect())
    }
}

/// Check response status and parse the JSON body, classifying failures.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> FetchResult<T> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if status == 429 {
            tracing::warn!("sensor API rate limit hit (429)");
        }
        return Err(FetchError::from_status(status, body));
    }

    response
        .json()
        .await
        .map_err(|e| FetchError::UpstreamRejected(format!("JSON parse error: {}", e)))
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// The provider rotates this on every renewal; absent on providers
    /// that keep the refresh token stable.
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct StationsDataResponse {
    body: StationsBody,
}

#[derive(Debug, Deserialize)]
struct StationsBody {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct Device {
    #[serde(rename = "_id")]
    id: String,
    station_name: Option<String>,
    module_name: Option<String>,
    place: Place,
    dashboard_data: Option<Dashboard>,
    #[serde(default)]
    modules: Vec<Module>,
}

impl Device {
    fn name(&self) -> String {
        self.station_name
            .clone()
            .or_else(|| self.module_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Fold the base module and any outdoor/wind/rain modules into one
    /// reading. Unreachable modules simply ship no dashboard data and
    /// leave their fields unset.
    fn into_reading(self) -> FetchResult<SensorReading> {
        let name = self.name();
        let dashboard = self.dashboard_data.ok_or_else(|| {
            FetchError::UpstreamRejected(format!("station {} has no dashboard data", name))
        })?;

        let measured_at = dashboard
            .time_utc
            .and_then(|t| DateTime::from_timestamp(t, 0))
            .unwrap_or_else(Utc::now);

        let mut reading = SensorReading {
            station_name: name,
            temperature: dashboard.temperature,
            humidity: dashboard.humidity,
            pressure: dashboard.pressure,
            co2: dashboard.co2,
            noise: dashboard.noise,
            measured_at,
            outdoor_temp: None,
            outdoor_humidity: None,
            wind_speed: None,
            wind_direction: None,
            gust_speed: None,
            rain_1h: None,
            rain_24h: None,
        };

        for module in self.modules {
            let Some(data) = module.dashboard_data else {
                continue;
            };
            match module.kind.as_str() {
                // Outdoor module
                "NAModule1" => {
                    reading.outdoor_temp = data.temperature;
                    reading.outdoor_humidity = data.humidity;
                }
                // Wind gauge
                "NAModule2" => {
                    reading.wind_speed = data.wind_strength;
                    reading.wind_direction = data.wind_angle;
                    reading.gust_speed = data.gust_strength;
                }
                // Rain gauge
                "NAModule3" => {
                    reading.rain_1h = data.rain;
                    reading.rain_24h = data.sum_rain_24;
                }
                _ => {}
            }
        }

        Ok(reading)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    /// `[lon, lat]` pair, in that order.
    location: Vec<f64>,
}

impl Place {
    fn location(&self) -> crate::models::Location {
        crate::models::Location {
            lat: self.location.get(1).copied().unwrap_or(0.0),
            lon: self.location.first().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Dashboard {
    #[serde(rename = "Temperature", default)]
    temperature: f64,
    #[serde(rename = "Humidity", default)]
    humidity: i32,
    #[serde(rename = "Pressure", default)]
    pressure: f64,
    #[serde(rename = "CO2")]
    co2: Option<i32>,
    #[serde(rename = "Noise")]
    noise: Option<i32>,
    time_utc: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Module {
    #[serde(rename = "type")]
    kind: String,
    dashboard_data: Option<ModuleDashboard>,
}

#[derive(Debug, Deserialize)]
struct ModuleDashboard {
    #[serde(rename = "Temperature")]
    temperature: Option<f64>,
    #[serde(rename = "Humidity")]
    humidity: Option<i32>,
    #[serde(rename = "WindStrength")]
    wind_strength: Option<f64>,
    #[serde(rename = "WindAngle")]
    wind_angle: Option<i32>,
    #[serde(rename = "GustStrength")]
    gust_strength: Option<f64>,
    #[serde(rename = "Rain")]
    rain: Option<f64>,
    sum_rain_24: Option<f64>,
}
